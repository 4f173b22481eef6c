//! Tracking Store: the durable per-snack, per-week ledger
//!
//! Everything else reads and writes records through [`TrackingStore`]. Each
//! method is a single atomic operation against the backing store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{DateRange, TrackingRecord, TrackingUpdate};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryTrackingStore;
pub use postgres::PgTrackingStore;

/// Trait for tracking storage backends
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Every record, newest week first, then by snack name
    async fn list_all(&self) -> AppResult<Vec<TrackingRecord>>;

    /// Records whose week starts inside `range`, ordered by snack name then week
    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<TrackingRecord>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TrackingRecord>>;

    /// The snack's record whose week starts inside `range`
    async fn find_in_range(
        &self,
        snack_id: Uuid,
        range: DateRange,
    ) -> AppResult<Option<TrackingRecord>>;

    /// The snack's record with the latest week start
    async fn find_most_recent(&self, snack_id: Uuid) -> AppResult<Option<TrackingRecord>>;

    /// Overwrite wastage and shortage (and notes, if given) on one record.
    /// Returns `None` when the record no longer exists.
    async fn apply_update(
        &self,
        id: Uuid,
        update: &TrackingUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<Option<TrackingRecord>>;

    /// Create the (snack, week) record with `quantity`, or add `quantity` to
    /// the existing one. Concurrent calls for the same key never produce two
    /// records.
    async fn upsert_delivery(
        &self,
        snack_id: Uuid,
        week_start_date: NaiveDate,
        quantity: i32,
        at: DateTime<Utc>,
    ) -> AppResult<TrackingRecord>;

    /// Remove every record. Returns how many were removed.
    async fn clear_all(&self) -> AppResult<u64>;

    /// Whether the backing store is reachable
    async fn ping(&self) -> bool;

    /// Store name for logging
    fn name(&self) -> &str;
}
