//! In-memory tracking store
//!
//! Holds one lock for the whole of each operation, so writes are
//! all-or-nothing and the (snack, week) key stays unique under concurrency.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{DateRange, TrackingRecord, TrackingUpdate};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TrackingStore;
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    records: Vec<TrackingRecord>,
    snack_names: HashMap<Uuid, String>,
}

impl MemoryState {
    fn annotated(&self, record: &TrackingRecord) -> TrackingRecord {
        let mut record = record.clone();
        record.snack_name = self.snack_names.get(&record.snack_id).cloned();
        record
    }
}

/// Tracking store kept in process memory
#[derive(Default)]
pub struct MemoryTrackingStore {
    state: RwLock<MemoryState>,
}

impl MemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the catalog name of a snack so reads can annotate its records
    pub async fn register_snack(&self, snack_id: Uuid, name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.snack_names.insert(snack_id, name.into());
    }
}

/// Named snacks first, by name; unnamed ones after
fn by_name(a: &TrackingRecord, b: &TrackingRecord) -> std::cmp::Ordering {
    match (&a.snack_name, &b.snack_name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.snack_id.cmp(&b.snack_id),
    }
}

#[async_trait]
impl TrackingStore for MemoryTrackingStore {
    async fn list_all(&self) -> AppResult<Vec<TrackingRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<TrackingRecord> =
            state.records.iter().map(|r| state.annotated(r)).collect();
        records.sort_by(|a, b| {
            b.week_start_date
                .cmp(&a.week_start_date)
                .then_with(|| by_name(a, b))
        });
        Ok(records)
    }

    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<TrackingRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<TrackingRecord> = state
            .records
            .iter()
            .filter(|r| range.contains(r.week_start_date))
            .map(|r| state.annotated(r))
            .collect();
        records.sort_by(|a, b| by_name(a, b).then_with(|| a.week_start_date.cmp(&b.week_start_date)));
        Ok(records)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TrackingRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| state.annotated(r)))
    }

    async fn find_in_range(
        &self,
        snack_id: Uuid,
        range: DateRange,
    ) -> AppResult<Option<TrackingRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.snack_id == snack_id && range.contains(r.week_start_date))
            .max_by_key(|r| r.week_start_date)
            .map(|r| state.annotated(r)))
    }

    async fn find_most_recent(&self, snack_id: Uuid) -> AppResult<Option<TrackingRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.snack_id == snack_id)
            .max_by_key(|r| r.week_start_date)
            .map(|r| state.annotated(r)))
    }

    async fn apply_update(
        &self,
        id: Uuid,
        update: &TrackingUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<Option<TrackingRecord>> {
        let mut state = self.state.write().await;
        let Some(record) = state.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        update.apply_to(record, at);
        let updated = record.clone();
        Ok(Some(state.annotated(&updated)))
    }

    async fn upsert_delivery(
        &self,
        snack_id: Uuid,
        week_start_date: NaiveDate,
        quantity: i32,
        at: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let mut state = self.state.write().await;
        let existing = state
            .records
            .iter_mut()
            .find(|r| r.snack_id == snack_id && r.week_start_date == week_start_date);

        let record = match existing {
            Some(record) => {
                record.initial_quantity = record
                    .initial_quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::invalid("quantity", "Quantity is too large"))?;
                record.updated_at = at;
                record.clone()
            }
            None => {
                let record = TrackingRecord::delivered(snack_id, week_start_date, quantity, at);
                state.records.push(record.clone());
                record
            }
        };
        Ok(state.annotated(&record))
    }

    async fn clear_all(&self) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let removed = state.records.len() as u64;
        state.records.clear();
        Ok(removed)
    }

    async fn ping(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn week(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_increments() {
        let store = MemoryTrackingStore::new();
        let snack = Uuid::new_v4();

        let first = store.upsert_delivery(snack, week(11), 24, at()).await.unwrap();
        assert_eq!(first.initial_quantity, 24);
        assert_eq!(first.wasted_quantity, 0);
        assert_eq!(first.shortage_quantity, 0);

        let second = store.upsert_delivery(snack, week(11), 6, at()).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.initial_quantity, 30);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_delivery_is_rejected_unchanged() {
        let store = MemoryTrackingStore::new();
        let snack = Uuid::new_v4();
        store
            .upsert_delivery(snack, week(11), i32::MAX - 5, at())
            .await
            .unwrap();

        let result = store.upsert_delivery(snack, week(11), 100, at()).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidInput { field: Some(ref f), .. }) if f == "quantity"
        ));

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].initial_quantity, i32::MAX - 5);
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_keep_one_record() {
        let store = Arc::new(MemoryTrackingStore::new());
        let snack = Uuid::new_v4();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert_delivery(snack, week(11), 1, at()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].initial_quantity, 16);
    }

    #[tokio::test]
    async fn test_most_recent_and_range_lookup() {
        let store = MemoryTrackingStore::new();
        let snack = Uuid::new_v4();
        store.upsert_delivery(snack, week(4), 10, at()).await.unwrap();
        let latest = store.upsert_delivery(snack, week(11), 12, at()).await.unwrap();

        let found = store.find_most_recent(snack).await.unwrap().unwrap();
        assert_eq!(found.id, latest.id);

        let range = DateRange::new(week(4), week(11));
        let found = store.find_in_range(snack, range).await.unwrap().unwrap();
        assert_eq!(found.week_start_date, week(4));

        assert!(store.find_most_recent(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_orders_newest_week_first_then_name() {
        let store = MemoryTrackingStore::new();
        let (chips, apples) = (Uuid::new_v4(), Uuid::new_v4());
        store.register_snack(chips, "Chips").await;
        store.register_snack(apples, "Apples").await;
        store.upsert_delivery(chips, week(4), 1, at()).await.unwrap();
        store.upsert_delivery(chips, week(11), 1, at()).await.unwrap();
        store.upsert_delivery(apples, week(11), 1, at()).await.unwrap();

        let names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.week_start_date, r.snack_name.unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![
                (week(11), "Apples".to_string()),
                (week(11), "Chips".to_string()),
                (week(4), "Chips".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = MemoryTrackingStore::new();
        let update = TrackingUpdate {
            wasted_quantity: 1,
            shortage_quantity: 0,
            notes: None,
        };
        assert!(store.apply_update(Uuid::new_v4(), &update, at()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryTrackingStore::new();
        store.upsert_delivery(Uuid::new_v4(), week(11), 5, at()).await.unwrap();
        store.upsert_delivery(Uuid::new_v4(), week(11), 5, at()).await.unwrap();
        assert_eq!(store.clear_all().await.unwrap(), 2);
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
