//! Tracking service: record resolution and wastage/shortage updates

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    current_week, validate_delivery_quantity, validate_tracking_entry, week_start_of, DateRange,
    DeliveryInput, RecordTrackingInput, TrackingEntryInput, TrackingRecord, TrackingUpdate,
    WeekStart,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::TrackingStore;

/// Tracking service for resolving and mutating weekly records
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn TrackingStore>,
    week_start: WeekStart,
}

/// A current-week record annotated with the week it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeekEntry {
    #[serde(flatten)]
    pub record: TrackingRecord,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

/// Result of resolving a snack's current week
#[derive(Debug, Clone, Serialize)]
pub struct CurrentRecord {
    pub snack_id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// False until the snack has had a delivery this week
    pub has_delivery: bool,
    pub record: Option<TrackingRecord>,
}

impl TrackingService {
    /// Create a new TrackingService instance
    pub fn new(store: Arc<dyn TrackingStore>, week_start: WeekStart) -> Self {
        Self { store, week_start }
    }

    /// List every record, newest week first
    pub async fn list_records(&self) -> AppResult<Vec<TrackingRecord>> {
        self.store.list_all().await
    }

    /// Get a single record
    pub async fn get_record(&self, record_id: Uuid) -> AppResult<TrackingRecord> {
        self.store
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tracking record".to_string()))
    }

    /// The snack's record for the calendar week containing `now`, if it has
    /// been delivered this week
    pub async fn find_current(
        &self,
        snack_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TrackingRecord>> {
        let week = current_week(now, self.week_start);
        self.store.find_in_range(snack_id, week).await
    }

    /// [`Self::find_current`] together with the week bounds it searched
    pub async fn current_record(&self, snack_id: Uuid, now: DateTime<Utc>) -> AppResult<CurrentRecord> {
        let week = current_week(now, self.week_start);
        let record = self.find_current(snack_id, now).await?;
        Ok(CurrentRecord {
            snack_id,
            week_start: week.start,
            week_end: week.end,
            has_delivery: record.is_some(),
            record,
        })
    }

    /// The snack's latest-week record: the default target of a wastage or
    /// shortage submission
    pub async fn find_most_recent(&self, snack_id: Uuid) -> AppResult<TrackingRecord> {
        self.store
            .find_most_recent(snack_id)
            .await?
            .ok_or(AppError::NoDelivery { snack_id })
    }

    /// Write a validated update to one record
    pub async fn apply_update(
        &self,
        record_id: Uuid,
        update: &TrackingUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let record = self
            .store
            .apply_update(record_id, update, now)
            .await?
            .ok_or_else(|| AppError::NotFound("Tracking record".to_string()))?;

        tracing::info!(
            record_id = %record.id,
            snack_id = %record.snack_id,
            week_start = %record.week_start_date,
            wasted = record.wasted_quantity,
            shortage = record.shortage_quantity,
            outcome = %record.outcome(),
            "Tracking record updated"
        );
        Ok(record)
    }

    /// Record wastage or shortage against the snack's most recent week.
    ///
    /// Validation runs before resolution, so a rejected submission never
    /// touches the store. Both quantities are overwritten together.
    pub async fn record_wastage_or_shortage(
        &self,
        input: RecordTrackingInput,
        now: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let snack_id = input
            .snack_id
            .ok_or_else(|| AppError::invalid("snack_id", "snack_id is required"))?;
        let update = validate_tracking_entry(&input.entry)?;

        let target = self.find_most_recent(snack_id).await?;
        self.apply_update(target.id, &update, now).await
    }

    /// Correct a specific record, typically a past week
    pub async fn update_by_id(
        &self,
        record_id: Uuid,
        input: TrackingEntryInput,
        now: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let update = validate_tracking_entry(&input)?;
        self.apply_update(record_id, &update, now).await
    }

    /// Add a completed delivery to the snack's record for the week of `now`
    pub async fn record_delivery(
        &self,
        input: DeliveryInput,
        now: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let quantity = validate_delivery_quantity(&input.quantity)?;
        let week_start_date = week_start_of(now, self.week_start);

        let record = self
            .store
            .upsert_delivery(input.snack_id, week_start_date, quantity, now)
            .await?;

        tracing::info!(
            record_id = %record.id,
            snack_id = %record.snack_id,
            week_start = %week_start_date,
            delivered = quantity,
            initial_quantity = record.initial_quantity,
            "Delivery recorded"
        );
        Ok(record)
    }

    /// Delete every tracking record
    pub async fn clear_all(&self) -> AppResult<u64> {
        let removed = self.store.clear_all().await?;
        tracing::warn!(removed, store = self.store.name(), "All tracking records cleared");
        Ok(removed)
    }

    /// Records for the week containing `now`, each annotated with the week bounds
    pub async fn current_week_summary(&self, now: DateTime<Utc>) -> AppResult<Vec<CurrentWeekEntry>> {
        let week: DateRange = current_week(now, self.week_start);
        let records = self.store.list_in_range(week).await?;
        Ok(records
            .into_iter()
            .map(|record| CurrentWeekEntry {
                record,
                week_start: week.start,
                week_end: week.end,
            })
            .collect())
    }
}
