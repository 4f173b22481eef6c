//! Statistics service: read-side projections over the tracking store
//! Provides lifetime statistics, week-over-week comparison, re-order guidance and CSV export

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    compare_weeks, comparison_weeks, compute_statistics, recommend, AggregateStat, DateRange,
    WeekComparisonReport, WeekStart,
};

use crate::error::{AppError, AppResult};
use crate::store::TrackingStore;

/// Statistics service
#[derive(Clone)]
pub struct StatisticsService {
    store: Arc<dyn TrackingStore>,
    week_start: WeekStart,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn TrackingStore>, week_start: WeekStart) -> Self {
        Self { store, week_start }
    }

    /// Lifetime totals and weekly averages, one entry per snack with records,
    /// sorted by snack name
    pub async fn compute_statistics(&self) -> AppResult<Vec<AggregateStat>> {
        let records = self.store.list_all().await?;
        let mut stats = compute_statistics(&records);
        stats.sort_by(|a, b| {
            a.snack_name
                .is_none()
                .cmp(&b.snack_name.is_none())
                .then_with(|| a.snack_name.cmp(&b.snack_name))
                .then_with(|| a.snack_id.cmp(&b.snack_id))
        });
        Ok(stats)
    }

    /// Compare the week containing `reference` with the week before it
    pub async fn compare_weeks(&self, reference: DateTime<Utc>) -> AppResult<WeekComparisonReport> {
        let (current, previous) = comparison_weeks(reference, self.week_start);
        let records = self
            .store
            .list_in_range(DateRange::new(previous.start, current.end))
            .await?;

        let report = compare_weeks(&records, reference, self.week_start);
        tracing::debug!(
            current_week_start = %report.current_week_start,
            snacks = report.comparisons.len(),
            "Week comparison computed"
        );
        Ok(report)
    }

    /// Re-order guidance over the current statistics
    pub async fn recommendations(&self) -> AppResult<Vec<String>> {
        let stats = self.compute_statistics().await?;
        Ok(recommend(&stats))
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
