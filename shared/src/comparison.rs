//! Week-over-week comparison of tracking records

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{TrackingRecord, WeekComparison, WeekComparisonReport};
use crate::statistics::round2;
use crate::types::{DateRange, WeekStart};
use crate::week::{current_week, previous_week};

/// Percentage change from `previous` to `current`, rounded to two decimals.
///
/// There is no meaningful change from a zero (or negative) baseline, so those
/// yield `None` instead of an infinite or zero figure.
pub fn change_percentage(previous: i64, current: i64) -> Option<Decimal> {
    if previous <= 0 {
        return None;
    }
    let delta = Decimal::from(current) - Decimal::from(previous);
    Some(round2(delta * Decimal::from(100) / Decimal::from(previous)))
}

/// The two weeks a comparison covers: `(current, previous)`
pub fn comparison_weeks(reference: DateTime<Utc>, week_start: WeekStart) -> (DateRange, DateRange) {
    let current = current_week(reference, week_start);
    (current, previous_week(current))
}

#[derive(Default)]
struct WeekTotals {
    initial: i64,
    wasted: i64,
    shortage: i64,
}

impl WeekTotals {
    fn add(&mut self, record: &TrackingRecord) {
        self.initial += i64::from(record.initial_quantity);
        self.wasted += i64::from(record.wasted_quantity);
        self.shortage += i64::from(record.shortage_quantity);
    }
}

struct SnackWeeks {
    snack_id: Uuid,
    snack_name: Option<String>,
    current: WeekTotals,
    previous: WeekTotals,
}

/// Compare the calendar week containing `reference` with the week before it.
///
/// `records` may contain anything; only records dated inside the two weeks
/// are considered. Every snack with a record in either week gets one entry,
/// with the missing side zero-filled. Snacks seen in neither week are absent.
pub fn compare_weeks(
    records: &[TrackingRecord],
    reference: DateTime<Utc>,
    week_start: WeekStart,
) -> WeekComparisonReport {
    let (current, previous) = comparison_weeks(reference, week_start);

    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut snacks: Vec<SnackWeeks> = Vec::new();

    for record in records {
        let in_current = current.contains(record.week_start_date);
        if !in_current && !previous.contains(record.week_start_date) {
            continue;
        }

        let slot = *index.entry(record.snack_id).or_insert_with(|| {
            snacks.push(SnackWeeks {
                snack_id: record.snack_id,
                snack_name: None,
                current: WeekTotals::default(),
                previous: WeekTotals::default(),
            });
            snacks.len() - 1
        });
        let entry = &mut snacks[slot];
        if entry.snack_name.is_none() {
            entry.snack_name = record.snack_name.clone();
        }
        if in_current {
            entry.current.add(record);
        } else {
            entry.previous.add(record);
        }
    }

    let comparisons = snacks
        .into_iter()
        .map(|s| WeekComparison {
            snack_id: s.snack_id,
            snack_name: s.snack_name,
            current_initial: s.current.initial,
            current_wasted: s.current.wasted,
            current_shortage: s.current.shortage,
            previous_initial: s.previous.initial,
            previous_wasted: s.previous.wasted,
            previous_shortage: s.previous.shortage,
            initial_change_percentage: change_percentage(s.previous.initial, s.current.initial),
            waste_change_percentage: change_percentage(s.previous.wasted, s.current.wasted),
            shortage_change_percentage: change_percentage(s.previous.shortage, s.current.shortage),
        })
        .collect();

    WeekComparisonReport {
        current_week_start: current.start,
        previous_week_start: previous.start,
        comparisons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(snack_id: Uuid, week: NaiveDate, initial: i32, wasted: i32, shortage: i32) -> TrackingRecord {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let mut record = TrackingRecord::delivered(snack_id, week, initial, at);
        record.wasted_quantity = wasted;
        record.shortage_quantity = shortage;
        record
    }

    fn reference() -> DateTime<Utc> {
        // Wednesday; Sunday-anchored week starts 2026-10-11
        Utc.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap()
    }

    fn this_week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 11).unwrap()
    }

    fn last_week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 4).unwrap()
    }

    #[test]
    fn test_change_percentage() {
        assert_eq!(change_percentage(10, 15), Some(dec("50.00")));
        assert_eq!(change_percentage(10, 0), Some(dec("-100.00")));
        assert_eq!(change_percentage(3, 4), Some(dec("33.33")));
        assert_eq!(change_percentage(0, 4), None);
        assert_eq!(change_percentage(0, 0), None);
    }

    #[test]
    fn test_week_bounds_in_report() {
        let report = compare_weeks(&[], reference(), WeekStart::default());
        assert_eq!(report.current_week_start, this_week());
        assert_eq!(report.previous_week_start, last_week());
        assert!(report.comparisons.is_empty());
    }

    #[test]
    fn test_wastage_then_shortage_week() {
        let snack = Uuid::new_v4();
        let records = vec![
            record(snack, last_week(), 100, 10, 0),
            record(snack, this_week(), 120, 0, 5),
        ];

        let report = compare_weeks(&records, reference(), WeekStart::default());
        assert_eq!(report.comparisons.len(), 1);
        let c = &report.comparisons[0];
        assert_eq!(c.current_wasted, 0);
        assert_eq!(c.previous_wasted, 10);
        assert_eq!(c.waste_change_percentage, Some(dec("-100.00")));
        assert_eq!(c.current_shortage, 5);
        assert_eq!(c.previous_shortage, 0);
        assert_eq!(c.shortage_change_percentage, None);
        assert_eq!(c.initial_change_percentage, Some(dec("20.00")));
    }

    #[test]
    fn test_current_week_only_has_no_percentages() {
        let snack = Uuid::new_v4();
        let records = vec![record(snack, this_week(), 50, 4, 0)];

        let c = &compare_weeks(&records, reference(), WeekStart::default()).comparisons[0];
        assert_eq!(c.previous_initial, 0);
        assert_eq!(c.previous_wasted, 0);
        assert_eq!(c.previous_shortage, 0);
        assert_eq!(c.initial_change_percentage, None);
        assert_eq!(c.waste_change_percentage, None);
        assert_eq!(c.shortage_change_percentage, None);
    }

    #[test]
    fn test_previous_week_only_is_zero_filled() {
        let snack = Uuid::new_v4();
        let records = vec![record(snack, last_week(), 40, 0, 8)];

        let c = &compare_weeks(&records, reference(), WeekStart::default()).comparisons[0];
        assert_eq!(c.current_initial, 0);
        assert_eq!(c.initial_change_percentage, Some(dec("-100.00")));
        assert_eq!(c.waste_change_percentage, None);
        assert_eq!(c.shortage_change_percentage, Some(dec("-100.00")));
    }

    #[test]
    fn test_records_outside_window_ignored() {
        let old = Uuid::new_v4();
        let future = Uuid::new_v4();
        let records = vec![
            record(old, NaiveDate::from_ymd_opt(2026, 9, 27).unwrap(), 10, 1, 0),
            record(future, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 10, 1, 0),
        ];

        let report = compare_weeks(&records, reference(), WeekStart::default());
        assert!(report.comparisons.is_empty());
    }

    #[test]
    fn test_serializes_missing_change_as_null() {
        let snack = Uuid::new_v4();
        let records = vec![record(snack, this_week(), 50, 4, 0)];
        let report = compare_weeks(&records, reference(), WeekStart::default());

        let json = serde_json::to_value(&report).unwrap();
        let c = &json["comparisons"][0];
        assert!(c["waste_change_percentage"].is_null());
        assert_eq!(json["current_week_start"], "2026-10-11");
    }
}
