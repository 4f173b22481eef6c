//! Lifetime wastage/shortage statistics per snack

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{AggregateStat, TrackingRecord};

/// Round to two decimal places, halves away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `total / count` rounded to two decimals; zero when there is nothing to average
pub fn average(total: i64, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(total) / Decimal::from(count))
}

/// Reduce a snapshot of records to one [`AggregateStat`] per snack.
///
/// Snacks appear in the order they are first seen in `records`. Snacks with
/// no records are simply absent.
pub fn compute_statistics(records: &[TrackingRecord]) -> Vec<AggregateStat> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut totals: Vec<(Uuid, Option<String>, i64, i64, i64)> = Vec::new();

    for record in records {
        let slot = *index.entry(record.snack_id).or_insert_with(|| {
            totals.push((record.snack_id, None, 0, 0, 0));
            totals.len() - 1
        });
        let entry = &mut totals[slot];
        if entry.1.is_none() {
            entry.1 = record.snack_name.clone();
        }
        entry.2 += i64::from(record.wasted_quantity);
        entry.3 += i64::from(record.shortage_quantity);
        entry.4 += 1;
    }

    totals
        .into_iter()
        .map(|(snack_id, snack_name, total_wasted, total_shortage, record_count)| AggregateStat {
            snack_id,
            snack_name,
            total_wasted,
            total_shortage,
            record_count,
            avg_weekly_waste: average(total_wasted, record_count),
            avg_weekly_shortage: average(total_shortage, record_count),
        })
        .collect()
}
