//! Re-order guidance derived from aggregate statistics

use serde::{Deserialize, Serialize};

use crate::models::AggregateStat;

/// Direction an order quantity should move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAdjustment {
    Reduce,
    Increase,
}

/// Which way, if any, a snack's order should move. Equal averages, including
/// a snack with neither waste nor shortage, need no change.
pub fn order_adjustment(stat: &AggregateStat) -> Option<OrderAdjustment> {
    if stat.avg_weekly_waste > stat.avg_weekly_shortage {
        Some(OrderAdjustment::Reduce)
    } else if stat.avg_weekly_shortage > stat.avg_weekly_waste {
        Some(OrderAdjustment::Increase)
    } else {
        None
    }
}

/// Human-readable guidance, one line per snack that needs a change, in the
/// order of `stats`.
pub fn recommend(stats: &[AggregateStat]) -> Vec<String> {
    stats
        .iter()
        .filter_map(|stat| {
            let name = stat.display_name();
            order_adjustment(stat).map(|adjustment| match adjustment {
                OrderAdjustment::Reduce => format!(
                    "Consider reducing the order quantity for {}: average weekly waste ({}) exceeds average weekly shortage ({})",
                    name, stat.avg_weekly_waste, stat.avg_weekly_shortage
                ),
                OrderAdjustment::Increase => format!(
                    "Consider increasing the order quantity for {}: average weekly shortage ({}) exceeds average weekly waste ({})",
                    name, stat.avg_weekly_shortage, stat.avg_weekly_waste
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn stat(name: &str, waste: i64, shortage: i64) -> AggregateStat {
        AggregateStat {
            snack_id: Uuid::new_v4(),
            snack_name: Some(name.to_string()),
            total_wasted: waste,
            total_shortage: shortage,
            record_count: 1,
            avg_weekly_waste: Decimal::from(waste),
            avg_weekly_shortage: Decimal::from(shortage),
        }
    }

    #[test]
    fn test_reduce_when_waste_dominates() {
        let lines = recommend(&[stat("Trail Mix", 5, 1)]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("reducing"));
        assert!(lines[0].contains("Trail Mix"));
    }

    #[test]
    fn test_increase_when_shortage_dominates() {
        let s = stat("Granola Bar", 0, 3);
        assert_eq!(order_adjustment(&s), Some(OrderAdjustment::Increase));
        let lines = recommend(&[s]);
        assert!(lines[0].contains("increasing"));
        assert!(lines[0].contains("Granola Bar"));
    }

    #[test]
    fn test_equal_averages_emit_nothing() {
        assert!(recommend(&[stat("Pretzels", 2, 2), stat("Apples", 0, 0)]).is_empty());
    }

    #[test]
    fn test_order_follows_input() {
        let lines = recommend(&[
            stat("Zesty Crackers", 0, 4),
            stat("Pretzels", 1, 1),
            stat("Almonds", 6, 0),
        ]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Zesty Crackers"));
        assert!(lines[1].contains("Almonds"));
    }

    #[test]
    fn test_unnamed_snack_uses_id() {
        let mut s = stat("", 2, 0);
        s.snack_name = None;
        let lines = recommend(&[s.clone()]);
        assert!(lines[0].contains(&s.snack_id.to_string()));
    }
}
