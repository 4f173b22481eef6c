//! Weekly tracking records and the values derived from them

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One snack's ledger entry for one calendar week.
///
/// `(snack_id, week_start_date)` is the natural key; the store never holds two
/// records for the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: Uuid,
    pub snack_id: Uuid,
    /// Catalog name, when the catalog knows the snack
    #[serde(default)]
    pub snack_name: Option<String>,
    pub week_start_date: NaiveDate,
    /// Quantity delivered for the week. Only the delivery intake writes this.
    pub initial_quantity: i32,
    pub wasted_quantity: i32,
    pub shortage_quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackingRecord {
    /// A freshly delivered week: waste and shortage start at zero.
    pub fn delivered(
        snack_id: Uuid,
        week_start_date: NaiveDate,
        initial_quantity: i32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            snack_id,
            snack_name: None,
            week_start_date,
            initial_quantity,
            wasted_quantity: 0,
            shortage_quantity: 0,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Name used in human-readable output
    pub fn display_name(&self) -> String {
        snack_label(self.snack_name.as_deref(), self.snack_id)
    }

    pub fn outcome(&self) -> SupplyOutcome {
        SupplyOutcome::classify(self.wasted_quantity, self.shortage_quantity)
    }
}

/// How a week turned out for a snack. A week is never both over- and under-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyOutcome {
    OverSupply,
    UnderSupply,
    Balanced,
}

impl SupplyOutcome {
    pub fn classify(wasted: i32, shortage: i32) -> Self {
        if wasted > 0 {
            SupplyOutcome::OverSupply
        } else if shortage > 0 {
            SupplyOutcome::UnderSupply
        } else {
            SupplyOutcome::Balanced
        }
    }
}

impl std::fmt::Display for SupplyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupplyOutcome::OverSupply => write!(f, "Over-supply"),
            SupplyOutcome::UnderSupply => write!(f, "Under-supply"),
            SupplyOutcome::Balanced => write!(f, "Balanced"),
        }
    }
}

/// A validated wastage/shortage write.
///
/// Both quantities are always written together; `notes` of `None` keeps
/// whatever notes the record already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub wasted_quantity: i32,
    pub shortage_quantity: i32,
    pub notes: Option<String>,
}

impl TrackingUpdate {
    /// Apply the update to a record in place
    pub fn apply_to(&self, record: &mut TrackingRecord, at: DateTime<Utc>) {
        record.wasted_quantity = self.wasted_quantity;
        record.shortage_quantity = self.shortage_quantity;
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
        record.updated_at = at;
    }
}

/// Raw wastage/shortage fields as submitted by a client.
///
/// Quantities stay untyped JSON until validation so that strings, fractions and
/// negatives are reported as invalid input rather than as body parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingEntryInput {
    #[serde(default, alias = "wastedQuantity")]
    pub wasted_quantity: Option<serde_json::Value>,
    #[serde(default, alias = "shortageQuantity")]
    pub shortage_quantity: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of a wastage/shortage submission against a snack's most recent week
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordTrackingInput {
    #[serde(default, alias = "snackId")]
    pub snack_id: Option<Uuid>,
    #[serde(flatten)]
    pub entry: TrackingEntryInput,
}

/// Body sent by the order-fulfillment side when a delivery completes
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryInput {
    #[serde(alias = "snackId")]
    pub snack_id: Uuid,
    pub quantity: serde_json::Value,
}

/// Lifetime wastage/shortage figures for one snack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    pub snack_id: Uuid,
    #[serde(default)]
    pub snack_name: Option<String>,
    pub total_wasted: i64,
    pub total_shortage: i64,
    pub record_count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_weekly_waste: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_weekly_shortage: Decimal,
}

impl AggregateStat {
    pub fn display_name(&self) -> String {
        snack_label(self.snack_name.as_deref(), self.snack_id)
    }
}

/// Current vs. previous calendar week for one snack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekComparison {
    pub snack_id: Uuid,
    pub snack_name: Option<String>,
    pub current_initial: i64,
    pub current_wasted: i64,
    pub current_shortage: i64,
    pub previous_initial: i64,
    pub previous_wasted: i64,
    pub previous_shortage: i64,
    /// `None` when there is no positive previous value to compare against
    #[serde(with = "rust_decimal::serde::float_option")]
    pub initial_change_percentage: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub waste_change_percentage: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub shortage_change_percentage: Option<Decimal>,
}

/// Output of the week comparator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekComparisonReport {
    pub current_week_start: NaiveDate,
    pub previous_week_start: NaiveDate,
    pub comparisons: Vec<WeekComparison>,
}

/// Snack name, or its id when the catalog has no name for it
pub fn snack_label(name: Option<&str>, snack_id: Uuid) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => snack_id.to_string(),
    }
}
