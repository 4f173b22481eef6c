//! WebAssembly module for the snack tracking front end
//!
//! Provides client-side computation for:
//! - Wastage/shortage form validation
//! - Week-over-week percentage change
//! - Re-order recommendations from fetched statistics
//! - Calendar week start for a date

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Validate a wastage/shortage form before submitting it.
/// Takes the same JSON body the server accepts.
#[wasm_bindgen]
pub fn validate_tracking_form(entry_json: &str) -> Result<(), JsValue> {
    let entry: TrackingEntryInput = serde_json::from_str(entry_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid entry JSON: {}", e)))?;

    validate_tracking_entry(&entry)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether a week may be saved with these quantities
#[wasm_bindgen]
pub fn is_valid_week_entry(wasted: i32, shortage: i32) -> bool {
    let (wasted, shortage) = (i64::from(wasted), i64::from(shortage));
    validate_exclusive(wasted, shortage).is_ok() && validate_quantities(wasted, shortage).is_ok()
}

/// Label for a week's outcome
#[wasm_bindgen]
pub fn classify_week(wasted: i32, shortage: i32) -> String {
    format!("{}", SupplyOutcome::classify(wasted, shortage))
}

/// Percentage change from `previous` to `current`; `undefined` when the
/// previous value is zero
#[wasm_bindgen]
pub fn change_percentage(previous: i32, current: i32) -> Option<f64> {
    shared::change_percentage(i64::from(previous), i64::from(current)).and_then(|d| d.to_f64())
}

/// Re-order recommendations for a statistics array as returned by the API
#[wasm_bindgen]
pub fn recommend_from_statistics(stats_json: &str) -> Result<String, JsValue> {
    let stats: Vec<AggregateStat> = serde_json::from_str(stats_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid statistics JSON: {}", e)))?;

    serde_json::to_string(&shared::recommend(&stats))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Start of the calendar week containing `date` (YYYY-MM-DD)
#[wasm_bindgen]
pub fn week_start_for(date: &str, week_start: &str) -> Result<String, JsValue> {
    week_start_label(date, week_start).map_err(|e| JsValue::from_str(&e))
}

fn week_start_label(date: &str, week_start: &str) -> Result<String, String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date: {}", e))?;
    let week_start: WeekStart = week_start
        .parse()
        .map_err(|_| "Invalid week start day".to_string())?;

    shared::week_start_of_date(date, week_start)
        .map(|start| start.to_string())
        .ok_or_else(|| format!("Week containing {} starts before the earliest supported date", date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_is_valid_week_entry() {
        assert!(is_valid_week_entry(3, 0));
        assert!(is_valid_week_entry(0, 0));
        assert!(!is_valid_week_entry(3, 2));
        assert!(!is_valid_week_entry(-1, 0));
        assert!(!is_valid_week_entry(0, -4));
        assert!(!is_valid_week_entry(i32::MIN, 0));
    }

    #[test]
    fn test_classify_week() {
        assert_eq!(classify_week(2, 0), "Over-supply");
        assert_eq!(classify_week(0, 2), "Under-supply");
        assert_eq!(classify_week(0, 0), "Balanced");
    }

    #[test]
    fn test_change_percentage() {
        assert_eq!(change_percentage(10, 15), Some(50.0));
        assert_eq!(change_percentage(0, 4), None);
    }

    #[test]
    fn test_validate_tracking_form() {
        assert!(validate_tracking_form(r#"{"wastedQuantity": 2, "shortageQuantity": 0}"#).is_ok());
    }

    #[test]
    fn test_recommend_from_statistics() {
        let stats = r#"[{
            "snack_id": "6f1c7a52-3b0e-4d7b-9a55-0d6c4f0f3e11",
            "snack_name": "Cheese Crackers",
            "total_wasted": 10,
            "total_shortage": 2,
            "record_count": 2,
            "avg_weekly_waste": 5.0,
            "avg_weekly_shortage": 1.0
        }]"#;
        let json = recommend_from_statistics(stats).unwrap();
        let lines: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Cheese Crackers"));
    }

    #[test]
    fn test_week_start_for() {
        assert_eq!(week_start_for("2026-10-14", "sunday").unwrap(), "2026-10-11");
        assert_eq!(week_start_for("2026-10-14", "monday").unwrap(), "2026-10-12");
    }

    #[test]
    fn test_week_start_before_earliest_date_is_an_error() {
        let earliest = NaiveDate::MIN;
        let anchor = earliest.weekday().pred();
        let label = week_start_label(&earliest.format("%Y-%m-%d").to_string(), &anchor.to_string());
        assert!(label.unwrap_err().contains("earliest supported date"));

        let own = week_start_label(
            &earliest.format("%Y-%m-%d").to_string(),
            &earliest.weekday().to_string(),
        );
        assert_eq!(own.unwrap(), earliest.to_string());
    }

    #[test]
    fn test_week_start_label_rejects_bad_input() {
        assert!(week_start_label("14/10/2026", "sunday").unwrap_err().starts_with("Invalid date"));
        assert_eq!(week_start_label("2026-10-14", "someday").unwrap_err(), "Invalid week start day");
    }
}
