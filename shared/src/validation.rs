//! Validation rules for tracking writes
//!
//! A record may carry wastage or shortage for a week, never both, and no
//! quantity may be negative.

use serde_json::Value;
use thiserror::Error;

use crate::models::{TrackingEntryInput, TrackingUpdate};

/// Rejected input, naming the offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Read a quantity field. Absent, `null` and blank values count as zero;
/// integral numbers and numeric strings are accepted as-is, including
/// negatives, which [`validate_quantities`] rejects.
pub fn parse_quantity(field: &str, value: Option<&Value>) -> Result<i64, ValidationError> {
    let not_numeric = || ValidationError::new(field, "Quantity must be a whole number");

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Ok(f as i64),
                    _ => Err(not_numeric()),
                }
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<i64>().map_err(|_| not_numeric())
            }
        }
        Some(_) => Err(not_numeric()),
    }
}

/// Wastage and shortage are mutually exclusive for a single week
pub fn validate_exclusive(wasted: i64, shortage: i64) -> Result<(), ValidationError> {
    if wasted > 0 && shortage > 0 {
        return Err(ValidationError::new(
            "wasted_quantity/shortage_quantity",
            "A week cannot record both wastage and shortage; enter only one of them",
        ));
    }
    Ok(())
}

/// Both quantities must be non-negative and fit the stored column
pub fn validate_quantities(wasted: i64, shortage: i64) -> Result<(i32, i32), ValidationError> {
    Ok((
        to_quantity("wasted_quantity", wasted)?,
        to_quantity("shortage_quantity", shortage)?,
    ))
}

fn to_quantity(field: &str, value: i64) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, "Quantity cannot be negative"));
    }
    i32::try_from(value).map_err(|_| ValidationError::new(field, "Quantity is too large"))
}

/// Trimmed notes, or `None` when nothing meaningful was supplied
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Turn a raw submission into an update, checking exclusivity before
/// sign and range.
pub fn validate_tracking_entry(input: &TrackingEntryInput) -> Result<TrackingUpdate, ValidationError> {
    let wasted = parse_quantity("wasted_quantity", input.wasted_quantity.as_ref())?;
    let shortage = parse_quantity("shortage_quantity", input.shortage_quantity.as_ref())?;

    validate_exclusive(wasted, shortage)?;
    let (wasted_quantity, shortage_quantity) = validate_quantities(wasted, shortage)?;

    Ok(TrackingUpdate {
        wasted_quantity,
        shortage_quantity,
        notes: normalize_notes(input.notes.as_deref()),
    })
}

/// A delivery must add a positive quantity
pub fn validate_delivery_quantity(value: &Value) -> Result<i32, ValidationError> {
    let quantity = parse_quantity("quantity", Some(value))?;
    if quantity <= 0 {
        return Err(ValidationError::new("quantity", "Delivered quantity must be positive"));
    }
    i32::try_from(quantity).map_err(|_| ValidationError::new("quantity", "Quantity is too large"))
}
