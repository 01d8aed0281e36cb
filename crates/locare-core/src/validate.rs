//! Shared validation helpers
//!
//! Small, reusable checks used by the engine before any write is issued.

use chrono::NaiveDate;

use crate::errors::{invalid_input, invalid_range, Result};

/// Require `end` strictly after `start`
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end <= start {
        return Err(invalid_range(format!(
            "end date {} must be after start date {}",
            end, start
        )));
    }
    Ok(())
}

/// Require a positive, finite monetary amount
pub fn positive_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid_range(format!("{} must be positive", field)));
    }
    Ok(())
}

/// Require a non-blank text field
pub fn required_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid_input(format!("{} cannot be empty", field)));
    }
    Ok(())
}
