//! Validation helper functions for configuration types.

use crate::core::errors::{DocAlignError, Result};

/// Threshold value that disables distance filtering.
pub const THRESHOLD_DISABLED: f64 = -1.0;

/// Whether `threshold` is the "filtering disabled" sentinel.
pub fn is_threshold_disabled(threshold: f64) -> bool {
    (threshold - THRESHOLD_DISABLED).abs() < f64::EPSILON
}

/// Validate that a distance threshold is either the disabled sentinel or a
/// finite non-negative number.
pub fn validate_threshold(value: f64, field: &str) -> Result<()> {
    if is_threshold_disabled(value) {
        return Ok(());
    }
    if !value.is_finite() || value < 0.0 {
        return Err(DocAlignError::validation_field(
            format!("{} must be -1 (disabled) or a non-negative number, got {}", field, value),
            field,
        ));
    }
    Ok(())
}

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(DocAlignError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a string value is not blank.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocAlignError::validation_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}
