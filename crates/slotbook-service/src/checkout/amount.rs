//! Major-to-minor currency unit conversion.

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;

/// Convert a major-unit price to minor units with `round(price * 100)`.
///
/// Negative and non-finite prices are rejected.
pub fn to_minor_units(price: f64) -> AppResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(
            "price must be a finite, non-negative number",
        ));
    }

    let minor = (price * 100.0).round();
    if minor > i64::MAX as f64 {
        return Err(AppError::validation("price is too large"));
    }
    Ok(minor as i64)
}
