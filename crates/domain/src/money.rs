//! Currency amounts.
//!
//! Amounts are plain `f64` values in the single operating currency. Rates and
//! totals must be finite and non-negative.

use crate::error::ValidationError;

/// Round an amount to cents, half away from zero (`2.345 -> 2.35`, `-2.345 -> -2.35`).
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Check that `value` is a usable amount for `field`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAmount`] for negative, NaN or infinite values.
pub fn ensure_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_to_two_decimals() {
        assert!((round_cents(400.0) - 400.0).abs() < f64::EPSILON);
        assert!((round_cents(12.344) - 12.34).abs() < f64::EPSILON);
        assert!((round_cents(12.346) - 12.35).abs() < f64::EPSILON);
    }

    #[test]
    fn should_round_thirds_deterministically() {
        // 10/hour for 20 minutes
        assert!((round_cents(10.0 / 3.0) - 3.33).abs() < f64::EPSILON);
        assert!((round_cents(20.0 / 3.0) - 6.67).abs() < f64::EPSILON);
    }

    #[test]
    fn should_accept_zero_and_positive_amounts() {
        assert!(ensure_amount("hourly_rate", 0.0).is_ok());
        assert!(ensure_amount("hourly_rate", 12.5).is_ok());
    }

    #[test]
    fn should_reject_negative_and_non_finite_amounts() {
        for value in [-0.01, f64::NAN, f64::INFINITY] {
            assert_eq!(
                ensure_amount("hourly_rate", value),
                Err(ValidationError::InvalidAmount {
                    field: "hourly_rate"
                })
            );
        }
    }
}
