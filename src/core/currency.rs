use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::error::{AppError, Result};

/// Minor units per major unit (kobo per naira).
pub const MINOR_PER_MAJOR: i64 = 100;

/// Converts a major-unit amount (naira) to integer minor units (kobo).
///
/// All ledger and gateway arithmetic operates on the returned integer;
/// `Decimal` amounts exist only at the API/display boundary. Rounds half-up
/// to the nearest kobo so repeated conversions cannot drift.
///
/// # Errors
/// `InvalidAmount` if the amount is zero or negative, or too large to
/// represent in minor units.
pub fn to_minor_units(major: Decimal) -> Result<i64> {
    if major <= Decimal::ZERO {
        return Err(AppError::invalid_amount(format!(
            "amount must be greater than zero, got {}",
            major
        )));
    }

    let minor = (major * Decimal::from(MINOR_PER_MAJOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    minor.try_into().map_err(|_| {
        AppError::invalid_amount(format!("amount {} is not representable in kobo", major))
    })
}

/// Converts integer minor units (kobo) back to a major-unit amount at
/// two decimal places.
///
/// # Errors
/// `InvalidAmount` if the minor amount is negative.
pub fn to_major_units(minor: i64) -> Result<Decimal> {
    if minor < 0 {
        return Err(AppError::invalid_amount(format!(
            "minor amount cannot be negative, got {}",
            minor
        )));
    }

    Ok(Decimal::new(minor, 2))
}

/// Validates that an amount is strictly positive.
///
/// # Errors
/// `InvalidAmount` naming `label` if `amount <= 0`.
pub fn validate_positive(amount: Decimal, label: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::invalid_amount(format!(
            "{} must be greater than zero, got {}",
            label, amount
        )));
    }
    Ok(())
}

/// Formats a minor-unit amount for display: naira symbol, two decimals.
pub fn format_major(minor: i64) -> String {
    format!("\u{20a6}{:.2}", Decimal::new(minor, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dec!(5000)).unwrap(), 500_000);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
        assert_eq!(to_minor_units(dec!(1234.56)).unwrap(), 123_456);
    }

    #[test]
    fn test_to_minor_units_rounds_half_up() {
        // 10.005 naira is 1000.5 kobo, which rounds away from zero
        assert_eq!(to_minor_units(dec!(10.005)).unwrap(), 1001);
        assert_eq!(to_minor_units(dec!(10.004)).unwrap(), 1000);
    }

    #[test]
    fn test_to_minor_units_rejects_non_positive() {
        assert!(to_minor_units(Decimal::ZERO).is_err());
        assert!(to_minor_units(dec!(-1)).is_err());
    }

    #[test]
    fn test_to_major_units() {
        assert_eq!(to_major_units(500_000).unwrap(), dec!(5000.00));
        assert_eq!(to_major_units(1).unwrap(), dec!(0.01));
        assert_eq!(to_major_units(0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_to_major_units_rejects_negative() {
        assert!(to_major_units(-1).is_err());
    }

    #[test]
    fn test_round_trip() {
        for minor in [1i64, 99, 100, 123_456, 500_000] {
            let major = to_major_units(minor).unwrap();
            assert_eq!(to_minor_units(major).unwrap(), minor);
        }
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(dec!(10), "amount").is_ok());
        let err = validate_positive(Decimal::ZERO, "share price").unwrap_err();
        assert!(err.to_string().contains("share price"));
    }

    #[test]
    fn test_format_major() {
        assert_eq!(format_major(500_000), "\u{20a6}5000.00");
        assert_eq!(format_major(150), "\u{20a6}1.50");
    }
}
