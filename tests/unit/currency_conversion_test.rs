use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use estatepay::core::currency::{to_major_units, to_minor_units};

/// Property-based tests for the naira/kobo conversion boundary
///
/// Validates:
/// - Exact two-decimal amounts survive a round trip unchanged
/// - Sub-kobo precision rounds half away from zero
/// - Non-positive and out-of-range inputs are rejected

#[cfg(test)]
mod currency_conversion_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_round_trip_preserves_two_decimal_amounts(kobo in 1i64..=i64::MAX / 2) {
            let major = to_major_units(kobo).unwrap();
            let back = to_minor_units(major).unwrap();
            prop_assert_eq!(back, kobo);
        }

        #[test]
        fn test_minor_units_are_positive_for_positive_input(
            units in 1i64..1_000_000_000i64,
            cents in 0u32..100u32
        ) {
            let major = Decimal::from(units) + Decimal::new(cents as i64, 2);
            let minor = to_minor_units(major).unwrap();
            prop_assert_eq!(minor, units * 100 + cents as i64);
        }
    }

    #[test]
    fn test_half_kobo_rounds_away_from_zero() {
        // 1.005 naira is 100.5 kobo; half-up gives 101
        assert_eq!(to_minor_units(dec!(1.005)).unwrap(), 101);
        assert_eq!(to_minor_units(dec!(1.004)).unwrap(), 100);
        assert_eq!(to_minor_units(dec!(0.015)).unwrap(), 2);
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        assert!(to_minor_units(dec!(0)).is_err());
        assert!(to_minor_units(dec!(-10)).is_err());
    }

    #[test]
    fn test_rejects_negative_minor_units() {
        assert!(to_major_units(-1).is_err());
    }

    #[test]
    fn test_major_units_have_two_decimal_places() {
        assert_eq!(to_major_units(150_000).unwrap(), dec!(1500.00));
        assert_eq!(to_major_units(1).unwrap(), dec!(0.01));
        assert_eq!(to_major_units(0).unwrap(), dec!(0.00));
    }
}
