use chrono::NaiveDate;
use proptest::prelude::*;

use estatepay::core::AppError;
use estatepay::modules::payments::models::BillingFrequency;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod billing_frequency_tests {
    use super::*;

    #[test]
    fn test_daily_advances_one_day() {
        assert_eq!(
            BillingFrequency::Daily.next_due(date(2024, 1, 15)).unwrap(),
            date(2024, 1, 16)
        );
        assert_eq!(
            BillingFrequency::Daily.next_due(date(2024, 12, 31)).unwrap(),
            date(2025, 1, 1)
        );
    }

    #[test]
    fn test_weekly_advances_seven_days() {
        assert_eq!(
            BillingFrequency::Weekly.next_due(date(2024, 1, 15)).unwrap(),
            date(2024, 1, 22)
        );
    }

    #[test]
    fn test_monthly_advances_one_calendar_month() {
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2024, 1, 15)).unwrap(),
            date(2024, 2, 15)
        );
    }

    #[test]
    fn test_monthly_clamps_to_short_months() {
        // Leap year February
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2024, 1, 31)).unwrap(),
            date(2024, 2, 29)
        );
        // Non-leap year February
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2023, 1, 31)).unwrap(),
            date(2023, 2, 28)
        );
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2024, 3, 31)).unwrap(),
            date(2024, 4, 30)
        );
    }

    #[test]
    fn test_parse_accepts_known_frequencies() {
        assert_eq!(BillingFrequency::parse("daily").unwrap(), BillingFrequency::Daily);
        assert_eq!(BillingFrequency::parse("weekly").unwrap(), BillingFrequency::Weekly);
        assert_eq!(BillingFrequency::parse("MONTHLY").unwrap(), BillingFrequency::Monthly);
    }

    #[test]
    fn test_parse_rejects_unknown_frequency() {
        assert!(matches!(
            BillingFrequency::parse("quarterly"),
            Err(AppError::InvalidFrequency(_))
        ));
        assert!(matches!(
            BillingFrequency::parse(""),
            Err(AppError::InvalidFrequency(_))
        ));
    }

    proptest! {
        /// The due date must always move strictly forward, whatever the
        /// start date.
        #[test]
        fn test_next_due_is_strictly_later(
            days_from_epoch in 0i64..36_500i64,
            frequency_index in 0usize..3usize
        ) {
            let from = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
                + chrono::Days::new(days_from_epoch as u64);
            let frequency = [
                BillingFrequency::Daily,
                BillingFrequency::Weekly,
                BillingFrequency::Monthly,
            ][frequency_index];

            let next = frequency.next_due(from).unwrap();
            prop_assert!(next > from);
        }
    }
}
