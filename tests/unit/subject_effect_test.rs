use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use estatepay::modules::properties::models::{Property, PropertyStatus, Rental};

fn share_property(number_of_units: i64) -> Property {
    Property {
        id: "prop-1".to_string(),
        title: "4-unit terrace, Yaba".to_string(),
        category: "shares".to_string(),
        price: dec!(25000000),
        number_of_units,
        total_shares_sold: 0,
        amount_raised_minor: 0,
        funding_goal_minor: 0,
        status: PropertyStatus::Open,
        is_sold: false,
        owner_id: None,
        sold_at: None,
        created_at: None,
        updated_at: None,
    }
}

fn venture_property(funding_goal_minor: i64) -> Property {
    Property {
        funding_goal_minor,
        category: "joint_venture".to_string(),
        ..share_property(0)
    }
}

#[cfg(test)]
mod subject_effect_tests {
    use super::*;

    #[test]
    fn test_sale_transfers_ownership() {
        let mut property = share_property(0);
        let now = Utc::now();

        property.mark_sold("buyer-7", now);

        assert!(property.is_sold);
        assert_eq!(property.owner_id.as_deref(), Some("buyer-7"));
        assert_eq!(property.sold_at, Some(now));
    }

    #[test]
    fn test_partial_share_sale_keeps_property_open() {
        let mut property = share_property(20);

        property.record_share_sale(5, Utc::now()).unwrap();
        property.record_share_sale(10, Utc::now()).unwrap();

        assert_eq!(property.total_shares_sold, 15);
        assert!(!property.is_sold);
    }

    #[test]
    fn test_final_share_sale_closes_the_property() {
        let mut property = share_property(20);
        let now = Utc::now();

        property.record_share_sale(20, now).unwrap();

        assert!(property.is_sold);
        assert_eq!(property.sold_at, Some(now));
    }

    #[test]
    fn test_share_sale_rejects_zero_units() {
        let mut property = share_property(20);
        assert!(property.record_share_sale(0, Utc::now()).is_err());
    }

    #[test]
    fn test_contributions_accumulate_toward_goal() {
        let mut property = venture_property(10_000_000);

        property.record_contribution(4_000_000).unwrap();
        assert_eq!(property.status, PropertyStatus::Open);

        property.record_contribution(6_000_000).unwrap();
        assert_eq!(property.status, PropertyStatus::Funded);
        assert_eq!(property.amount_raised_minor, 10_000_000);
    }

    #[test]
    fn test_goalless_property_never_flips_to_funded() {
        let mut property = venture_property(0);

        property.record_contribution(50_000_000).unwrap();

        assert_eq!(property.status, PropertyStatus::Open);
    }

    #[test]
    fn test_rent_creates_bounded_window() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let rental =
            Rental::new("prop-1".to_string(), "tenant-3".to_string(), start, 6).unwrap();

        assert_eq!(rental.starts_at, start);
        assert_eq!(
            rental.ends_at,
            Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rent_rejects_zero_duration() {
        assert!(Rental::new("prop-1".to_string(), "tenant-3".to_string(), Utc::now(), 0).is_err());
    }
}
