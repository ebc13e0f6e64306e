use serde_json::json;

use estatepay::core::AppError;
use estatepay::modules::payments::models::{InvestmentCategory, PaymentMetadata};
use estatepay::modules::payments::services::{PaymentOption, PaymentRequest};

fn request_json() -> serde_json::Value {
    json!({
        "user_id": "user-1",
        "property_id": "prop-1",
        "category": "sale",
        "amount": "500000",
        "payment_option": "card"
    })
}

#[cfg(test)]
mod payment_request_tests {
    use super::*;

    #[test]
    fn test_minimal_request_deserializes() {
        let request: PaymentRequest = serde_json::from_value(request_json()).unwrap();

        assert_eq!(request.category, InvestmentCategory::Sale);
        assert_eq!(request.payment_option, "card");
        assert!(request.frequency.is_none());
        assert!(request.shares.is_none());
    }

    #[test]
    fn test_category_aliases_are_accepted() {
        let mut body = request_json();
        body["category"] = json!("property");
        let request: PaymentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.category, InvestmentCategory::Sale);

        let mut body = request_json();
        body["category"] = json!("co-vest");
        let request: PaymentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.category, InvestmentCategory::JointVenture);
    }

    #[test]
    fn test_unknown_category_fails_deserialization() {
        let mut body = request_json();
        body["category"] = json!("timeshare");
        assert!(serde_json::from_value::<PaymentRequest>(body).is_err());
    }

    #[test]
    fn test_payment_option_parsing() {
        assert_eq!(PaymentOption::parse("card").unwrap(), PaymentOption::Card);
        assert_eq!(PaymentOption::parse("bank").unwrap(), PaymentOption::Bank);
        assert_eq!(
            PaymentOption::parse("transfer").unwrap(),
            PaymentOption::Transfer
        );
        assert_eq!(PaymentOption::parse("wallet").unwrap(), PaymentOption::Wallet);
        assert!(matches!(
            PaymentOption::parse("cash"),
            Err(AppError::InvalidPaymentOption(_))
        ));
    }

    #[test]
    fn test_metadata_kinds_round_trip_through_json() {
        let one_time = PaymentMetadata::OneTime {
            user_id: "user-1".to_string(),
            property_id: "prop-1".to_string(),
            category: InvestmentCategory::Rent,
            shares: None,
            duration_months: Some(12),
        };

        let value = one_time.to_value().unwrap();
        assert_eq!(value["payment_kind"], "one_time");
        assert_eq!(value["duration_months"], 12);

        match PaymentMetadata::from_value(&value).unwrap() {
            PaymentMetadata::OneTime {
                category,
                duration_months,
                ..
            } => {
                assert_eq!(category, InvestmentCategory::Rent);
                assert_eq!(duration_months, Some(12));
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_wallet_funding_metadata() {
        let value = json!({"payment_kind": "wallet_funding", "user_id": "user-1"});

        match PaymentMetadata::from_value(&value).unwrap() {
            PaymentMetadata::WalletFunding { user_id } => assert_eq!(user_id, "user-1"),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_untagged_metadata_is_rejected() {
        let value = json!({"custom_field": "free-form"});
        assert!(PaymentMetadata::from_value(&value).is_err());
    }
}
