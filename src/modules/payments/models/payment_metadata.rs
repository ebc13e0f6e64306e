use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::installment::BillingFrequency;
use super::investment_category::InvestmentCategory;
use crate::core::{AppError, Result};

/// Routing tag attached to every outbound charge
///
/// Echoed back verbatim by the gateway in verify responses and webhook
/// events; the settlement engine dispatches on `payment_kind` to decide what
/// a confirmed charge means.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "payment_kind", rename_all = "snake_case")]
pub enum PaymentMetadata {
    /// Single charge settled against a property effect
    OneTime {
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        shares: Option<i64>,
        duration_months: Option<u32>,
    },
    /// First charge of a recurring plan; settlement creates the plan row
    Installment {
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        frequency: BillingFrequency,
        duration_months: Option<u32>,
    },
    /// Off-session recurring charge raised by the auto-debit sweep
    InstallmentCharge { installment_reference: String },
    /// Direct wallet top-up
    WalletFunding { user_id: String },
}

impl PaymentMetadata {
    /// Parse the metadata object a gateway payload carries
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            AppError::validation(format!("Unrecognized payment metadata: {}", e))
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_time_round_trip() {
        let metadata = PaymentMetadata::OneTime {
            user_id: "user-1".to_string(),
            property_id: "prop-1".to_string(),
            category: InvestmentCategory::Shares,
            shares: Some(5),
            duration_months: None,
        };

        let value = metadata.to_value().unwrap();
        assert_eq!(value["payment_kind"], "one_time");

        match PaymentMetadata::from_value(&value).unwrap() {
            PaymentMetadata::OneTime { shares, .. } => assert_eq!(shares, Some(5)),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_installment_charge_parse() {
        let value = json!({
            "payment_kind": "installment_charge",
            "installment_reference": "trx_u1_1700000000_ab12cd34"
        });

        match PaymentMetadata::from_value(&value).unwrap() {
            PaymentMetadata::InstallmentCharge { installment_reference } => {
                assert_eq!(installment_reference, "trx_u1_1700000000_ab12cd34")
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let value = json!({"payment_kind": "refund", "user_id": "user-1"});
        assert!(matches!(
            PaymentMetadata::from_value(&value),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_tag_is_rejected() {
        let value = json!({"user_id": "user-1"});
        assert!(PaymentMetadata::from_value(&value).is_err());
    }
}
