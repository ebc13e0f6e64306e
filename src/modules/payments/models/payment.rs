use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::investment_category::InvestmentCategory;
use crate::core::{AppError, Result};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Initiated, awaiting gateway confirmation
    Pending,
    /// Settled
    Success,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            _ => Err(format!("Invalid payment status: {}", value)),
        }
    }
}

/// Record of a settled one-time payment
///
/// Created exactly once per confirmed external reference; the UNIQUE index
/// on `reference` is the idempotency key. Amount is stored in major units,
/// converted from the gateway's minor-unit figure at settlement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    #[sqlx(try_from = "String")]
    pub category: InvestmentCategory,
    pub shares: Option<i64>,
    pub amount: Decimal,
    pub reference: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub customer_code: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        shares: Option<i64>,
        amount: Decimal,
        reference: String,
        email: String,
        paid_at: Option<DateTime<Utc>>,
        customer_code: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::invalid_amount(format!(
                "Payment amount must be positive, got {}",
                amount
            )));
        }

        if reference.trim().is_empty() {
            return Err(AppError::validation("Payment reference cannot be empty"));
        }

        if category == InvestmentCategory::Shares && shares.is_none() {
            return Err(AppError::validation(
                "Share payments must carry a share count",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            property_id,
            category,
            shares,
            amount,
            reference,
            email,
            status: PaymentStatus::Success,
            paid_at,
            customer_code,
            metadata,
            created_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_creation() {
        let payment = Payment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Shares,
            Some(10),
            dec!(1000000),
            "trx_user-1_1700000000_ab12cd34".to_string(),
            "ada@example.com".to_string(),
            Some(Utc::now()),
            Some("CUS_xyz".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.shares, Some(10));
    }

    #[test]
    fn test_payment_rejects_non_positive_amount() {
        let payment = Payment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Sale,
            None,
            Decimal::ZERO,
            "trx_x".to_string(),
            "ada@example.com".to_string(),
            None,
            None,
            None,
        );
        assert!(payment.is_err());
    }

    #[test]
    fn test_payment_rejects_empty_reference() {
        let payment = Payment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Sale,
            None,
            dec!(5000),
            "  ".to_string(),
            "ada@example.com".to_string(),
            None,
            None,
            None,
        );
        assert!(payment.is_err());
    }

    #[test]
    fn test_share_payment_requires_share_count() {
        let payment = Payment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Shares,
            None,
            dec!(5000),
            "trx_x".to_string(),
            "ada@example.com".to_string(),
            None,
            None,
            None,
        );
        assert!(payment.is_err());
    }
}
