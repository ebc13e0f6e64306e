use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

impl TransactionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for TransactionDirection {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Invalid transaction direction: {}", value)),
        }
    }
}

/// Immutable wallet ledger entry
///
/// Created exclusively as a side effect of a ledger credit or debit, never
/// updated or deleted. A non-null `reference` is unique system-wide and is
/// the idempotency key for gateway-settled credits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletTransaction {
    pub id: String,
    pub wallet_id: String,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub direction: TransactionDirection,
    pub amount_minor: i64,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl WalletTransaction {
    pub fn new(
        wallet_id: String,
        user_id: String,
        direction: TransactionDirection,
        amount_minor: i64,
        reference: Option<String>,
        reason: Option<String>,
    ) -> Result<Self> {
        if amount_minor <= 0 {
            return Err(AppError::invalid_amount(format!(
                "Ledger amount must be positive, got {}",
                amount_minor
            )));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            wallet_id,
            user_id,
            direction,
            amount_minor,
            reference,
            reason,
            created_at: Some(Utc::now()),
        })
    }
}
