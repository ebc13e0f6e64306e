use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Per-user wallet holding a balance in kobo
///
/// The balance only changes through the ledger service's credit/debit; it is
/// never assigned directly by other code paths. One wallet per user, created
/// lazily on first reference and soft-disabled via `active`, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    pub balance_minor: i64,
    /// Gateway customer reference, recorded after the first settled charge
    pub customer_code: Option<String>,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// New empty wallet for a user
    pub fn new(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            balance_minor: 0,
            customer_code: None,
            active: true,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    /// Check the balance covers a debit of `amount_minor`
    ///
    /// The ledger service calls this on the row-locked wallet before any
    /// write, so a failed debit leaves the balance and the ledger untouched.
    pub fn ensure_can_debit(&self, amount_minor: i64) -> Result<()> {
        if self.balance_minor < amount_minor {
            return Err(AppError::InsufficientBalance {
                requested: amount_minor,
                available: self.balance_minor,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wallet_starts_empty_and_active() {
        let wallet = Wallet::new("user-1".to_string());
        assert_eq!(wallet.balance_minor, 0);
        assert!(wallet.active);
        assert!(wallet.customer_code.is_none());
        assert_eq!(wallet.user_id, "user-1");
    }
}
