use sqlx::MySqlPool;

use super::super::models::BankAccount;
use crate::core::Result;

/// Access to stored bank accounts
#[derive(Clone)]
pub struct BankAccountRepository {
    pool: MySqlPool,
}

impl BankAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Find the user's default bank account, if any
    pub async fn find_default_for_user(&self, user_id: &str) -> Result<Option<BankAccount>> {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT id, user_id, account_number, bank_code, account_name,
                   is_default, created_at
            FROM bank_accounts
            WHERE user_id = ? AND is_default = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
