use sqlx::{MySql, MySqlPool, Transaction};

use super::super::models::StoredPaymentMethod;
use crate::core::Result;

const METHOD_COLUMNS: &str = "id, user_id, authorization_code, card_type, last4, exp_month, \
     exp_year, bank, reusable, is_default, active, created_at";

/// Persistence for reusable card authorizations
#[derive(Clone)]
pub struct StoredMethodRepository {
    pool: MySqlPool,
}

impl StoredMethodRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_and_code(
        &self,
        user_id: &str,
        authorization_code: &str,
    ) -> Result<Option<StoredPaymentMethod>> {
        let query = format!(
            "SELECT {} FROM stored_payment_methods WHERE user_id = ? AND authorization_code = ?",
            METHOD_COLUMNS
        );

        let method = sqlx::query_as::<_, StoredPaymentMethod>(&query)
            .bind(user_id)
            .bind(authorization_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(method)
    }

    /// Insert within the caller's transaction
    ///
    /// Callers treat a unique violation on (user_id, authorization_code) as
    /// the card already being on file.
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        method: &StoredPaymentMethod,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stored_payment_methods
                (id, user_id, authorization_code, card_type, last4, exp_month,
                 exp_year, bank, reusable, is_default, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&method.id)
        .bind(&method.user_id)
        .bind(&method.authorization_code)
        .bind(&method.card_type)
        .bind(&method.last4)
        .bind(&method.exp_month)
        .bind(&method.exp_year)
        .bind(&method.bank)
        .bind(method.reusable)
        .bind(method.is_default)
        .bind(method.active)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
