use sqlx::{MySql, MySqlPool, Transaction};

use super::super::models::Payment;
use crate::core::Result;

const PAYMENT_COLUMNS: &str = "id, user_id, property_id, category, shares, amount, reference, \
     email, status, paid_at, customer_code, metadata, created_at";

/// Persistence for settled payment records
///
/// `reference` carries a UNIQUE index; inserting a duplicate surfaces a
/// unique violation that the settlement engine maps to the
/// already-processed outcome.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: MySqlPool,
}

impl PaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Find a payment by its gateway reference
    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let query = format!(
            "SELECT {} FROM payments WHERE reference = ?",
            PAYMENT_COLUMNS
        );

        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Insert a payment within the caller's transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        payment: &Payment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, user_id, property_id, category, shares, amount, reference,
                 email, status, paid_at, customer_code, metadata)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.user_id)
        .bind(&payment.property_id)
        .bind(payment.category.as_str())
        .bind(payment.shares)
        .bind(payment.amount)
        .bind(&payment.reference)
        .bind(&payment.email)
        .bind(payment.status.as_str())
        .bind(payment.paid_at)
        .bind(&payment.customer_code)
        .bind(&payment.metadata)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
