use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, Transaction};

use super::super::models::Installment;
use crate::core::Result;

const INSTALLMENT_COLUMNS: &str = "id, user_id, email, reference, property_id, category, amount, \
     frequency, duration_months, status, start_date, next_payment_date, plan_code, \
     subscription_code, authorization_code, customer_code, paid, created_at";

/// Persistence for recurring installment plans
#[derive(Clone)]
pub struct InstallmentRepository {
    pool: MySqlPool,
}

impl InstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Find a plan by its initial charge reference
    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Installment>> {
        let query = format!(
            "SELECT {} FROM installments WHERE reference = ?",
            INSTALLMENT_COLUMNS
        );

        let installment = sqlx::query_as::<_, Installment>(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        Ok(installment)
    }

    /// Reuse an existing plan code for the same user/property/category
    pub async fn find_plan_code(
        &self,
        user_id: &str,
        property_id: &str,
        category: &str,
    ) -> Result<Option<String>> {
        let plan_code: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT plan_code FROM installments
            WHERE user_id = ? AND property_id = ? AND category = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan_code.map(|(code,)| code))
    }

    /// Plans due for an off-session charge on `date`
    pub async fn find_due_unpaid(&self, date: NaiveDate) -> Result<Vec<Installment>> {
        let query = format!(
            "SELECT {} FROM installments \
             WHERE next_payment_date = ? AND paid = FALSE AND status = 'active'",
            INSTALLMENT_COLUMNS
        );

        let installments = sqlx::query_as::<_, Installment>(&query)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(installments)
    }

    /// Insert a plan within the caller's transaction
    ///
    /// A duplicate reference surfaces as a unique violation; the settlement
    /// engine maps that to the already-processed outcome.
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        installment: &Installment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO installments
                (id, user_id, email, reference, property_id, category, amount,
                 frequency, duration_months, status, start_date,
                 next_payment_date, plan_code, subscription_code,
                 authorization_code, customer_code, paid)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&installment.id)
        .bind(&installment.user_id)
        .bind(&installment.email)
        .bind(&installment.reference)
        .bind(&installment.property_id)
        .bind(installment.category.as_str())
        .bind(installment.amount)
        .bind(installment.frequency.as_str())
        .bind(installment.duration_months)
        .bind(installment.status.as_str())
        .bind(installment.start_date)
        .bind(installment.next_payment_date)
        .bind(&installment.plan_code)
        .bind(&installment.subscription_code)
        .bind(&installment.authorization_code)
        .bind(&installment.customer_code)
        .bind(installment.paid)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Advance a plan's due date after a settled recurring charge
    pub async fn advance_next_payment_date_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        installment_id: &str,
        next_payment_date: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE installments
            SET next_payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(next_payment_date)
        .bind(installment_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Close out a plan whose agreed term has run; it leaves the sweep's
    /// due scan for good
    pub async fn complete_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        installment_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE installments
            SET paid = TRUE, status = 'completed'
            WHERE id = ?
            "#,
        )
        .bind(installment_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
