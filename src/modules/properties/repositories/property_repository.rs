use sqlx::{MySql, MySqlPool, Transaction};

use super::super::models::Property;
use crate::core::Result;

const PROPERTY_COLUMNS: &str = r#"
    id, title, category, price, number_of_units, total_shares_sold,
    amount_raised_minor, funding_goal_minor, status, is_sold, owner_id,
    sold_at, created_at, updated_at
"#;

/// Persistence for property subject records
///
/// The settlement engine reads a property with `find_by_id_for_update` and
/// writes the mutated row back with `update_effect_fields_with_tx`, so the
/// read-modify-write is serialized against concurrent settlements of the
/// same subject.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: MySqlPool,
}

impl PropertyRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Find property by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Property>> {
        let query = format!(
            "SELECT {} FROM properties WHERE id = ?",
            PROPERTY_COLUMNS
        );

        let property = sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    /// Find property by ID, locking the row for the transaction's duration
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<Property>> {
        let query = format!(
            "SELECT {} FROM properties WHERE id = ? FOR UPDATE",
            PROPERTY_COLUMNS
        );

        let property = sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(property)
    }

    /// Persist the fields the settlement effects mutate
    pub async fn update_effect_fields_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        property: &Property,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE properties
            SET total_shares_sold = ?,
                amount_raised_minor = ?,
                status = ?,
                is_sold = ?,
                owner_id = ?,
                sold_at = ?,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(property.total_shares_sold)
        .bind(property.amount_raised_minor)
        .bind(property.status.as_str())
        .bind(property.is_sold)
        .bind(&property.owner_id)
        .bind(property.sold_at)
        .bind(&property.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
