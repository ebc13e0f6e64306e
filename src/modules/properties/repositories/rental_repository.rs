use sqlx::{MySql, Transaction};

use super::super::models::Rental;
use crate::core::Result;

/// Persistence for rental windows
///
/// Rentals are only ever written inside the settlement transaction, so this
/// repository carries no pool of its own.
#[derive(Clone, Default)]
pub struct RentalRepository;

impl RentalRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert a rental within the caller's transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        rental: &Rental,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rentals (id, property_id, tenant_id, starts_at, ends_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rental.id)
        .bind(&rental.property_id)
        .bind(&rental.tenant_id)
        .bind(rental.starts_at)
        .bind(rental.ends_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
