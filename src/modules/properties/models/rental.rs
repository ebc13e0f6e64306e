use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Rental window created when a rent payment settles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Rental {
    /// Create a rental window of `duration_months` starting now
    pub fn new(
        property_id: String,
        tenant_id: String,
        starts_at: DateTime<Utc>,
        duration_months: u32,
    ) -> Result<Self> {
        if duration_months == 0 {
            return Err(AppError::validation(
                "Rental duration must be at least one month",
            ));
        }

        let ends_at = starts_at
            .checked_add_months(Months::new(duration_months))
            .ok_or_else(|| AppError::validation("Rental end date out of range"))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            property_id,
            tenant_id,
            starts_at,
            ends_at,
            created_at: Some(starts_at),
        })
    }
}
