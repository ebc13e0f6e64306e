use chrono::{DateTime, Utc};
use sqlx::{MySql, Transaction};
use tracing::info;

use super::super::models::InvestmentCategory;
use crate::core::{AppError, Result};
use crate::modules::properties::models::Rental;
use crate::modules::properties::repositories::{PropertyRepository, RentalRepository};

/// What a settled payment does to its property
#[derive(Debug, Clone)]
pub struct SubjectEffect {
    pub user_id: String,
    pub property_id: String,
    pub category: InvestmentCategory,
    /// Share units bought; required for share purchases
    pub shares: Option<i64>,
    /// Settled amount in minor units; drives joint-venture progress
    pub amount_minor: i64,
    /// Rental length; required for rent payments
    pub duration_months: Option<u32>,
    pub at: DateTime<Utc>,
}

/// Applies the per-category property effect inside the settlement
/// transaction
///
/// The property row is read under a lock and written back in the same
/// transaction, so two settlements against one property serialize rather
/// than clobber each other's counters.
#[derive(Clone)]
pub struct SubjectEffectApplier {
    property_repo: PropertyRepository,
    rental_repo: RentalRepository,
}

impl SubjectEffectApplier {
    pub fn new(property_repo: PropertyRepository, rental_repo: RentalRepository) -> Self {
        Self {
            property_repo,
            rental_repo,
        }
    }

    pub async fn apply_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        effect: &SubjectEffect,
    ) -> Result<()> {
        let mut property = self
            .property_repo
            .find_by_id_for_update(tx, &effect.property_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Property '{}' not found", effect.property_id))
            })?;

        match effect.category {
            InvestmentCategory::Sale | InvestmentCategory::Flip => {
                property.mark_sold(&effect.user_id, effect.at);
                self.property_repo
                    .update_effect_fields_with_tx(tx, &property)
                    .await?;
            }
            InvestmentCategory::Shares => {
                let units = effect.shares.ok_or_else(|| {
                    AppError::validation("Share payments must carry a share count")
                })?;
                property.record_share_sale(units, effect.at)?;
                self.property_repo
                    .update_effect_fields_with_tx(tx, &property)
                    .await?;
            }
            InvestmentCategory::JointVenture => {
                property.record_contribution(effect.amount_minor)?;
                self.property_repo
                    .update_effect_fields_with_tx(tx, &property)
                    .await?;
            }
            InvestmentCategory::Rent => {
                let duration = effect.duration_months.ok_or_else(|| {
                    AppError::validation("Rent payments must carry a duration in months")
                })?;
                let rental = Rental::new(
                    effect.property_id.clone(),
                    effect.user_id.clone(),
                    effect.at,
                    duration,
                )?;
                self.rental_repo.create_with_tx(tx, &rental).await?;
            }
        }

        info!(
            property_id = effect.property_id.as_str(),
            category = effect.category.as_str(),
            "Applied settlement effect"
        );

        Ok(())
    }
}
