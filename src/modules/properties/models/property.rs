use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// Funding status of an investment property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    /// Open for purchase/investment
    Open,
    /// Joint-venture funding goal reached
    Funded,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Funded => "funded",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PropertyStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "open" => Ok(Self::Open),
            "funded" => Ok(Self::Funded),
            _ => Err(format!("Invalid property status: {}", value)),
        }
    }
}

/// Investment/property subject record
///
/// Owned by the property subsystem; the settlement engine only applies the
/// deltas below, inside the same transaction as the payment write. The
/// mutators hold the effect rules and are exercised directly by unit tests.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: Decimal,
    /// Total issuable share units (share-sale properties)
    pub number_of_units: i64,
    pub total_shares_sold: i64,
    /// Joint-venture contributions accumulated so far, in kobo
    pub amount_raised_minor: i64,
    pub funding_goal_minor: i64,
    #[sqlx(try_from = "String")]
    pub status: PropertyStatus,
    pub is_sold: bool,
    pub owner_id: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Mark the property sold to `owner_id` (sale and flip purchases)
    pub fn mark_sold(&mut self, owner_id: &str, at: DateTime<Utc>) {
        self.is_sold = true;
        self.owner_id = Some(owner_id.to_string());
        self.sold_at = Some(at);
    }

    /// Record a share purchase; marks the property sold once every issuable
    /// unit has been taken.
    pub fn record_share_sale(&mut self, units: i64, at: DateTime<Utc>) -> Result<()> {
        if units <= 0 {
            return Err(AppError::validation(format!(
                "Share count must be positive, got {}",
                units
            )));
        }

        self.total_shares_sold += units;
        if self.total_shares_sold >= self.number_of_units {
            self.is_sold = true;
            self.sold_at = Some(at);
        }

        Ok(())
    }

    /// Record a joint-venture contribution in kobo; flips status to funded
    /// once the goal is reached.
    pub fn record_contribution(&mut self, amount_minor: i64) -> Result<()> {
        if amount_minor <= 0 {
            return Err(AppError::invalid_amount(format!(
                "Contribution must be positive, got {}",
                amount_minor
            )));
        }

        self.amount_raised_minor += amount_minor;
        if self.funding_goal_minor > 0 && self.amount_raised_minor >= self.funding_goal_minor {
            self.status = PropertyStatus::Funded;
        }

        Ok(())
    }
}
