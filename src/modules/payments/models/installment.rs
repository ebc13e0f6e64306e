use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::investment_category::InvestmentCategory;
use crate::core::{AppError, Result};

/// Billing cadence for an installment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl BillingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parse a user-supplied frequency string
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(AppError::InvalidFrequency(value.to_string())),
        }
    }

    /// Next due date after `from`
    ///
    /// Monthly advances by one calendar month, clamping to the last day of
    /// shorter months (Jan 31 -> Feb 29/28).
    pub fn next_due(&self, from: NaiveDate) -> Result<NaiveDate> {
        let next = match self {
            Self::Daily => from.checked_add_days(Days::new(1)),
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
        };
        next.ok_or_else(|| {
            AppError::internal(format!("Next due date out of range from {}", from))
        })
    }
}

impl std::fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for BillingFrequency {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        BillingFrequency::parse(&value).map_err(|_| format!("Invalid frequency: {}", value))
    }
}

/// Lifecycle of an installment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Active,
    Completed,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

/// Recurring payment plan backed by a gateway subscription
///
/// `reference` is the initial charge's reference and the plan's idempotency
/// key. `next_payment_date` drives the auto-debit sweep; it only advances
/// after a recurring charge settles, so a failed charge is retried on the
/// next sweep of the same date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub reference: String,
    pub property_id: String,
    #[sqlx(try_from = "String")]
    pub category: InvestmentCategory,
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub frequency: BillingFrequency,
    /// Agreed plan term in months; `None` means open-ended
    pub duration_months: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: InstallmentStatus,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub plan_code: String,
    pub subscription_code: Option<String>,
    pub authorization_code: Option<String>,
    pub customer_code: Option<String>,
    pub paid: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Installment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        frequency: BillingFrequency,
        amount: Decimal,
        reference: String,
        email: String,
        plan_code: String,
        subscription_code: Option<String>,
        authorization_code: Option<String>,
        customer_code: Option<String>,
        duration_months: Option<i32>,
        first_paid_on: NaiveDate,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::invalid_amount(format!(
                "Installment amount must be positive, got {}",
                amount
            )));
        }

        if reference.trim().is_empty() {
            return Err(AppError::validation("Installment reference cannot be empty"));
        }

        if plan_code.trim().is_empty() {
            return Err(AppError::validation("Installment plan code cannot be empty"));
        }

        let next_payment_date = frequency.next_due(first_paid_on)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            email,
            reference,
            property_id,
            category,
            amount,
            frequency,
            duration_months,
            status: InstallmentStatus::Active,
            start_date: first_paid_on,
            next_payment_date,
            plan_code,
            subscription_code,
            authorization_code,
            customer_code,
            paid: false,
            created_at: Some(Utc::now()),
        })
    }

    /// Whether the plan has run its agreed term once the due date reaches
    /// `next_due`
    ///
    /// Open-ended plans (no duration) never complete on their own.
    pub fn is_complete_after(&self, next_due: NaiveDate) -> bool {
        match self.duration_months {
            Some(months) if months > 0 => self
                .start_date
                .checked_add_months(Months::new(months as u32))
                .map(|term_end| next_due > term_end)
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(BillingFrequency::parse("daily").unwrap(), BillingFrequency::Daily);
        assert_eq!(
            BillingFrequency::parse("Monthly").unwrap(),
            BillingFrequency::Monthly
        );
        assert!(matches!(
            BillingFrequency::parse("fortnightly"),
            Err(AppError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_next_due_daily_and_weekly() {
        assert_eq!(
            BillingFrequency::Daily.next_due(date(2024, 1, 31)).unwrap(),
            date(2024, 2, 1)
        );
        assert_eq!(
            BillingFrequency::Weekly.next_due(date(2024, 12, 28)).unwrap(),
            date(2025, 1, 4)
        );
    }

    #[test]
    fn test_next_due_monthly() {
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2024, 1, 15)).unwrap(),
            date(2024, 2, 15)
        );
        // Clamped to end of shorter month
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2024, 1, 31)).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            BillingFrequency::Monthly.next_due(date(2023, 1, 31)).unwrap(),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn test_installment_first_due_date() {
        let installment = Installment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Shares,
            BillingFrequency::Monthly,
            dec!(250000),
            "trx_user-1_1700000000_ab12cd34".to_string(),
            "ada@example.com".to_string(),
            "PLN_abc".to_string(),
            Some("SUB_abc".to_string()),
            Some("AUTH_abc".to_string()),
            Some("CUS_abc".to_string()),
            Some(12),
            date(2024, 1, 15),
        )
        .unwrap();

        assert_eq!(installment.start_date, date(2024, 1, 15));
        assert_eq!(installment.next_payment_date, date(2024, 2, 15));
        assert_eq!(installment.status, InstallmentStatus::Active);
        assert!(!installment.paid);
    }

    #[test]
    fn test_installment_rejects_empty_plan_code() {
        let installment = Installment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Shares,
            BillingFrequency::Weekly,
            dec!(1000),
            "trx_x".to_string(),
            "ada@example.com".to_string(),
            "".to_string(),
            None,
            None,
            None,
            None,
            date(2024, 1, 1),
        );
        assert!(installment.is_err());
    }

    fn plan_with_duration(duration_months: Option<i32>) -> Installment {
        Installment::new(
            "user-1".to_string(),
            "prop-1".to_string(),
            InvestmentCategory::Rent,
            BillingFrequency::Monthly,
            dec!(100000),
            "trx_user-1_1700000000_ab12cd34".to_string(),
            "ada@example.com".to_string(),
            "PLN_abc".to_string(),
            None,
            Some("AUTH_abc".to_string()),
            None,
            duration_months,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_plan_completes_past_its_term() {
        let plan = plan_with_duration(Some(12));

        // Term runs through 2025-01-15; the final charge lands on it
        assert!(!plan.is_complete_after(date(2025, 1, 15)));
        assert!(plan.is_complete_after(date(2025, 2, 15)));
    }

    #[test]
    fn test_open_ended_plan_never_completes() {
        let plan = plan_with_duration(None);
        assert!(!plan.is_complete_after(date(2030, 1, 1)));

        let degenerate = plan_with_duration(Some(0));
        assert!(!degenerate.is_complete_after(date(2030, 1, 1)));
    }
}
