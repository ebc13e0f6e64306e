use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::super::models::{BillingFrequency, InvestmentCategory, Payment, PaymentMetadata};
use super::super::repositories::PaymentRepository;
use super::subject_effects::{SubjectEffect, SubjectEffectApplier};
use crate::core::currency::{to_minor_units, validate_positive};
use crate::core::{AppError, Result};
use crate::modules::gateways::{InitializeChargeRequest, PaymentGateway};
use crate::modules::properties::repositories::PropertyRepository;
use crate::modules::users::repositories::{BankAccountRepository, UserRepository};
use crate::modules::wallets::services::WalletService;

/// How the payer wants to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOption {
    Card,
    Bank,
    Transfer,
    Wallet,
}

impl PaymentOption {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "bank" => Ok(Self::Bank),
            "transfer" => Ok(Self::Transfer),
            "wallet" => Ok(Self::Wallet),
            _ => Err(AppError::InvalidPaymentOption(value.to_string())),
        }
    }

    /// Gateway channel restriction for the hosted payment page
    fn channels(&self) -> Option<Vec<String>> {
        match self {
            Self::Card => Some(vec!["card".to_string()]),
            Self::Bank => Some(vec!["bank".to_string()]),
            Self::Transfer => Some(vec!["bank_transfer".to_string()]),
            Self::Wallet => None,
        }
    }
}

/// Inbound payment request, already deserialized from the API surface
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub user_id: String,
    pub property_id: String,
    pub category: InvestmentCategory,
    pub amount: Decimal,
    pub payment_option: String,
    /// Present when the payer wants a recurring plan instead of one charge
    pub frequency: Option<String>,
    pub shares: Option<i64>,
    pub duration_months: Option<u32>,
    pub account_number: Option<String>,
    pub bank_code: Option<String>,
}

/// Bank details picked for a bank-backed charge
struct BankDetails {
    account_number: String,
    bank_code: String,
}

/// What the caller does next
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Send the payer to the gateway's hosted page
    Redirect {
        authorization_url: String,
        reference: String,
    },
    /// Paid in full from the wallet balance; settled immediately
    WalletCharged { reference: String },
}

/// Routes a validated payment request down one of the payment paths
///
/// Gateway-backed options defer settlement to the verify/webhook paths;
/// the wallet option settles inline because the money is already held
/// locally.
pub struct PaymentProcessor {
    gateway: Arc<dyn PaymentGateway>,
    user_repo: UserRepository,
    property_repo: PropertyRepository,
    bank_account_repo: BankAccountRepository,
    wallet_service: WalletService,
    payment_repo: PaymentRepository,
    effects: SubjectEffectApplier,
}

impl PaymentProcessor {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        user_repo: UserRepository,
        property_repo: PropertyRepository,
        bank_account_repo: BankAccountRepository,
        wallet_service: WalletService,
        payment_repo: PaymentRepository,
        effects: SubjectEffectApplier,
    ) -> Self {
        Self {
            gateway,
            user_repo,
            property_repo,
            bank_account_repo,
            wallet_service,
            payment_repo,
            effects,
        }
    }

    pub async fn process(&self, request: PaymentRequest) -> Result<ProcessOutcome> {
        let option = PaymentOption::parse(&request.payment_option)?;
        let frequency = Self::validate(&request, option)?;

        let user = self
            .user_repo
            .find_by_id(&request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", request.user_id)))?;

        // The subject must exist before any money moves toward it
        self.property_repo
            .find_by_id(&request.property_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Property '{}' not found", request.property_id))
            })?;

        match option {
            PaymentOption::Card => {
                self.initialize_gateway_charge(&request, option, frequency, &user.email)
                    .await
            }
            PaymentOption::Bank | PaymentOption::Transfer => {
                let details = self.pick_bank_details(&request).await?;
                // Confirms the account exists before sending the payer off
                self.gateway
                    .resolve_bank_account(&details.account_number, &details.bank_code)
                    .await?;
                self.initialize_gateway_charge(&request, option, None, &user.email)
                    .await
            }
            PaymentOption::Wallet => self.charge_wallet(&request, &user.email).await,
        }
    }

    /// Cross-field validation ahead of any remote call
    fn validate(
        request: &PaymentRequest,
        option: PaymentOption,
    ) -> Result<Option<BillingFrequency>> {
        validate_positive(request.amount, "Payment amount")?;

        if request.category == InvestmentCategory::Shares && request.shares.is_none() {
            return Err(AppError::validation(
                "Share payments must carry a share count",
            ));
        }

        if request.category == InvestmentCategory::Rent && request.duration_months.is_none() {
            return Err(AppError::validation(
                "Rent payments must carry a duration in months",
            ));
        }

        let frequency = match request.frequency.as_deref() {
            Some(raw) => Some(BillingFrequency::parse(raw)?),
            None => None,
        };

        if frequency.is_some() && option != PaymentOption::Card {
            return Err(AppError::validation(
                "Only card payments support installment plans",
            ));
        }

        Ok(frequency)
    }

    async fn initialize_gateway_charge(
        &self,
        request: &PaymentRequest,
        option: PaymentOption,
        frequency: Option<BillingFrequency>,
        email: &str,
    ) -> Result<ProcessOutcome> {
        let metadata = match frequency {
            Some(frequency) => PaymentMetadata::Installment {
                user_id: request.user_id.clone(),
                property_id: request.property_id.clone(),
                category: request.category,
                frequency,
                duration_months: request.duration_months,
            },
            None => PaymentMetadata::OneTime {
                user_id: request.user_id.clone(),
                property_id: request.property_id.clone(),
                category: request.category,
                shares: request.shares,
                duration_months: request.duration_months,
            },
        };

        let session = self
            .gateway
            .initialize_charge(InitializeChargeRequest {
                email: email.to_string(),
                amount: request.amount,
                user_id: request.user_id.clone(),
                reference: None,
                channels: option.channels(),
                metadata: metadata.to_value()?,
            })
            .await?;

        info!(
            reference = session.reference.as_str(),
            user_id = request.user_id.as_str(),
            "Gateway charge initialized"
        );

        Ok(ProcessOutcome::Redirect {
            authorization_url: session.authorization_url,
            reference: session.reference,
        })
    }

    /// Bank details from the request, falling back to the default account
    async fn pick_bank_details(&self, request: &PaymentRequest) -> Result<BankDetails> {
        if let (Some(account_number), Some(bank_code)) =
            (request.account_number.clone(), request.bank_code.clone())
        {
            return Ok(BankDetails {
                account_number,
                bank_code,
            });
        }

        let account = self
            .bank_account_repo
            .find_default_for_user(&request.user_id)
            .await?
            .ok_or_else(|| {
                AppError::MissingBankDetails(format!(
                    "User '{}' has no default bank account",
                    request.user_id
                ))
            })?;

        Ok(BankDetails {
            account_number: account.account_number,
            bank_code: account.bank_code,
        })
    }

    /// Debit the wallet and settle in one transaction
    async fn charge_wallet(&self, request: &PaymentRequest, email: &str) -> Result<ProcessOutcome> {
        let amount_minor = to_minor_units(request.amount)?;
        let reference = format!(
            "wallet_{}_{}",
            Utc::now().timestamp_millis(),
            request.user_id
        );

        let now = Utc::now();
        let metadata = PaymentMetadata::OneTime {
            user_id: request.user_id.clone(),
            property_id: request.property_id.clone(),
            category: request.category,
            shares: request.shares,
            duration_months: request.duration_months,
        };

        let payment = Payment::new(
            request.user_id.clone(),
            request.property_id.clone(),
            request.category,
            request.shares,
            request.amount,
            reference.clone(),
            email.to_string(),
            Some(now),
            None,
            Some(metadata.to_value()?),
        )?;

        let mut tx = self.payment_repo.pool().begin().await?;

        self.wallet_service
            .debit_with_tx(
                &mut tx,
                &request.user_id,
                amount_minor,
                "Property payment",
                Some(&reference),
            )
            .await?;

        self.payment_repo.create_with_tx(&mut tx, &payment).await?;

        self.effects
            .apply_with_tx(
                &mut tx,
                &SubjectEffect {
                    user_id: request.user_id.clone(),
                    property_id: request.property_id.clone(),
                    category: request.category,
                    shares: request.shares,
                    amount_minor,
                    duration_months: request.duration_months,
                    at: now,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            reference = reference.as_str(),
            user_id = request.user_id.as_str(),
            "Wallet payment settled"
        );

        Ok(ProcessOutcome::WalletCharged { reference })
    }
}
