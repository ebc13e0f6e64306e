use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::super::models::{
    BillingFrequency, Installment, InvestmentCategory, Payment, PaymentMetadata,
    StoredPaymentMethod,
};
use super::super::repositories::{InstallmentRepository, PaymentRepository, StoredMethodRepository};
use super::subject_effects::{SubjectEffect, SubjectEffectApplier};
use crate::core::currency::to_major_units;
use crate::core::{AppError, Result};
use crate::modules::gateways::{ChargeVerification, PaymentGateway};
use crate::modules::users::repositories::UserRepository;
use crate::modules::wallets::services::{CreditOutcome, WalletService};

/// Outcome of settling a confirmed charge
#[derive(Debug)]
pub enum SettlementOutcome {
    /// Domain writes were applied for this reference
    Settled { reference: String, raw: Value },
    /// This reference was settled before; no writes performed
    AlreadyProcessed { reference: String },
}

/// Outcome of a webhook delivery
#[derive(Debug)]
pub enum WebhookOutcome {
    Processed(SettlementOutcome),
    /// Event type this system does not act on
    Ignored { event: String },
}

/// Resolve a failed reference-keyed insert after its transaction rolled back
///
/// Every settlement insert is keyed by the charge reference through a UNIQUE
/// index; a duplicate-key failure means a concurrent delivery of the same
/// reference settled first and maps to `AlreadyProcessed`. Any other failure
/// propagates.
pub fn duplicate_delivery_outcome(error: AppError, reference: String) -> Result<SettlementOutcome> {
    if error.is_unique_violation() {
        info!(reference = reference.as_str(), "Settlement lost the race, skipping");
        Ok(SettlementOutcome::AlreadyProcessed { reference })
    } else {
        Err(error)
    }
}

/// Whether a wallet-funding credit warrants the follow-up writes
///
/// A credit that reports `AlreadyProcessed` settled this reference before;
/// the current delivery must write nothing further.
pub fn funding_applied(outcome: &CreditOutcome) -> bool {
    matches!(outcome, CreditOutcome::Applied(_))
}

/// Settlement engine
///
/// Both confirmation paths converge here: client-driven verification and
/// gateway webhooks each produce a `ChargeVerification` and hand it to
/// `settle`. All domain writes for one charge happen in a single database
/// transaction, and every insert is keyed by the charge reference, so the
/// two paths racing each other resolves to exactly one settlement.
pub struct SettlementService {
    gateway: Arc<dyn PaymentGateway>,
    payment_repo: PaymentRepository,
    installment_repo: InstallmentRepository,
    stored_method_repo: StoredMethodRepository,
    user_repo: UserRepository,
    wallet_service: WalletService,
    effects: SubjectEffectApplier,
}

impl SettlementService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payment_repo: PaymentRepository,
        installment_repo: InstallmentRepository,
        stored_method_repo: StoredMethodRepository,
        user_repo: UserRepository,
        wallet_service: WalletService,
        effects: SubjectEffectApplier,
    ) -> Self {
        Self {
            gateway,
            payment_repo,
            installment_repo,
            stored_method_repo,
            user_repo,
            wallet_service,
            effects,
        }
    }

    /// Resolve the paying user: the local account matching the payer email,
    /// falling back to the user id carried in the charge metadata
    async fn resolve_payer(
        &self,
        verification: &ChargeVerification,
        metadata_user_id: &str,
    ) -> Result<String> {
        if !verification.customer.email.is_empty() {
            if let Some(user) = self
                .user_repo
                .find_by_email(&verification.customer.email)
                .await?
            {
                return Ok(user.id);
            }
        }
        Ok(metadata_user_id.to_string())
    }

    /// Client-driven confirmation: fetch the charge state and settle it
    pub async fn verify(&self, reference: &str) -> Result<SettlementOutcome> {
        let verification = self.gateway.verify_charge(reference).await?;

        if !verification.status.is_success() {
            return Err(AppError::gateway_rejected(format!(
                "Payment '{}' is not successful (status: {})",
                reference,
                verification.status.as_str()
            )));
        }

        self.settle(verification).await
    }

    /// Gateway-driven confirmation
    ///
    /// The signature is checked against the raw body before anything is
    /// parsed; a payload that fails the check is rejected outright. Events
    /// other than `charge.success` are acknowledged and ignored.
    pub async fn handle_webhook(&self, signature: &str, raw_body: &[u8]) -> Result<WebhookOutcome> {
        if !self.gateway.verify_webhook_signature(signature, raw_body) {
            warn!("Webhook rejected: signature mismatch");
            return Err(AppError::InvalidSignature);
        }

        let envelope: Value = serde_json::from_slice(raw_body)?;
        let event = envelope["event"].as_str().unwrap_or_default().to_string();

        if event != "charge.success" {
            info!(event = event.as_str(), "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored { event });
        }

        let verification = ChargeVerification::from_gateway_data(envelope["data"].clone())?;
        if !verification.status.is_success() {
            return Ok(WebhookOutcome::Ignored { event });
        }

        let outcome = self.settle(verification).await?;
        Ok(WebhookOutcome::Processed(outcome))
    }

    /// Apply the domain meaning of a confirmed charge, exactly once
    pub async fn settle(&self, verification: ChargeVerification) -> Result<SettlementOutcome> {
        let metadata = PaymentMetadata::from_value(&verification.metadata)?;

        match metadata {
            PaymentMetadata::OneTime {
                user_id,
                property_id,
                category,
                shares,
                duration_months,
            } => {
                self.settle_one_time(
                    &verification,
                    user_id,
                    property_id,
                    category,
                    shares,
                    duration_months,
                )
                .await
            }
            PaymentMetadata::Installment {
                user_id,
                property_id,
                category,
                frequency,
                duration_months,
            } => {
                self.settle_installment(
                    &verification,
                    user_id,
                    property_id,
                    category,
                    frequency,
                    duration_months,
                )
                .await
            }
            PaymentMetadata::InstallmentCharge {
                installment_reference,
            } => {
                self.settle_installment_charge(&verification, &installment_reference)
                    .await
            }
            PaymentMetadata::WalletFunding { user_id } => {
                self.settle_wallet_funding(&verification, &user_id).await
            }
        }
    }

    async fn settle_one_time(
        &self,
        verification: &ChargeVerification,
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        shares: Option<i64>,
        duration_months: Option<u32>,
    ) -> Result<SettlementOutcome> {
        let reference = verification.reference.clone();

        if self.payment_repo.find_by_reference(&reference).await?.is_some() {
            info!(reference = reference.as_str(), "Payment already settled, skipping");
            return Ok(SettlementOutcome::AlreadyProcessed { reference });
        }

        let user_id = self.resolve_payer(verification, &user_id).await?;
        let paid_at = verification.paid_at.unwrap_or_else(Utc::now);
        let payment = Payment::new(
            user_id.clone(),
            property_id.clone(),
            category,
            shares,
            to_major_units(verification.amount_minor)?,
            reference.clone(),
            verification.customer.email.clone(),
            Some(paid_at),
            verification.customer.customer_code.clone(),
            Some(verification.metadata.clone()),
        )?;

        let mut tx = self.payment_repo.pool().begin().await?;

        if let Err(e) = self.payment_repo.create_with_tx(&mut tx, &payment).await {
            tx.rollback().await?;
            return duplicate_delivery_outcome(e, reference);
        }

        self.effects
            .apply_with_tx(
                &mut tx,
                &SubjectEffect {
                    user_id: user_id.clone(),
                    property_id,
                    category,
                    shares,
                    amount_minor: verification.amount_minor,
                    duration_months,
                    at: paid_at,
                },
            )
            .await?;

        self.capture_reusable_card(&mut tx, &user_id, verification)
            .await?;
        self.capture_customer_code(&mut tx, &user_id, verification)
            .await?;

        tx.commit().await?;

        info!(
            reference = reference.as_str(),
            category = category.as_str(),
            "One-time payment settled"
        );

        Ok(SettlementOutcome::Settled {
            reference,
            raw: verification.raw.clone(),
        })
    }

    async fn settle_installment(
        &self,
        verification: &ChargeVerification,
        user_id: String,
        property_id: String,
        category: InvestmentCategory,
        frequency: BillingFrequency,
        duration_months: Option<u32>,
    ) -> Result<SettlementOutcome> {
        let reference = verification.reference.clone();

        if self
            .installment_repo
            .find_by_reference(&reference)
            .await?
            .is_some()
        {
            info!(reference = reference.as_str(), "Installment already settled, skipping");
            return Ok(SettlementOutcome::AlreadyProcessed { reference });
        }

        let user_id = self.resolve_payer(verification, &user_id).await?;
        let amount = to_major_units(verification.amount_minor)?;
        let customer_code = verification
            .customer
            .customer_code
            .clone()
            .ok_or_else(|| AppError::validation("Gateway response is missing a customer code"))?;
        let authorization = verification.authorization.as_ref().ok_or_else(|| {
            AppError::validation("Gateway response is missing a card authorization")
        })?;

        // Remote plan/subscription setup happens before the local
        // transaction opens; both calls are safe to repeat if the local
        // writes later lose an idempotency race.
        let plan_code = match self
            .installment_repo
            .find_plan_code(&user_id, &property_id, category.as_str())
            .await?
        {
            Some(code) => code,
            None => {
                let plan_name = format!("{}-{}-{}", property_id, category.as_str(), user_id);
                self.gateway
                    .create_plan(&plan_name, amount, frequency)
                    .await?
            }
        };

        let subscription_code = self
            .gateway
            .create_subscription(&customer_code, &plan_code, &authorization.authorization_code)
            .await?;

        let paid_at = verification.paid_at.unwrap_or_else(Utc::now);
        let installment = Installment::new(
            user_id.clone(),
            property_id.clone(),
            category,
            frequency,
            amount,
            reference.clone(),
            verification.customer.email.clone(),
            plan_code,
            Some(subscription_code),
            Some(authorization.authorization_code.clone()),
            Some(customer_code),
            duration_months.map(|months| months as i32),
            paid_at.date_naive(),
        )?;

        let mut tx = self.installment_repo.pool().begin().await?;

        if let Err(e) = self
            .installment_repo
            .create_with_tx(&mut tx, &installment)
            .await
        {
            tx.rollback().await?;
            return duplicate_delivery_outcome(e, reference);
        }

        // The first charge of the plan carries the property effect; later
        // recurring charges only record payments and advance the due date.
        self.effects
            .apply_with_tx(
                &mut tx,
                &SubjectEffect {
                    user_id: user_id.clone(),
                    property_id,
                    category,
                    shares: None,
                    amount_minor: verification.amount_minor,
                    duration_months,
                    at: paid_at,
                },
            )
            .await?;

        self.capture_reusable_card(&mut tx, &user_id, verification)
            .await?;
        self.capture_customer_code(&mut tx, &user_id, verification)
            .await?;

        tx.commit().await?;

        info!(
            reference = reference.as_str(),
            frequency = frequency.as_str(),
            "Installment plan settled"
        );

        Ok(SettlementOutcome::Settled {
            reference,
            raw: verification.raw.clone(),
        })
    }

    async fn settle_installment_charge(
        &self,
        verification: &ChargeVerification,
        installment_reference: &str,
    ) -> Result<SettlementOutcome> {
        let reference = verification.reference.clone();

        let installment = self
            .installment_repo
            .find_by_reference(installment_reference)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Installment '{}' not found",
                    installment_reference
                ))
            })?;

        if self.payment_repo.find_by_reference(&reference).await?.is_some() {
            info!(reference = reference.as_str(), "Recurring charge already settled, skipping");
            return Ok(SettlementOutcome::AlreadyProcessed { reference });
        }

        let paid_at = verification.paid_at.unwrap_or_else(Utc::now);
        let payment = Payment::new(
            installment.user_id.clone(),
            installment.property_id.clone(),
            installment.category,
            None,
            to_major_units(verification.amount_minor)?,
            reference.clone(),
            installment.email.clone(),
            Some(paid_at),
            installment.customer_code.clone(),
            Some(verification.metadata.clone()),
        )?;

        let next_due = installment
            .frequency
            .next_due(installment.next_payment_date)?;

        let mut tx = self.payment_repo.pool().begin().await?;

        if let Err(e) = self.payment_repo.create_with_tx(&mut tx, &payment).await {
            tx.rollback().await?;
            return duplicate_delivery_outcome(e, reference);
        }

        // A plan that has run its agreed term closes instead of rolling on
        let completed = installment.is_complete_after(next_due);
        if completed {
            self.installment_repo
                .complete_with_tx(&mut tx, &installment.id)
                .await?;
        } else {
            self.installment_repo
                .advance_next_payment_date_with_tx(&mut tx, &installment.id, next_due)
                .await?;
        }

        tx.commit().await?;

        info!(
            reference = reference.as_str(),
            installment_reference = installment_reference,
            next_due = %next_due,
            completed = completed,
            "Recurring charge settled"
        );

        Ok(SettlementOutcome::Settled {
            reference,
            raw: verification.raw.clone(),
        })
    }

    async fn settle_wallet_funding(
        &self,
        verification: &ChargeVerification,
        user_id: &str,
    ) -> Result<SettlementOutcome> {
        let reference = verification.reference.clone();

        let mut tx = self.payment_repo.pool().begin().await?;

        let outcome = self
            .wallet_service
            .credit_with_tx(
                &mut tx,
                user_id,
                verification.amount_minor,
                "Wallet funding",
                Some(&reference),
            )
            .await?;

        // A duplicate delivery stops at the credit; nothing else is written
        if !funding_applied(&outcome) {
            tx.rollback().await?;
            return Ok(SettlementOutcome::AlreadyProcessed { reference });
        }

        self.capture_customer_code(&mut tx, user_id, verification)
            .await?;

        tx.commit().await?;

        info!(reference = reference.as_str(), user_id = user_id, "Wallet funding settled");
        Ok(SettlementOutcome::Settled {
            reference,
            raw: verification.raw.clone(),
        })
    }

    /// Persist a reusable card authorization, tolerating duplicates
    async fn capture_reusable_card(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
        user_id: &str,
        verification: &ChargeVerification,
    ) -> Result<()> {
        let Some(auth) = verification.authorization.as_ref() else {
            return Ok(());
        };
        if !auth.reusable {
            return Ok(());
        }

        if self
            .stored_method_repo
            .find_by_user_and_code(user_id, &auth.authorization_code)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let method = StoredPaymentMethod::from_authorization(user_id, auth);
        match self.stored_method_repo.create_with_tx(tx, &method).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unique_violation() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Persist the gateway customer code on the wallet the first time
    async fn capture_customer_code(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
        user_id: &str,
        verification: &ChargeVerification,
    ) -> Result<()> {
        if let Some(code) = verification.customer.customer_code.as_deref() {
            self.wallet_service
                .remember_customer_code(tx, user_id, code)
                .await?;
        }
        Ok(())
    }
}
