use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::time::interval;
use tracing::{error, info, warn};

use super::super::models::{Installment, PaymentMetadata, StoredPaymentMethod};
use super::super::repositories::{InstallmentRepository, StoredMethodRepository};
use super::settlement_service::SettlementService;
use crate::core::Result;
use crate::modules::gateways::PaymentGateway;

const SWEEP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// What the sweep does with one due plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepAction {
    /// Charge the stored credential off-session
    Charge { authorization_code: String },
    /// No chargeable credential; the payer must complete the payment
    Remind,
}

/// Decide between charging and reminding for a due plan
///
/// Only a credential that is on file, active, and marked reusable by the
/// gateway may be charged off-session. A plan whose authorization is absent,
/// not on file, or non-reusable gets a reminder; retrying a non-reusable
/// card would be declined on every sweep.
pub fn sweep_action(
    installment: &Installment,
    stored_method: Option<&StoredPaymentMethod>,
) -> SweepAction {
    let Some(code) = installment.authorization_code.as_deref() else {
        return SweepAction::Remind;
    };

    match stored_method {
        Some(method) if method.reusable && method.active && method.authorization_code == code => {
            SweepAction::Charge {
                authorization_code: code.to_string(),
            }
        }
        _ => SweepAction::Remind,
    }
}

/// Due-payment notification hook
///
/// Called for plans that are due but cannot be charged off-session; the
/// payer has to complete the payment themselves.
pub trait ReminderNotifier: Send + Sync {
    fn remind(&self, installment: &Installment);
}

/// Notifier that only writes a structured log line
pub struct LogReminderNotifier;

impl ReminderNotifier for LogReminderNotifier {
    fn remind(&self, installment: &Installment) {
        info!(
            user_id = installment.user_id.as_str(),
            reference = installment.reference.as_str(),
            due_date = %installment.next_payment_date,
            amount = %installment.amount,
            "Installment payment due, no reusable stored card to charge"
        );
    }
}

/// Daily sweep that raises off-session charges for due installment plans
///
/// The sweep itself writes nothing: each successful charge is handed to the
/// settlement engine, which records the payment and advances the plan's due
/// date under the charge reference's idempotency key. A failed charge leaves
/// the due date untouched and is retried on the next sweep.
pub struct AutoDebitScheduler {
    installment_repo: InstallmentRepository,
    stored_method_repo: StoredMethodRepository,
    gateway: Arc<dyn PaymentGateway>,
    settlement: Arc<SettlementService>,
    notifier: Arc<dyn ReminderNotifier>,
}

impl AutoDebitScheduler {
    pub fn new(
        installment_repo: InstallmentRepository,
        stored_method_repo: StoredMethodRepository,
        gateway: Arc<dyn PaymentGateway>,
        settlement: Arc<SettlementService>,
        notifier: Arc<dyn ReminderNotifier>,
    ) -> Self {
        Self {
            installment_repo,
            stored_method_repo,
            gateway,
            settlement,
            notifier,
        }
    }

    /// Start the daily sweep; spawned as a tokio task at startup
    pub async fn start(self: Arc<Self>) {
        info!("Starting auto-debit scheduler (runs daily)");

        let mut ticker = interval(SWEEP_PERIOD);

        loop {
            ticker.tick().await;

            let today = Utc::now().date_naive();
            if let Err(e) = self.run_once(today).await {
                error!(error = %e, "Auto-debit sweep failed");
            }
        }
    }

    /// One sweep over the plans due on `today`
    ///
    /// Plans whose credential is on file and reusable are charged
    /// off-session; every other plan gets a reminder instead.
    pub async fn run_once(&self, today: NaiveDate) -> Result<()> {
        let due = self.installment_repo.find_due_unpaid(today).await?;
        info!(due_count = due.len(), date = %today, "Sweeping due installments");

        for installment in due {
            if let Err(e) = self.process_due(&installment).await {
                // One bad plan must not stall the rest of the sweep
                error!(
                    reference = installment.reference.as_str(),
                    error = %e,
                    "Installment charge failed"
                );
            }
        }

        Ok(())
    }

    async fn process_due(&self, installment: &Installment) -> Result<()> {
        let stored_method = match installment.authorization_code.as_deref() {
            Some(code) => {
                self.stored_method_repo
                    .find_by_user_and_code(&installment.user_id, code)
                    .await?
            }
            None => None,
        };

        match sweep_action(installment, stored_method.as_ref()) {
            SweepAction::Charge { authorization_code } => {
                self.charge_installment(installment, &authorization_code)
                    .await
            }
            SweepAction::Remind => {
                self.notifier.remind(installment);
                Ok(())
            }
        }
    }

    async fn charge_installment(
        &self,
        installment: &Installment,
        authorization_code: &str,
    ) -> Result<()> {
        let metadata = PaymentMetadata::InstallmentCharge {
            installment_reference: installment.reference.clone(),
        };

        let verification = self
            .gateway
            .charge_authorization(
                &installment.email,
                installment.amount,
                authorization_code,
                metadata.to_value()?,
            )
            .await?;

        if !verification.status.is_success() {
            warn!(
                reference = installment.reference.as_str(),
                status = verification.status.as_str(),
                "Off-session charge declined"
            );
            return Ok(());
        }

        self.settlement.settle(verification).await?;
        Ok(())
    }
}
