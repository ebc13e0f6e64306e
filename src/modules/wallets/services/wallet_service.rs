use sqlx::{MySql, Transaction};
use tracing::info;

use super::super::models::{TransactionDirection, Wallet, WalletTransaction};
use super::super::repositories::WalletRepository;
use crate::core::currency::format_major;
use crate::core::{AppError, Result};

/// Outcome of a ledger credit
#[derive(Debug)]
pub enum CreditOutcome {
    /// Balance increased and a ledger entry was appended
    Applied(WalletTransaction),
    /// A ledger entry with this reference already exists; no writes performed
    AlreadyProcessed,
}

/// Wallet ledger service
///
/// Owns all balance mutations. Credits are idempotent by external reference;
/// debits lock the wallet row so concurrent debits against one wallet are
/// serialized and can never drive the balance negative.
#[derive(Clone)]
pub struct WalletService {
    wallet_repo: WalletRepository,
}

impl WalletService {
    pub fn new(wallet_repo: WalletRepository) -> Self {
        Self { wallet_repo }
    }

    /// Get the user's wallet, creating it on first touch
    pub async fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        self.wallet_repo.get_or_create(user_id).await
    }

    /// List the ledger for a user's wallet
    pub async fn list_transactions(&self, user_id: &str) -> Result<Vec<WalletTransaction>> {
        let wallet = self.wallet_repo.get_or_create(user_id).await?;
        self.wallet_repo.list_transactions(&wallet.id).await
    }

    /// Credit `amount_minor` to the user's wallet in its own transaction
    pub async fn credit(
        &self,
        user_id: &str,
        amount_minor: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<CreditOutcome> {
        let mut tx = self.wallet_repo.pool().begin().await?;
        let outcome = self
            .credit_with_tx(&mut tx, user_id, amount_minor, reason, reference)
            .await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Credit within a caller-owned transaction
    ///
    /// When `reference` is given and a ledger entry with that reference
    /// already exists — or the insert loses a race on the unique index —
    /// the call performs no writes and reports `AlreadyProcessed` instead of
    /// double-crediting. This is the ledger's core idempotency guarantee.
    pub async fn credit_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
        amount_minor: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<CreditOutcome> {
        if amount_minor <= 0 {
            return Err(AppError::invalid_amount(format!(
                "Credit amount must be positive, got {}",
                amount_minor
            )));
        }

        if let Some(reference) = reference {
            if self
                .wallet_repo
                .find_transaction_by_reference(reference)
                .await?
                .is_some()
            {
                info!(reference = reference, "Credit already processed, skipping");
                return Ok(CreditOutcome::AlreadyProcessed);
            }
        }

        // Ensure the wallet row exists before trying to lock it
        self.wallet_repo.get_or_create(user_id).await?;

        let wallet = self
            .wallet_repo
            .find_by_user_for_update(tx, user_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Wallet for user '{}' missing under lock", user_id))
            })?;

        let entry = WalletTransaction::new(
            wallet.id.clone(),
            user_id.to_string(),
            TransactionDirection::Credit,
            amount_minor,
            reference.map(String::from),
            Some(reason.to_string()),
        )?;

        if let Err(e) = self.wallet_repo.insert_transaction_with_tx(tx, &entry).await {
            if e.is_unique_violation() {
                // Concurrent delivery of the same reference won the race
                info!(reference = ?reference, "Credit raced a duplicate delivery, skipping");
                return Ok(CreditOutcome::AlreadyProcessed);
            }
            return Err(e);
        }

        self.wallet_repo
            .update_balance_with_tx(tx, &wallet.id, wallet.balance_minor + amount_minor)
            .await?;

        info!(
            user_id = user_id,
            amount = format_major(amount_minor).as_str(),
            reference = ?reference,
            "Wallet credited"
        );

        Ok(CreditOutcome::Applied(entry))
    }

    /// Debit `amount_minor` from the user's wallet in its own transaction
    pub async fn debit(
        &self,
        user_id: &str,
        amount_minor: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<WalletTransaction> {
        let mut tx = self.wallet_repo.pool().begin().await?;
        let entry = self
            .debit_with_tx(&mut tx, user_id, amount_minor, reason, reference)
            .await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Debit within a caller-owned transaction
    ///
    /// Re-reads the wallet under a row lock, fails with `InsufficientBalance`
    /// when the locked balance cannot cover the amount, otherwise decrements
    /// the balance and appends a ledger entry. The row lock serializes
    /// concurrent debits; a stale pre-read balance can never be spent twice.
    pub async fn debit_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
        amount_minor: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<WalletTransaction> {
        if amount_minor <= 0 {
            return Err(AppError::invalid_amount(format!(
                "Debit amount must be positive, got {}",
                amount_minor
            )));
        }

        // Ensure the wallet row exists before trying to lock it
        self.wallet_repo.get_or_create(user_id).await?;

        let wallet = self
            .wallet_repo
            .find_by_user_for_update(tx, user_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Wallet for user '{}' missing under lock", user_id))
            })?;

        wallet.ensure_can_debit(amount_minor)?;

        let entry = WalletTransaction::new(
            wallet.id.clone(),
            user_id.to_string(),
            TransactionDirection::Debit,
            amount_minor,
            reference.map(String::from),
            Some(reason.to_string()),
        )?;

        self.wallet_repo.insert_transaction_with_tx(tx, &entry).await?;
        self.wallet_repo
            .update_balance_with_tx(tx, &wallet.id, wallet.balance_minor - amount_minor)
            .await?;

        info!(
            user_id = user_id,
            amount = format_major(amount_minor).as_str(),
            remaining = format_major(wallet.balance_minor - amount_minor).as_str(),
            "Wallet debited"
        );

        Ok(entry)
    }

    /// Record the gateway customer code the first time it is seen
    pub async fn remember_customer_code(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
        customer_code: &str,
    ) -> Result<()> {
        let wallet = self.wallet_repo.get_or_create(user_id).await?;
        self.wallet_repo
            .set_customer_code_with_tx(tx, &wallet.id, customer_code)
            .await
    }
}
