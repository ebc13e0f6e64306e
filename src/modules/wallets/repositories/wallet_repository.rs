use sqlx::{MySql, MySqlPool, Transaction};

use super::super::models::{Wallet, WalletTransaction};
use crate::core::{AppError, Result};

const WALLET_COLUMNS: &str =
    "id, user_id, balance_minor, customer_code, active, created_at, updated_at";

/// Persistence for wallets and their append-only ledger
///
/// Idempotency and balance consistency are enforced at this layer: the
/// ledger reference carries a UNIQUE index, wallets are unique per user, and
/// balance updates go through locked rows inside caller-owned transactions.
#[derive(Clone)]
pub struct WalletRepository {
    pool: MySqlPool,
}

impl WalletRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Find a user's wallet
    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<Wallet>> {
        let query = format!("SELECT {} FROM wallets WHERE user_id = ?", WALLET_COLUMNS);

        let wallet = sqlx::query_as::<_, Wallet>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(wallet)
    }

    /// Find a user's wallet within a transaction, locking the row
    pub async fn find_by_user_for_update(
        &self,
        tx: &mut Transaction<'_, MySql>,
        user_id: &str,
    ) -> Result<Option<Wallet>> {
        let query = format!(
            "SELECT {} FROM wallets WHERE user_id = ? FOR UPDATE",
            WALLET_COLUMNS
        );

        let wallet = sqlx::query_as::<_, Wallet>(&query)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(wallet)
    }

    /// Insert a fresh wallet
    ///
    /// The UNIQUE constraint on `user_id` makes a concurrent first-touch
    /// fail here with a unique violation; `get_or_create` resolves that by
    /// re-fetching.
    pub async fn insert(&self, wallet: &Wallet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, balance_minor, customer_code, active)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&wallet.id)
        .bind(&wallet.user_id)
        .bind(wallet.balance_minor)
        .bind(&wallet.customer_code)
        .bind(wallet.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the wallet for `user_id`, creating it atomically on first touch
    pub async fn get_or_create(&self, user_id: &str) -> Result<Wallet> {
        if let Some(wallet) = self.find_by_user(user_id).await? {
            return Ok(wallet);
        }

        let wallet = Wallet::new(user_id.to_string());
        match self.insert(&wallet).await {
            Ok(()) => Ok(wallet),
            Err(e) if e.is_unique_violation() => {
                // Lost the create race; the winner's row is what counts
                self.find_by_user(user_id).await?.ok_or_else(|| {
                    AppError::internal(format!("Wallet for user '{}' vanished after race", user_id))
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Write a wallet's new balance within the caller's transaction
    pub async fn update_balance_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        wallet_id: &str,
        balance_minor: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET balance_minor = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(balance_minor)
        .bind(wallet_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Record the gateway customer reference on the wallet
    pub async fn set_customer_code_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        wallet_id: &str,
        customer_code: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET customer_code = ?, updated_at = NOW()
            WHERE id = ? AND customer_code IS NULL
            "#,
        )
        .bind(customer_code)
        .bind(wallet_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Find a ledger entry by its external reference (idempotency lookup)
    pub async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<WalletTransaction>> {
        let entry = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, wallet_id, user_id, direction, amount_minor,
                   reference, reason, created_at
            FROM wallet_transactions
            WHERE reference = ?
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Append a ledger entry within the caller's transaction
    ///
    /// A duplicate non-null reference surfaces as a unique violation, which
    /// the ledger service maps to the already-processed outcome.
    pub async fn insert_transaction_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        entry: &WalletTransaction,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions
                (id, wallet_id, user_id, direction, amount_minor, reference, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.wallet_id)
        .bind(&entry.user_id)
        .bind(entry.direction.as_str())
        .bind(entry.amount_minor)
        .bind(&entry.reference)
        .bind(&entry.reason)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// List a wallet's ledger, newest first
    pub async fn list_transactions(&self, wallet_id: &str) -> Result<Vec<WalletTransaction>> {
        let entries = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, wallet_id, user_id, direction, amount_minor,
                   reference, reason, created_at
            FROM wallet_transactions
            WHERE wallet_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
