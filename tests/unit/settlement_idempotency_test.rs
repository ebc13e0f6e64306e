//! Idempotency outcome mapping of the settlement engine.
//!
//! Settlement inserts are keyed by the charge reference through UNIQUE
//! indexes; a duplicate-key failure resolves to the already-processed
//! outcome rather than an error, and any other failure propagates. A
//! wallet-funding credit that reports already-processed must stop the
//! settlement before any follow-up write.

use std::error::Error as StdError;

use sqlx::error::{DatabaseError, ErrorKind};

use estatepay::core::AppError;
use estatepay::modules::payments::services::{
    duplicate_delivery_outcome, funding_applied, SettlementOutcome,
};
use estatepay::modules::wallets::models::{TransactionDirection, WalletTransaction};
use estatepay::modules::wallets::services::CreditOutcome;

/// Stand-in for the driver's duplicate-key error
#[derive(Debug)]
struct DuplicateKey;

impl std::fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duplicate entry 'trx_x' for key 'uq_payments_reference'")
    }
}

impl StdError for DuplicateKey {}

impl DatabaseError for DuplicateKey {
    fn message(&self) -> &str {
        "Duplicate entry 'trx_x' for key 'uq_payments_reference'"
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }
}

fn duplicate_key_error() -> AppError {
    AppError::from(sqlx::Error::Database(Box::new(DuplicateKey)))
}

#[test]
fn duplicate_key_resolves_to_already_processed() {
    let err = duplicate_key_error();
    assert!(err.is_unique_violation());

    let outcome = duplicate_delivery_outcome(err, "trx_x".to_string()).unwrap();
    match outcome {
        SettlementOutcome::AlreadyProcessed { reference } => assert_eq!(reference, "trx_x"),
        other => panic!("expected AlreadyProcessed, got {other:?}"),
    }
}

#[test]
fn other_failures_propagate_unchanged() {
    let err = AppError::validation("bad metadata");

    let result = duplicate_delivery_outcome(err, "trx_x".to_string());
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn non_database_errors_are_not_unique_violations() {
    assert!(!AppError::validation("bad metadata").is_unique_violation());
    assert!(!AppError::from(sqlx::Error::RowNotFound).is_unique_violation());
}

#[test]
fn applied_credit_allows_followup_writes() {
    let entry = WalletTransaction::new(
        "wallet-1".to_string(),
        "user-1".to_string(),
        TransactionDirection::Credit,
        100_000,
        Some("trx_fund_1".to_string()),
        Some("Wallet funding".to_string()),
    )
    .unwrap();

    assert!(funding_applied(&CreditOutcome::Applied(entry)));
}

#[test]
fn duplicate_credit_blocks_followup_writes() {
    assert!(!funding_applied(&CreditOutcome::AlreadyProcessed));
}
