//! Wallet balance guard.
//!
//! The ledger service checks the row-locked balance through
//! `Wallet::ensure_can_debit` before writing anything; a shortfall fails
//! with both figures and leaves the wallet untouched.

use estatepay::core::AppError;
use estatepay::modules::wallets::models::Wallet;

fn wallet_with_balance(balance_minor: i64) -> Wallet {
    let mut wallet = Wallet::new("user-1".to_string());
    wallet.balance_minor = balance_minor;
    wallet
}

#[test]
fn debit_beyond_balance_is_rejected_with_both_figures() {
    // 500 naira held, 1500 naira requested
    let wallet = wallet_with_balance(50_000);

    let err = wallet.ensure_can_debit(150_000).unwrap_err();
    match err {
        AppError::InsufficientBalance {
            requested,
            available,
        } => {
            assert_eq!(requested, 150_000);
            assert_eq!(available, 50_000);
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // The guard mutates nothing
    assert_eq!(wallet.balance_minor, 50_000);
}

#[test]
fn debit_up_to_the_exact_balance_is_allowed() {
    let wallet = wallet_with_balance(50_000);

    assert!(wallet.ensure_can_debit(50_000).is_ok());
    assert!(wallet.ensure_can_debit(1).is_ok());
}

#[test]
fn empty_wallet_covers_nothing() {
    let wallet = Wallet::new("user-1".to_string());

    assert!(wallet.ensure_can_debit(0).is_ok());
    assert!(matches!(
        wallet.ensure_can_debit(1),
        Err(AppError::InsufficientBalance { .. })
    ));
}
