pub mod wallet;
pub mod wallet_transaction;

pub use wallet::Wallet;
pub use wallet_transaction::{TransactionDirection, WalletTransaction};
