pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{TransactionDirection, Wallet, WalletTransaction};
pub use repositories::WalletRepository;
pub use services::{CreditOutcome, WalletService};
