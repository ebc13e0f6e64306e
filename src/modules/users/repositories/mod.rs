pub mod bank_account_repository;
pub mod user_repository;

pub use bank_account_repository::BankAccountRepository;
pub use user_repository::UserRepository;
