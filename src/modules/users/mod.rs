pub mod models;
pub mod repositories;

pub use models::{BankAccount, User};
pub use repositories::{BankAccountRepository, UserRepository};
