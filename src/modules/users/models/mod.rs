pub mod user;

pub use user::{BankAccount, User};
