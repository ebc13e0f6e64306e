use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local user account (owned by the accounts subsystem; read-only here)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A user's stored bank account, used as the source of account details for
/// bank and transfer payment paths
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: String,
    pub user_id: String,
    pub account_number: String,
    pub bank_code: String,
    pub account_name: String,
    pub is_default: bool,
    pub created_at: Option<DateTime<Utc>>,
}
