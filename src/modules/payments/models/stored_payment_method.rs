use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::modules::gateways::AuthorizationInfo;

/// Reusable card authorization captured from a successful charge
///
/// Uniqueness is (user_id, authorization_code); re-seeing the same card on a
/// later charge is a no-op at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredPaymentMethod {
    pub id: String,
    pub user_id: String,
    pub authorization_code: String,
    pub card_type: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub bank: Option<String>,
    pub reusable: bool,
    pub is_default: bool,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredPaymentMethod {
    pub fn from_authorization(user_id: &str, auth: &AuthorizationInfo) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            authorization_code: auth.authorization_code.clone(),
            card_type: auth.card_type.clone(),
            last4: auth.last4.clone(),
            exp_month: auth.exp_month.clone(),
            exp_year: auth.exp_year.clone(),
            bank: auth.bank.clone(),
            reusable: auth.reusable,
            is_default: false,
            active: true,
            created_at: Some(Utc::now()),
        }
    }
}
