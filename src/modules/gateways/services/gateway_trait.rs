use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Result;
use crate::modules::payments::models::BillingFrequency;

/// Remote payment processor capability
///
/// All operations may fail with `GatewayUnavailable` (network/5xx, retried
/// with bounded backoff by the client) or `GatewayRejected` (4xx/business
/// validation, surfaced to the caller). Amounts cross this boundary in major
/// units and are converted to minor units at the wire.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a redirect-based charge; the user completes it off-site and the
    /// result arrives later through the verify callback or a webhook
    async fn initialize_charge(&self, request: InitializeChargeRequest) -> Result<ChargeSession>;

    /// Fetch the authoritative state of a charge by reference
    async fn verify_charge(&self, reference: &str) -> Result<ChargeVerification>;

    /// Create a recurring-billing plan; reuse by name is the caller's job
    async fn create_plan(
        &self,
        name: &str,
        amount: Decimal,
        interval: BillingFrequency,
    ) -> Result<String>;

    /// Subscribe a customer's stored authorization to a plan
    async fn create_subscription(
        &self,
        customer_code: &str,
        plan_code: &str,
        authorization_code: &str,
    ) -> Result<String>;

    /// Resolve an account number + bank code to the holder's name
    async fn resolve_bank_account(&self, account_number: &str, bank_code: &str) -> Result<String>;

    /// Off-session charge against a previously issued authorization token
    async fn charge_authorization(
        &self,
        email: &str,
        amount: Decimal,
        authorization_code: &str,
        metadata: Value,
    ) -> Result<ChargeVerification>;

    /// Register a payout recipient
    async fn create_transfer_recipient(
        &self,
        name: &str,
        account_number: &str,
        bank_code: &str,
    ) -> Result<String>;

    /// Initiate an outbound disbursement
    async fn initiate_transfer(
        &self,
        recipient_code: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<String>;

    /// Check a webhook signature against the HMAC of the raw request body.
    /// Must be called before trusting any field of the payload.
    fn verify_webhook_signature(&self, signature: &str, raw_body: &[u8]) -> bool;
}

/// Charge initiation request
#[derive(Debug, Clone, Serialize)]
pub struct InitializeChargeRequest {
    /// Payer email (the gateway's customer identity)
    pub email: String,

    /// Amount in major units
    pub amount: Decimal,

    /// Paying user, used when generating a reference
    pub user_id: String,

    /// Caller-supplied reference; generated when absent
    pub reference: Option<String>,

    /// Restrict the hosted page to these channels (e.g. ["card"])
    pub channels: Option<Vec<String>>,

    /// Opaque metadata echoed back in verification and webhook payloads
    pub metadata: Value,
}

/// Redirect session returned by charge initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeSession {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

/// Remote charge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
}

impl ChargeStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "abandoned" => Self::Abandoned,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Pending => "pending",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Customer identity attached to a charge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub email: String,
    pub customer_code: Option<String>,
}

/// Reusable tokenized authorization issued after a successful card charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationInfo {
    pub authorization_code: String,
    pub card_type: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub bank: Option<String>,
    #[serde(default)]
    pub reusable: bool,
    pub channel: Option<String>,
}

/// Full detail of a charge as reported by the gateway
#[derive(Debug, Clone)]
pub struct ChargeVerification {
    pub status: ChargeStatus,
    pub reference: String,
    /// Amount in minor units, as the gateway transmits it
    pub amount_minor: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub customer: CustomerInfo,
    pub authorization: Option<AuthorizationInfo>,
    pub metadata: Value,
    /// The untouched gateway payload, returned alongside settlement results
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct ChargeData {
    status: String,
    reference: String,
    amount: i64,
    paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    customer: CustomerInfo,
    authorization: Option<AuthorizationInfo>,
    #[serde(default)]
    metadata: Value,
}

impl ChargeVerification {
    /// Build from the `data` object of a verify response or webhook event
    pub fn from_gateway_data(data: Value) -> Result<Self> {
        let parsed: ChargeData = serde_json::from_value(data.clone())?;

        Ok(Self {
            status: ChargeStatus::parse(&parsed.status),
            reference: parsed.reference,
            amount_minor: parsed.amount,
            paid_at: parsed.paid_at,
            customer: parsed.customer,
            authorization: parsed.authorization,
            metadata: parsed.metadata,
            raw: data,
        })
    }
}
