use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha512;
use uuid::Uuid;

use super::gateway_trait::{
    ChargeSession, ChargeVerification, InitializeChargeRequest, PaymentGateway,
};
use crate::config::GatewayConfig;
use crate::core::{currency, AppError, Result};
use crate::modules::payments::models::BillingFrequency;

type HmacSha512 = Hmac<Sha512>;

/// Paystack gateway client
///
/// Thin adapter over the hosted Paystack HTTP API. Transient failures
/// (timeouts, connection errors, 5xx) are retried a bounded number of times
/// by the middleware before surfacing as `GatewayUnavailable`; 4xx and
/// `status: false` envelopes surface as `GatewayRejected`.
pub struct PaystackClient {
    client: ClientWithMiddleware,
    config: GatewayConfig,
}

/// Generate a globally unique charge reference for a user.
///
/// Composed of the user id, a millisecond timestamp, and a random component
/// so references never collide across retries or concurrent requests.
pub fn generate_reference(user_id: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "trx_{}_{}_{}",
        user_id,
        Utc::now().timestamp_millis(),
        &random[..8]
    )
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

impl PaystackClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::unwrap_envelope(response).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::gateway_unavailable(format!("Failed to read Paystack response: {}", e))
        })?;

        if status.is_server_error() {
            return Err(AppError::gateway_unavailable(format!(
                "Paystack HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        if !status.is_success() {
            return Err(AppError::gateway_rejected(format!(
                "Paystack HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let envelope: PaystackEnvelope = serde_json::from_str(&body)?;
        if !envelope.status {
            return Err(AppError::gateway_rejected(envelope.message));
        }

        Ok(envelope.data)
    }

    fn require_str(data: &Value, field: &str) -> Result<String> {
        data.get(field)
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                AppError::internal(format!("Paystack response missing '{}' field", field))
            })
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize_charge(&self, request: InitializeChargeRequest) -> Result<ChargeSession> {
        let amount_minor = currency::to_minor_units(request.amount)?;
        let reference = request
            .reference
            .unwrap_or_else(|| generate_reference(&request.user_id));

        let mut body = json!({
            "email": request.email,
            "amount": amount_minor,
            "reference": reference,
            "metadata": request.metadata,
        });
        if let Some(channels) = &request.channels {
            body["channels"] = json!(channels);
        }

        let data = self.post("/transaction/initialize", body).await?;

        Ok(ChargeSession {
            authorization_url: Self::require_str(&data, "authorization_url")?,
            access_code: data
                .get("access_code")
                .and_then(Value::as_str)
                .map(String::from),
            reference,
        })
    }

    async fn verify_charge(&self, reference: &str) -> Result<ChargeVerification> {
        let data = self
            .get(&format!("/transaction/verify/{}", reference))
            .await?;

        ChargeVerification::from_gateway_data(data)
    }

    async fn create_plan(
        &self,
        name: &str,
        amount: Decimal,
        interval: BillingFrequency,
    ) -> Result<String> {
        let amount_minor = currency::to_minor_units(amount)?;

        let data = self
            .post(
                "/plan",
                json!({
                    "name": name,
                    "amount": amount_minor,
                    "interval": interval.as_str(),
                }),
            )
            .await?;

        Self::require_str(&data, "plan_code")
    }

    async fn create_subscription(
        &self,
        customer_code: &str,
        plan_code: &str,
        authorization_code: &str,
    ) -> Result<String> {
        let data = self
            .post(
                "/subscription",
                json!({
                    "customer": customer_code,
                    "plan": plan_code,
                    "authorization": authorization_code,
                }),
            )
            .await?;

        Self::require_str(&data, "subscription_code")
    }

    async fn resolve_bank_account(&self, account_number: &str, bank_code: &str) -> Result<String> {
        let data = self
            .get(&format!(
                "/bank/resolve?account_number={}&bank_code={}",
                account_number, bank_code
            ))
            .await?;

        Self::require_str(&data, "account_name")
    }

    async fn charge_authorization(
        &self,
        email: &str,
        amount: Decimal,
        authorization_code: &str,
        metadata: Value,
    ) -> Result<ChargeVerification> {
        let amount_minor = currency::to_minor_units(amount)?;

        let data = self
            .post(
                "/transaction/charge_authorization",
                json!({
                    "email": email,
                    "amount": amount_minor,
                    "authorization_code": authorization_code,
                    "metadata": metadata,
                }),
            )
            .await?;

        ChargeVerification::from_gateway_data(data)
    }

    async fn create_transfer_recipient(
        &self,
        name: &str,
        account_number: &str,
        bank_code: &str,
    ) -> Result<String> {
        let data = self
            .post(
                "/transferrecipient",
                json!({
                    "type": "nuban",
                    "name": name,
                    "account_number": account_number,
                    "bank_code": bank_code,
                    "currency": "NGN",
                }),
            )
            .await?;

        Self::require_str(&data, "recipient_code")
    }

    async fn initiate_transfer(
        &self,
        recipient_code: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<String> {
        let amount_minor = currency::to_minor_units(amount)?;

        let data = self
            .post(
                "/transfer",
                json!({
                    "source": "balance",
                    "amount": amount_minor,
                    "recipient": recipient_code,
                    "reason": reason,
                }),
            )
            .await?;

        Self::require_str(&data, "transfer_code")
    }

    /// HMAC-SHA512 of the raw request body keyed by the shared webhook
    /// secret, compared in constant time against the hex signature header
    fn verify_webhook_signature(&self, signature: &str, raw_body: &[u8]) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };

        let Ok(mut mac) = HmacSha512::new_from_slice(self.config.webhook_secret.as_bytes()) else {
            return false;
        };
        mac.update(raw_body);

        mac.verify_slice(&expected).is_ok()
    }
}

fn map_send_error(error: reqwest_middleware::Error) -> AppError {
    match &error {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
            AppError::gateway_unavailable(format!("Paystack request timed out: {}", e))
        }
        reqwest_middleware::Error::Reqwest(e) if e.is_connect() => {
            AppError::gateway_unavailable(format!("Paystack connection failed: {}", e))
        }
        _ => AppError::gateway_unavailable(format!("Paystack request failed: {}", error)),
    }
}
