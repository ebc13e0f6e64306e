use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::warn;

use super::super::services::{SettlementOutcome, SettlementService, WebhookOutcome};
use crate::core::{AppError, Result};

const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Response for POST /webhooks/paystack
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookResponse {
    Settled { reference: String },
    AlreadyProcessed { reference: String },
    Ignored { event: String },
}

/// POST /webhooks/paystack
///
/// The body is taken as raw bytes: the signature is an HMAC of the exact
/// payload the gateway sent, so it must be checked before any JSON
/// deserialization touches the bytes.
#[post("/webhooks/paystack")]
async fn paystack_webhook(
    req: HttpRequest,
    body: web::Bytes,
    settlement: web::Data<SettlementService>,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook rejected: missing signature header");
            AppError::InvalidSignature
        })?;

    let outcome = settlement.handle_webhook(signature, &body).await?;

    let response = match outcome {
        WebhookOutcome::Processed(SettlementOutcome::Settled { reference, .. }) => {
            WebhookResponse::Settled { reference }
        }
        WebhookOutcome::Processed(SettlementOutcome::AlreadyProcessed { reference }) => {
            WebhookResponse::AlreadyProcessed { reference }
        }
        WebhookOutcome::Ignored { event } => WebhookResponse::Ignored { event },
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(paystack_webhook);
}
