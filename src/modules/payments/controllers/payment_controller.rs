use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::services::{
    PaymentProcessor, PaymentRequest, ProcessOutcome, SettlementOutcome, SettlementService,
};
use crate::core::{AppError, Result};

/// Response for POST /payments
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreatePaymentResponse {
    /// Payer must complete the charge on the gateway's hosted page
    Redirect {
        authorization_url: String,
        reference: String,
    },
    /// Paid from the wallet balance and settled immediately
    Settled { reference: String },
}

impl From<ProcessOutcome> for CreatePaymentResponse {
    fn from(outcome: ProcessOutcome) -> Self {
        match outcome {
            ProcessOutcome::Redirect {
                authorization_url,
                reference,
            } => Self::Redirect {
                authorization_url,
                reference,
            },
            ProcessOutcome::WalletCharged { reference } => Self::Settled { reference },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// The gateway redirects back with both `reference` and `trxref`
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

impl VerifyQuery {
    fn reference(&self) -> Result<&str> {
        self.reference
            .as_deref()
            .or(self.trxref.as_deref())
            .ok_or_else(|| AppError::validation("Missing 'reference' query parameter"))
    }
}

/// Response for GET /payments/verify
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyResponse {
    Settled { reference: String, data: Value },
    AlreadyProcessed { reference: String },
}

impl From<SettlementOutcome> for VerifyResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        match outcome {
            SettlementOutcome::Settled { reference, raw } => Self::Settled {
                reference,
                data: raw,
            },
            SettlementOutcome::AlreadyProcessed { reference } => {
                Self::AlreadyProcessed { reference }
            }
        }
    }
}

/// POST /payments
#[post("/payments")]
async fn create_payment(
    processor: web::Data<PaymentProcessor>,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse> {
    let outcome = processor.process(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CreatePaymentResponse::from(outcome)))
}

/// GET /payments/verify?reference=...
#[get("/payments/verify")]
async fn verify_payment(
    settlement: web::Data<SettlementService>,
    query: web::Query<VerifyQuery>,
) -> Result<HttpResponse> {
    let outcome = settlement.verify(query.reference()?).await?;
    Ok(HttpResponse::Ok().json(VerifyResponse::from(outcome)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_payment).service(verify_payment);
}
