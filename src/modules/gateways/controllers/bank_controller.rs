use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};

use super::super::services::PaymentGateway;
use crate::core::Result;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub account_number: String,
    pub bank_code: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub account_number: String,
    pub bank_code: String,
    pub account_name: String,
}

/// GET /banks/resolve?account_number=...&bank_code=...
#[get("/banks/resolve")]
async fn resolve_bank_account(
    gateway: web::Data<dyn PaymentGateway>,
    query: web::Query<ResolveQuery>,
) -> Result<HttpResponse> {
    let account_name = gateway
        .resolve_bank_account(&query.account_number, &query.bank_code)
        .await?;

    Ok(HttpResponse::Ok().json(ResolveResponse {
        account_number: query.account_number.clone(),
        bank_code: query.bank_code.clone(),
        account_name,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(resolve_bank_account);
}
