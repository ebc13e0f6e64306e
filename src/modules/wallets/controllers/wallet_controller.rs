use actix_web::{get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::models::{Wallet, WalletTransaction};
use super::super::services::WalletService;
use crate::core::currency::to_major_units;
use crate::core::{AppError, Result};
use crate::modules::gateways::{InitializeChargeRequest, PaymentGateway};
use crate::modules::payments::models::PaymentMetadata;
use crate::modules::users::repositories::UserRepository;

/// Response for GET /wallets/{user_id}
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub id: String,
    pub user_id: String,
    /// Balance in major units
    pub balance: Decimal,
    pub active: bool,
}

impl WalletResponse {
    fn from_wallet(wallet: Wallet) -> Result<Self> {
        Ok(Self {
            id: wallet.id,
            user_id: wallet.user_id,
            balance: to_major_units(wallet.balance_minor)?,
            active: wallet.active,
        })
    }
}

/// One ledger entry in GET /wallets/{user_id}/transactions
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub direction: String,
    pub amount: Decimal,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub created_at: Option<String>,
}

impl TransactionResponse {
    fn from_entry(entry: WalletTransaction) -> Result<Self> {
        Ok(Self {
            id: entry.id,
            direction: entry.direction.as_str().to_string(),
            amount: to_major_units(entry.amount_minor)?,
            reference: entry.reference,
            reason: entry.reason,
            created_at: entry.created_at.map(|dt| dt.to_rfc3339()),
        })
    }
}

/// Request for POST /wallets/{user_id}/fund
#[derive(Debug, Deserialize)]
pub struct FundWalletRequest {
    /// Amount in major units
    pub amount: Decimal,
}

/// Response for POST /wallets/{user_id}/fund
#[derive(Debug, Serialize)]
pub struct FundWalletResponse {
    pub authorization_url: String,
    pub reference: String,
}

/// GET /wallets/{user_id}
#[get("/wallets/{user_id}")]
async fn get_wallet(
    wallet_service: web::Data<WalletService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let wallet = wallet_service.get_wallet(&user_id).await?;
    Ok(HttpResponse::Ok().json(WalletResponse::from_wallet(wallet)?))
}

/// GET /wallets/{user_id}/transactions
#[get("/wallets/{user_id}/transactions")]
async fn list_wallet_transactions(
    wallet_service: web::Data<WalletService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let entries = wallet_service.list_transactions(&user_id).await?;

    let responses = entries
        .into_iter()
        .map(TransactionResponse::from_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(responses))
}

/// POST /wallets/{user_id}/fund
///
/// Starts a gateway charge tagged as wallet funding; the credit lands when
/// the charge settles through the verify or webhook path.
#[post("/wallets/{user_id}/fund")]
async fn fund_wallet(
    gateway: web::Data<dyn PaymentGateway>,
    user_repo: web::Data<UserRepository>,
    path: web::Path<String>,
    body: web::Json<FundWalletRequest>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();

    let user = user_repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", user_id)))?;

    let metadata = PaymentMetadata::WalletFunding {
        user_id: user_id.clone(),
    };

    let session = gateway
        .initialize_charge(InitializeChargeRequest {
            email: user.email,
            amount: body.amount,
            user_id,
            reference: None,
            channels: None,
            metadata: metadata.to_value()?,
        })
        .await?;

    Ok(HttpResponse::Ok().json(FundWalletResponse {
        authorization_url: session.authorization_url,
        reference: session.reference,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_wallet)
        .service(list_wallet_transactions)
        .service(fund_wallet);
}
