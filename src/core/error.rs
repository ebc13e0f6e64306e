use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
///
/// The first group covers client/config errors that are reported immediately
/// and never retried. `GatewayUnavailable` is transient and safe to retry;
/// `GatewayRejected` and `InvalidSignature` are authoritative rejections.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Amount is missing, non-positive, or not representable in minor units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Wallet balance cannot cover the requested debit
    #[error("Insufficient balance: requested {requested} kobo, available {available} kobo")]
    InsufficientBalance { requested: i64, available: i64 },

    /// Payment option is not one of card, bank, transfer, wallet
    #[error("Invalid payment option: {0}")]
    InvalidPaymentOption(String),

    /// Bank/transfer payment without an account number and bank code on file
    #[error("Missing bank details: {0}")]
    MissingBankDetails(String),

    /// Billing frequency is not one of daily, weekly, monthly
    #[error("Invalid billing frequency: {0}")]
    InvalidFrequency(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Gateway could not be reached or returned a 5xx (transient)
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Gateway rejected the request (4xx / declined charge)
    #[error("Gateway rejected: {0}")]
    GatewayRejected(String),

    /// Webhook signature did not match the shared-secret HMAC
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // Transient gateway failures surface as a generic "try again";
        // everything else carries its structured reason.
        let error_message = match self {
            AppError::GatewayUnavailable(_) => {
                "Payment gateway is temporarily unavailable, please try again".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidPaymentOption(_) => StatusCode::BAD_REQUEST,
            AppError::MissingBankDetails(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidFrequency(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        AppError::InvalidAmount(msg.into())
    }

    pub fn gateway_unavailable(msg: impl Into<String>) -> Self {
        AppError::GatewayUnavailable(msg.into())
    }

    pub fn gateway_rejected(msg: impl Into<String>) -> Self {
        AppError::GatewayRejected(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// True when the underlying database error is a unique-key violation.
    ///
    /// Duplicate inserts on an idempotency reference are resolved to the
    /// already-processed outcome by callers, not surfaced as failures.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        let errors = [
            AppError::InvalidAmount("zero".to_string()),
            AppError::InvalidPaymentOption("crypto".to_string()),
            AppError::MissingBankDetails("no default account".to_string()),
            AppError::InvalidFrequency("fortnightly".to_string()),
        ];
        for e in errors {
            assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_signature_failure_is_unauthorized() {
        assert_eq!(
            AppError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_insufficient_balance_message() {
        let e = AppError::InsufficientBalance {
            requested: 150_000,
            available: 50_000,
        };
        let msg = e.to_string();
        assert!(msg.contains("150000"));
        assert!(msg.contains("50000"));
    }

    #[test]
    fn test_gateway_unavailable_is_bad_gateway() {
        let e = AppError::gateway_unavailable("timeout");
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
    }
}
