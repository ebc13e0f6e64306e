use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Payment gateway credentials and endpoint.
///
/// Constructed once at startup and injected into the gateway client; no
/// component reads gateway settings from the process environment at call
/// time.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig {
                secret_key: env::var("PAYSTACK_SECRET_KEY").map_err(|_| {
                    AppError::Configuration("PAYSTACK_SECRET_KEY not set".to_string())
                })?,
                webhook_secret: env::var("PAYSTACK_WEBHOOK_SECRET").map_err(|_| {
                    AppError::Configuration("PAYSTACK_WEBHOOK_SECRET not set".to_string())
                })?,
                base_url: env::var("PAYSTACK_BASE_URL")
                    .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
                timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid GATEWAY_TIMEOUT_SECS".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.gateway.secret_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Gateway secret key must not be empty".to_string(),
            ));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Gateway timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
