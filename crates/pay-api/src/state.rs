//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the processor client, notification validator, card encrypter,
//! transaction store and configuration.

use pay_adyen::{AdyenClient, AdyenConfig, CardEncrypter, HmacValidator};
use pay_core::{BoxedPaymentProcessor, TransactionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront origin allowed by CORS, also the fallback return host
    pub client_url: String,
    /// Country code sent with checkout sessions
    pub country_code: String,
    /// Currency of checkout sessions
    pub currency: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            country_code: std::env::var("ADYEN_COUNTRY_CODE").unwrap_or_else(|_| "NL".to_string()),
            currency: std::env::var("ADYEN_CURRENCY").unwrap_or_else(|_| "EUR".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            client_url: "http://localhost:5173".to_string(),
            country_code: "NL".to_string(),
            currency: "EUR".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment processor client
    pub processor: BoxedPaymentProcessor,
    /// Notification HMAC validator
    pub hmac: HmacValidator,
    /// Card encrypter, absent when no certificate is configured
    pub encrypter: Option<CardEncrypter>,
    /// In-memory transactions keyed by order reference
    pub store: TransactionStore,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the Adyen Checkout API
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let adyen_config = AdyenConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Adyen config: {}", e))?;

        info!(
            "Adyen environment: {}",
            if adyen_config.is_test_mode() { "test" } else { "live" }
        );

        let hmac = HmacValidator::new(&adyen_config.hmac_key)
            .map_err(|e| anyhow::anyhow!("Failed to initialize HMAC validator: {}", e))?;

        let encrypter = match &adyen_config.public_certificate {
            Some(pem) => Some(
                CardEncrypter::from_pem(pem)
                    .map_err(|e| anyhow::anyhow!("Failed to load ADYEN_X509: {}", e))?,
            ),
            None => {
                warn!("ADYEN_X509 not set, card encryption is disabled");
                None
            }
        };

        let client = AdyenClient::new(adyen_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Adyen client: {}", e))?;

        Ok(Self::with_processor(
            config,
            Arc::new(client) as BoxedPaymentProcessor,
            hmac,
            encrypter,
        ))
    }

    /// Assemble state from parts (used by tests and embedders)
    pub fn with_processor(
        config: AppConfig,
        processor: BoxedPaymentProcessor,
        hmac: HmacValidator,
        encrypter: Option<CardEncrypter>,
    ) -> Self {
        Self {
            processor,
            hmac,
            encrypter,
            store: TransactionStore::new(),
            config,
        }
    }
}
