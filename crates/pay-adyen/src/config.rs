//! # Adyen Configuration
//!
//! Configuration management for the Adyen integration.
//! All secrets are loaded from environment variables.

use pay_core::PaymentError;
use std::env;

/// Checkout API base URL for the test environment
pub const TEST_CHECKOUT_URL: &str = "https://checkout-test.adyen.com/v71";

/// Adyen API configuration
#[derive(Clone)]
pub struct AdyenConfig {
    /// API key sent as `X-API-Key`
    pub api_key: String,

    /// Merchant account every request is made on behalf of
    pub merchant_account: String,

    /// Hex-encoded HMAC key for notification verification
    pub hmac_key: String,

    /// PEM X.509 certificate (or public key) used for card encryption
    pub public_certificate: Option<String>,

    /// Checkout API base URL (for testing/mocking)
    pub checkout_url: String,

    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
}

impl AdyenConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ADYEN_API_KEY`
    /// - `ADYEN_MERCHANT_ACCOUNT`
    /// - `ADYEN_HMAC_KEY`
    ///
    /// Optional: `ADYEN_X509`, `ADYEN_CHECKOUT_URL` (or `ADYEN_DIRECT_URL`),
    /// `ADYEN_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = required("ADYEN_API_KEY")?;
        let merchant_account = required("ADYEN_MERCHANT_ACCOUNT")?;
        let hmac_key = required("ADYEN_HMAC_KEY")?;

        if hex::decode(&hmac_key).is_err() {
            return Err(PaymentError::Configuration(
                "ADYEN_HMAC_KEY must be a hex string".to_string(),
            ));
        }

        // Certificates pasted into .env usually carry escaped newlines
        let public_certificate = env::var("ADYEN_X509")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.replace("\\n", "\n"));

        let checkout_url = env::var("ADYEN_CHECKOUT_URL")
            .or_else(|_| env::var("ADYEN_DIRECT_URL"))
            .unwrap_or_else(|_| TEST_CHECKOUT_URL.to_string());

        let timeout_secs = env::var("ADYEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            api_key,
            merchant_account,
            hmac_key,
            public_certificate,
            checkout_url: checkout_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        api_key: impl Into<String>,
        merchant_account: impl Into<String>,
        hmac_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            merchant_account: merchant_account.into(),
            hmac_key: hmac_key.into(),
            public_certificate: None,
            checkout_url: TEST_CHECKOUT_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Check if pointed at the test environment
    pub fn is_test_mode(&self) -> bool {
        self.checkout_url.contains("-test.")
    }

    /// Builder: set custom Checkout API base URL (for testing)
    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL for a Checkout API endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.checkout_url, path.trim_start_matches('/'))
    }
}

// Keeps the API key and HMAC key out of logs
impl std::fmt::Debug for AdyenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdyenConfig")
            .field("merchant_account", &self.merchant_account)
            .field("checkout_url", &self.checkout_url)
            .field("has_public_certificate", &self.public_certificate.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn required(name: &str) -> Result<String, PaymentError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::Configuration(format!("{} not set", name)))
}
