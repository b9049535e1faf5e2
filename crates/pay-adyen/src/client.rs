//! # Adyen Checkout API
//!
//! Thin client over the Checkout API endpoints used by the storefront:
//! `/paymentMethods`, `/payments`, `/payments/details` and `/sessions`.

use crate::config::AdyenConfig;
use async_trait::async_trait;
use pay_core::{
    PaymentDetailsRequest, PaymentError, PaymentMethodsRequest, PaymentProcessor, PaymentRequest,
    PaymentResult, SessionRequest,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Adyen Checkout API client
pub struct AdyenClient {
    config: AdyenConfig,
    client: Client,
}

impl AdyenClient {
    /// Create a new client
    pub fn new(config: AdyenConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the `/paymentMethods` body.
    ///
    /// Storefront context may override `allowedPaymentMethods`; the merchant
    /// account always comes from configuration.
    fn payment_methods_body(&self, request: PaymentMethodsRequest) -> Value {
        let mut body = Map::new();
        body.insert(
            "allowedPaymentMethods".to_string(),
            json!(request.allowed_payment_methods),
        );
        body.extend(request.context);
        body.insert(
            "merchantAccount".to_string(),
            json!(self.config.merchant_account),
        );
        Value::Object(body)
    }

    /// Build the `/payments` body: payment data may override amount and
    /// reference, but not the return URL or merchant account.
    fn payments_body(&self, request: PaymentRequest) -> Value {
        let mut body = Map::new();
        body.insert("amount".to_string(), json!(request.amount));
        body.insert("reference".to_string(), json!(request.reference));
        body.extend(request.data);
        body.insert("returnUrl".to_string(), json!(request.return_url));
        body.insert(
            "merchantAccount".to_string(),
            json!(self.config.merchant_account),
        );
        Value::Object(body)
    }

    fn payment_details_body(request: PaymentDetailsRequest) -> Value {
        json!({
            "details": { "redirectResult": request.redirect_result }
        })
    }

    fn session_body(&self, request: SessionRequest) -> Value {
        json!({
            "countryCode": request.country_code,
            "amount": request.amount,
            "reference": request.reference,
            "merchantAccount": self.config.merchant_account,
            "returnUrl": request.return_url,
            "lineItems": request.line_items,
        })
    }

    /// POST a JSON body to a Checkout API endpoint and return the parsed response.
    async fn post(&self, path: &str, body: &Value, idempotent: bool) -> PaymentResult<Value> {
        let url = self.config.endpoint(path);

        let mut request = self
            .client
            .post(&url)
            .header("X-API-Key", &self.config.api_key)
            .json(body);

        if idempotent {
            request = request.header("Idempotency-Key", Uuid::new_v4().to_string());
        }

        debug!("POST {}", url);

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Adyen API error: status={}, body={}", status, text);
            return Err(processor_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Adyen response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessor for AdyenClient {
    #[instrument(skip(self, request), fields(allowed = ?request.allowed_payment_methods))]
    async fn payment_methods(&self, request: PaymentMethodsRequest) -> PaymentResult<Value> {
        let body = self.payment_methods_body(request);
        self.post("/paymentMethods", &body, false).await
    }

    #[instrument(skip(self, request), fields(reference = %request.reference))]
    async fn payments(&self, request: PaymentRequest) -> PaymentResult<Value> {
        let body = self.payments_body(request);
        let response = self.post("/payments", &body, true).await?;

        info!(
            "Payment submitted: resultCode={}",
            response
                .get("resultCode")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown")
        );
        Ok(response)
    }

    #[instrument(skip(self, request))]
    async fn payment_details(&self, request: PaymentDetailsRequest) -> PaymentResult<Value> {
        let body = Self::payment_details_body(request);
        self.post("/payments/details", &body, true).await
    }

    #[instrument(skip(self, request), fields(reference = %request.reference))]
    async fn create_session(&self, request: SessionRequest) -> PaymentResult<Value> {
        let body = self.session_body(request);
        let response = self.post("/sessions", &body, false).await?;

        info!(
            "Created Adyen checkout session: id={}",
            response.get("id").and_then(serde_json::Value::as_str).unwrap_or("unknown")
        );
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "adyen"
    }
}

// =============================================================================
// Adyen API Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdyenErrorResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    error_code: Option<String>,
    message: String,
}

/// Map a non-2xx response to a processor error, keeping Adyen's status and message.
fn processor_error(http_status: u16, body: &str) -> PaymentError {
    match serde_json::from_str::<AdyenErrorResponse>(body) {
        Ok(err) => PaymentError::Processor {
            status: err.status.unwrap_or(http_status),
            error_code: err.error_code,
            message: err.message,
        },
        Err(_) => PaymentError::Processor {
            status: http_status,
            error_code: None,
            message: format!("HTTP {}: {}", http_status, body),
        },
    }
}
