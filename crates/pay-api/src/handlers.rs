//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Each handler forwards to the payment processor and maps its errors to HTTP.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use pay_adyen::CardDetails;
use pay_core::{
    Amount, NotificationRequest, PaymentDetailsRequest, PaymentError, PaymentMethodsRequest,
    PaymentRequest, SessionRequest, Transaction,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Payment submission request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsBody {
    /// State data from the client-side component
    #[serde(default)]
    pub data: Map<String, Value>,
    pub amount: Amount,
    pub reference: String,
    pub return_url: String,
}

/// Redirect result submission request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsBody {
    #[serde(default)]
    pub redirect_result: Option<String>,
}

/// Create session request
#[derive(Debug, Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    pub order_reference: Option<String>,
    /// Amount in minor units
    #[serde(default)]
    pub amount: Option<i64>,
    /// Line items forwarded to the processor
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = match err {
        PaymentError::Processor {
            message,
            error_code,
            ..
        } => {
            let response = ErrorResponse::new(message, code);
            match error_code {
                Some(error_code) => response.with_details(error_code),
                None => response,
            }
        }
        PaymentError::WebhookVerificationFailed(message) => ErrorResponse::new(message, code),
        other => ErrorResponse::new(other.to_string(), code),
    };
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

/// Origin the shopper returns to after a redirect.
///
/// Uses `X-Forwarded-Proto`/`X-Forwarded-Host` when a proxy sets both,
/// otherwise the configured storefront URL.
pub fn determine_host_url(headers: &HeaderMap, fallback: &str) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match (header("x-forwarded-proto"), header("x-forwarded-host")) {
        (Some(proto), Some(host)) => {
            let proto = proto.split(',').next().unwrap_or(proto).trim();
            format!("{}://{}", proto, host)
        }
        _ => fallback.trim_end_matches('/').to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List payment methods available for the cart
#[instrument(skip(state, context))]
pub async fn payment_methods(
    State(state): State<AppState>,
    Json(context): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let request = PaymentMethodsRequest::from_context(context);
    info!("Allowed payment methods: {:?}", request.allowed_payment_methods);

    let response = state.processor.payment_methods(request).await.map_err(|e| {
        error!("Failed to list payment methods: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// Submit a payment
#[instrument(skip(state, body), fields(reference = %body.reference))]
pub async fn payments(
    State(state): State<AppState>,
    Json(body): Json<PaymentsBody>,
) -> Result<Json<Value>, ApiError> {
    let request = PaymentRequest {
        amount: body.amount,
        reference: body.reference,
        data: body.data,
        return_url: body.return_url,
    };

    let response = state.processor.payments(request).await.map_err(|e| {
        error!("Failed to submit payment: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// Submit the redirect result after the shopper returns
#[instrument(skip(state, body))]
pub async fn payment_details(
    State(state): State<AppState>,
    Json(body): Json<PaymentDetailsBody>,
) -> Result<Json<Value>, ApiError> {
    let raw = body
        .redirect_result
        .filter(|r| !r.is_empty())
        .ok_or_else(|| bad_request("No redirectResult provided"))?;

    let redirect_result = urlencoding::decode(&raw)
        .map_err(|e| bad_request(format!("Malformed redirectResult: {}", e)))?
        .into_owned();

    let response = state
        .processor
        .payment_details(PaymentDetailsRequest { redirect_result })
        .await
        .map_err(|e| {
            error!("Failed to submit payment details: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(response))
}

/// Create a checkout session and record a pending transaction
#[instrument(skip(state, headers, body))]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SessionBody>,
) -> Result<Json<Value>, ApiError> {
    let order_reference = body
        .order_reference
        .filter(|r| !r.is_empty())
        .ok_or_else(|| bad_request("No order reference provided"))?;

    let value = body
        .amount
        .ok_or_else(|| bad_request("No amount provided"))?;

    info!(
        "Received payment request for order_reference: {}",
        order_reference
    );

    let amount = Amount::new(state.config.currency.clone(), value);
    let return_url = format!(
        "{}/post_payment?order_reference={}",
        determine_host_url(&headers, &state.config.client_url),
        urlencoding::encode(&order_reference)
    );

    let response = state
        .processor
        .create_session(SessionRequest {
            country_code: state.config.country_code.clone(),
            amount: amount.clone(),
            reference: order_reference.clone(),
            return_url,
            line_items: body.items,
        })
        .await
        .map_err(|e| {
            error!("Failed to create session: {}", e);
            payment_error_to_response(e)
        })?;

    state
        .store
        .set(
            order_reference.clone(),
            Transaction::pending(order_reference, amount),
        )
        .await;

    Ok(Json(response))
}

/// Encrypt raw card fields into a JWE token
#[instrument(skip(state, card))]
pub async fn encrypt_card(
    State(state): State<AppState>,
    Json(card): Json<CardDetails>,
) -> Result<Json<String>, ApiError> {
    let encrypter = state.encrypter.as_ref().ok_or_else(|| {
        payment_error_to_response(PaymentError::Configuration(
            "Card encryption certificate not configured".to_string(),
        ))
    })?;

    let token = encrypter.encrypt_card(&card).map_err(|e| {
        error!("Failed to encrypt card: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(token))
}

/// Handle an Adyen standard notification
#[instrument(skip(state, body))]
pub async fn webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let notification: NotificationRequest = serde_json::from_slice(&body).map_err(|e| {
        payment_error_to_response(PaymentError::WebhookParseError(e.to_string()))
    })?;

    info!("Webhook received (live: {})", notification.is_live());

    let items = state
        .hmac
        .verify(&notification)
        .map_err(payment_error_to_response)?;

    for item in items {
        info!(
            "merchantReference:{} eventCode:{} success:{}",
            item.merchant_reference, item.event_code, item.success
        );

        let Some(status) = item.resulting_status() else {
            continue;
        };

        let psp_reference = Some(item.psp_reference.clone()).filter(|p| !p.is_empty());
        if state
            .store
            .update_status(&item.merchant_reference, status, psp_reference)
            .await
            .is_none()
        {
            warn!(
                "No transaction for merchantReference {}",
                item.merchant_reference
            );
        }
    }

    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_payment_error_conversion() {
        let err = PaymentError::InvalidRequest("Bad data".to_string());
        let (status, _json) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processor_error_conversion() {
        let err = PaymentError::Processor {
            status: 422,
            error_code: Some("14_030".into()),
            message: "Return URL is missing.".into(),
        };
        let (status, Json(body)) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "Return URL is missing.");
        assert_eq!(body.details.as_deref(), Some("14_030"));
    }

    #[test]
    fn test_webhook_verification_error_uses_bare_message() {
        let err = PaymentError::WebhookVerificationFailed("Invalid HMAC signature".into());
        let (status, Json(body)) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Invalid HMAC signature");
        assert_eq!(body.code, 401);
    }

    #[test]
    fn test_host_url_fallback() {
        let headers = HeaderMap::new();
        assert_eq!(
            determine_host_url(&headers, "http://localhost:5173/"),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_host_url_from_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https,http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("shop.example"));
        assert_eq!(
            determine_host_url(&headers, "http://localhost:5173"),
            "https://shop.example"
        );
    }

    #[test]
    fn test_host_url_needs_both_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-host", HeaderValue::from_static("shop.example"));
        assert_eq!(
            determine_host_url(&headers, "http://localhost:5173"),
            "http://localhost:5173"
        );
    }
}
