//! # Payment Processor Trait
//!
//! Seam between the HTTP layer and the external payment processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PaymentProcessor (trait)                    │
//! │  ├── payment_methods()                                      │
//! │  ├── payments()                                             │
//! │  ├── payment_details()                                      │
//! │  └── create_session()                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │  AdyenClient  │         │  test mocks   │
//!       └───────────────┘         └───────────────┘
//! ```
//!
//! Responses are passed back to the caller untouched, so they are kept as
//! `serde_json::Value`.

use crate::error::PaymentResult;
use crate::transaction::Amount;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Payment method that is always offered
pub const DEFAULT_PAYMENT_METHOD: &str = "ideal";

/// Card payments are offered above this amount (minor units)
pub const CARD_PAYMENT_THRESHOLD: i64 = 1000;

/// Request for the list of available payment methods
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethodsRequest {
    /// Method types the shopper may use
    pub allowed_payment_methods: Vec<String>,
    /// Cart/amount context from the storefront, forwarded as-is
    pub context: Map<String, Value>,
}

impl PaymentMethodsRequest {
    /// Build from the storefront's cart context.
    ///
    /// iDEAL is always allowed; cards (`scheme`) only when `amount.value`
    /// exceeds [`CARD_PAYMENT_THRESHOLD`].
    pub fn from_context(context: Map<String, Value>) -> Self {
        let mut allowed_payment_methods = vec![DEFAULT_PAYMENT_METHOD.to_string()];

        let value = context
            .get("amount")
            .and_then(|a| a.get("value"))
            .and_then(numeric_value)
            .unwrap_or(0.0);
        if value > CARD_PAYMENT_THRESHOLD as f64 {
            allowed_payment_methods.push("scheme".to_string());
        }

        Self {
            allowed_payment_methods,
            context,
        }
    }
}

// Storefronts send the amount as an integer, a float or a numeric string
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Payment submission (advanced flow, step 2)
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Amount,
    pub reference: String,
    /// Payment data produced by the client-side component
    pub data: Map<String, Value>,
    pub return_url: String,
}

/// Redirect result submission (advanced flow, step 3)
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetailsRequest {
    /// Already URI-decoded redirect result
    pub redirect_result: String,
}

/// Checkout session request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub country_code: String,
    pub amount: Amount,
    pub reference: String,
    pub return_url: String,
    pub line_items: Vec<Value>,
}

/// Core trait for payment processor clients.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// List the payment methods available for a cart.
    async fn payment_methods(&self, request: PaymentMethodsRequest) -> PaymentResult<Value>;

    /// Submit a payment.
    async fn payments(&self, request: PaymentRequest) -> PaymentResult<Value>;

    /// Submit the result of a redirect back to the processor.
    async fn payment_details(&self, request: PaymentDetailsRequest) -> PaymentResult<Value>;

    /// Create a checkout session.
    async fn create_session(&self, request: SessionRequest) -> PaymentResult<Value>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
