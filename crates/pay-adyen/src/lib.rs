//! # pay-adyen
//!
//! Adyen integration for the checkout backend.
//!
//! This crate provides:
//!
//! 1. **AdyenClient** - Checkout API client implementing `PaymentProcessor`
//!    - Payment methods, payments, payment details, sessions
//!    - Fresh idempotency key per payment call
//!
//! 2. **HmacValidator** - Standard notification HMAC verification
//!
//! 3. **CardEncrypter** - JWE (RSA-OAEP-256 / A256GCM) card encryption
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_adyen::{AdyenClient, AdyenConfig, HmacValidator};
//! use pay_core::PaymentProcessor;
//!
//! let config = AdyenConfig::from_env()?;
//! let validator = HmacValidator::new(&config.hmac_key)?;
//! let client = AdyenClient::new(config)?;
//! let methods = client.payment_methods(request).await?;
//!
//! // In your webhook endpoint:
//! for item in validator.verify(&notification)? {
//!     println!("{} -> {}", item.merchant_reference, item.event_code);
//! }
//! ```

pub mod client;
pub mod config;
pub mod encrypt;
pub mod webhook;

// Re-exports
pub use client::AdyenClient;
pub use config::AdyenConfig;
pub use encrypt::{CardDetails, CardEncrypter};
pub use webhook::HmacValidator;
