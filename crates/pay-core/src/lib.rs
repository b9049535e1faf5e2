//! # pay-core
//!
//! Core types and traits for the checkout backend.
//!
//! This crate provides:
//! - `PaymentProcessor` trait for the external payment processor
//! - `Transaction` and `TransactionStore` for in-memory transaction tracking
//! - `NotificationRequest` for webhook payloads
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{Amount, SessionRequest, Transaction, TransactionStore};
//!
//! let session = processor.create_session(SessionRequest {
//!     country_code: "NL".into(),
//!     amount: Amount::new("EUR", 1000),
//!     reference: "order-1".into(),
//!     return_url: "https://shop.example/post_payment?order_reference=order-1".into(),
//!     line_items: vec![],
//! }).await?;
//!
//! store.set("order-1", Transaction::pending("order-1", Amount::new("EUR", 1000))).await;
//! ```

pub mod error;
pub mod notification;
pub mod processor;
pub mod store;
pub mod transaction;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use notification::{NotificationItemWrapper, NotificationRequest, NotificationRequestItem};
pub use processor::{
    BoxedPaymentProcessor, PaymentDetailsRequest, PaymentMethodsRequest, PaymentProcessor,
    PaymentRequest, SessionRequest,
};
pub use store::TransactionStore;
pub use transaction::{Amount, Transaction, TransactionStatus};
