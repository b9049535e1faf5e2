//! # pay-api
//!
//! HTTP API layer for the checkout backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints forwarding to the Adyen Checkout API
//! - Webhook handler for Adyen notifications
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/payment_methods` | List payment methods |
//! | POST | `/api/payments` | Submit payment |
//! | POST | `/api/payment_details` | Submit redirect result |
//! | POST | `/api/session` | Create checkout session |
//! | POST | `/api/encrypt_card` | Encrypt card fields |
//! | POST | `/api/webhook` | Adyen notification |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
