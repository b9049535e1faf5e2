//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Create the main application router
///
/// Routes:
/// - API:
///   - POST /api/payment_methods - Available payment methods for a cart
///   - POST /api/payments - Submit a payment
///   - POST /api/payment_details - Submit a redirect result
///   - POST /api/session - Create a checkout session
///   - POST /api/encrypt_card - Encrypt raw card fields
///
/// - Webhooks:
///   - POST /api/webhook - Adyen standard notifications
///
/// - Health:
///   - GET /health
pub fn create_router(state: AppState) -> Router {
    // Only the storefront may call the API from a browser
    let cors = match state.config.client_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(AllowOrigin::exact(origin)),
        Err(_) => {
            warn!(
                "CLIENT_URL {:?} is not a valid origin, cross-origin requests will be rejected",
                state.config.client_url
            );
            CorsLayer::new()
        }
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    // Access log, one line per response
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api_routes = Router::new()
        .route("/payment_methods", post(handlers::payment_methods))
        .route("/payments", post(handlers::payments))
        .route("/payment_details", post(handlers::payment_details))
        .route("/session", post(handlers::create_session))
        .route("/encrypt_card", post(handlers::encrypt_card))
        .route("/webhook", post(handlers::webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
