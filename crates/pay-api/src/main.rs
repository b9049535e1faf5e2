//! # Checkout Backend
//!
//! Storefront backend for Adyen payments.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ADYEN_API_KEY=AQE...
//! export ADYEN_MERCHANT_ACCOUNT=MyMerchantECOM
//! export ADYEN_HMAC_KEY=44782DEF...
//! export ADYEN_X509="-----BEGIN CERTIFICATE-----\n..."
//!
//! # Run the server
//! checkout-backend
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging (LOG_FORMAT=json for structured output)
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let (plain_layer, json_layer) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(plain_layer)
        .with(json_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment processor: {}", state.processor.provider_name());
    info!("Allowed origin: {}", state.config.client_url);
    info!(
        "Card encryption: {}",
        if state.encrypter.is_some() { "enabled" } else { "disabled" }
    );

    // Create router
    let app = routes::create_router(state);

    info!("Server listening on http://{}", addr);

    if !is_prod {
        info!("Session: POST http://{}/api/session", addr);
        info!("Webhook: POST http://{}/api/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
