//! # Shop Gateway
//!
//! Checkout-and-webhook payment gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export FRONTEND_URL=https://shop.example.com
//! export SHIPPING_RATE_FREE=shr_...
//! export SHIPPING_RATE_STANDARD=shr_...
//!
//! # Run the server
//! shop-gateway
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Checkout currency: {}", state.config.currency);
    info!(
        "Free shipping at subtotal >= {}",
        state.config.free_shipping_threshold
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 shop-gateway starting on http://{}", addr);

    if !is_prod {
        info!("💳 Checkout: POST http://{}/api/v1/payment/checkout_session", addr);
        info!("🔔 Webhook: POST http://{}/api/v1/payment/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
