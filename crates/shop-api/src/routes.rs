//! # Routes
//!
//! Axum router configuration for the payment gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/v1/payment/checkout_session - Create a hosted checkout session
/// - POST /api/v1/payment/webhook - Payment provider webhook (raw body)
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    // CORS is wide open; the storefront origin is not known at this layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route(
            "/checkout_session",
            post(handlers::create_checkout_session),
        )
        // webhook must receive the unparsed body for signature verification
        .route("/webhook", post(handlers::payment_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1/payment", payment_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
