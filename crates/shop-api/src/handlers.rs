//! # Request Handlers
//!
//! Axum request handlers for the payment gateway: checkout session creation
//! and the payment webhook. Handlers stay thin; translation and ingestion
//! live in `shop-core`.

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shop_core::{Cart, PaymentError};
use tracing::{error, info, instrument};

/// Signature header set by the payment provider on webhook deliveries
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Checkout session response: the hosted page to redirect the customer to
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Error response for the checkout route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "shop-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session for the caller's cart
#[instrument(skip(state, user, cart), fields(user_id = %user.0.id, items = cart.order_items.len()))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(cart): Json<Cart>,
) -> Result<Json<CheckoutSessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.creator.create(&cart, &user.0).await.map_err(|e| {
        error!("Failed to create checkout session: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(CheckoutSessionResponse { url: session.url }))
}

/// Handle a payment provider webhook delivery.
///
/// A verified completed-checkout event answers 200 with the persisted order;
/// other recognized event kinds are explicit no-ops answering a bare 200.
/// Every failure, signature mismatch included, collapses to the same generic
/// 500 body; the typed error kind is logged, never surfaced to the caller.
#[instrument(skip(state, headers, body))]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // An absent header fails verification like any forged signature would
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match state.ingestor.ingest(&body, signature).await {
        Ok(order) => {
            info!("Webhook materialized order {}", order.id);
            (
                StatusCode::OK,
                Json(serde_json::json!({ "success": true, "order": order })),
            )
                .into_response()
        }
        Err(PaymentError::UnsupportedEventType { event_type }) => {
            info!("Ignoring webhook event: {}", event_type);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            error!("Webhook processing failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Webhook processing failed"
                })),
            )
                .into_response()
        }
    }
}
