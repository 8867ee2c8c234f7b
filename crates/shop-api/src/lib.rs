//! # shop-api
//!
//! HTTP API layer for shop-gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout session endpoint for the storefront
//! - Webhook handler for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/payment/checkout_session` | Create a hosted checkout session |
//! | POST | `/api/v1/payment/webhook` | Payment provider webhook |

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
