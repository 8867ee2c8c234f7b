//! # shop-stripe
//!
//! Stripe payment provider client for shop-gateway.
//!
//! Implements the `shop_core::PaymentProvider` surface against the Stripe
//! REST API:
//!
//! - **Checkout Sessions** - hosted card checkout with dynamic line items,
//!   shipping-rate options, and a metadata bag
//! - **Webhook verification** - HMAC-SHA256 signature checking with replay
//!   protection, then typed event parsing
//! - **Session reads** - line-item listing and product retrieval for order
//!   reconstruction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeClient;
//!
//! // Create client from environment (STRIPE_SECRET_KEY, STRIPE_WEBHOOK_SECRET)
//! let client = StripeClient::from_env()?;
//!
//! let session = client.create_checkout_session(&request).await?;
//! // Redirect user to session.url
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
