//! # shop-core
//!
//! Core types and components for the shop-gateway checkout service.
//!
//! This crate provides:
//! - `CheckoutSessionCreator` for translating carts into hosted sessions
//! - `WebhookIngestor` for verifying payment events and materializing orders
//! - `PaymentProvider` trait for the hosted payment API collaborator
//! - `OrderStore` trait for the persistence collaborator
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutPolicy, CheckoutSessionCreator, Currency, WebhookIngestor};
//!
//! let policy = CheckoutPolicy::new(Currency::USD, frontend_url, 200.0, free_rate, standard_rate);
//! let creator = CheckoutSessionCreator::new(policy, provider.clone());
//!
//! // Checkout: cart in, redirect URL out
//! let session = creator.create(&cart, &user).await?;
//!
//! // Webhook: signed bytes in, persisted order out
//! let ingestor = WebhookIngestor::new(provider, orders);
//! let order = ingestor.ingest(&payload, &signature).await?;
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod ingest;
pub mod money;
pub mod order;
pub mod provider;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use cart::{Cart, CartItem, CheckoutUser, ShippingInfo};
pub use checkout::{CheckoutPolicy, CheckoutSessionCreator, ITEMS_PRICE_KEY};
pub use error::{PaymentError, PaymentResult};
pub use ingest::WebhookIngestor;
pub use money::Currency;
pub use order::{NewOrder, Order, OrderItem, PaymentInfo};
pub use provider::{BoxedPaymentProvider, PaymentProvider};
pub use session::{
    CheckoutSession, CheckoutSessionRequest, CompletedSession, LineItemSpec, ProviderProduct,
    SessionLineItem, WebhookEvent, WebhookEventType,
};
pub use store::{BoxedOrderStore, InMemoryOrderStore, OrderStore};
