//! # Payment Provider Trait
//!
//! The consumed surface of the hosted payment API. The gateway only ever
//! creates sessions, verifies webhooks, and reads line items and products
//! back; everything else (session state machine, idempotency, retries) lives
//! on the provider side.
//!
//! The trait is object-safe so handlers receive an injected
//! `BoxedPaymentProvider` and tests can substitute a double that records
//! calls and returns canned responses.

use crate::error::PaymentResult;
use crate::session::{
    CheckoutSession, CheckoutSessionRequest, ProviderProduct, SessionLineItem, WebhookEvent,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Hosted payment provider operations consumed by the gateway.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session and return its redirect URL.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> PaymentResult<CheckoutSession>;

    /// Verify a webhook signature against the shared secret and parse the
    /// event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// List the line items of a session (they are not embedded in events).
    async fn list_line_items(&self, session_id: &str) -> PaymentResult<Vec<SessionLineItem>>;

    /// Retrieve a product record by its provider reference.
    async fn retrieve_product(&self, product_ref: &str) -> PaymentResult<ProviderProduct>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;
