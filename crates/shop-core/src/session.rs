//! # Session Types
//!
//! Provider-facing checkout session types: the ephemeral session-creation
//! request, the hosted session handle, and the verified webhook event with
//! its parsed completed-session payload.

use crate::money::Currency;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Specification for one line item in a session-creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemSpec {
    /// Internal product id, carried in provider product metadata for later
    /// reconciliation
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Image URL shown on the hosted page
    pub image: String,

    /// Unit price in provider minor units
    pub unit_amount: i64,

    /// Quantity
    pub quantity: u32,
}

/// A session-creation request. Exists only for the duration of one
/// provider call.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Currency for every line item
    pub currency: Currency,

    /// Line items
    pub line_items: Vec<LineItemSpec>,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect if the customer backs out
    pub cancel_url: String,

    /// Buyer email, prefilled on the hosted page
    pub customer_email: String,

    /// Internal user id, echoed back on the webhook
    pub client_reference_id: String,

    /// Opaque key-value bag echoed back unchanged in later events
    pub metadata: HashMap<String, String>,

    /// Provider-side shipping rate object to apply
    pub shipping_rate: String,
}

/// A hosted checkout session created by the provider.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider's session id
    pub session_id: String,

    /// URL to redirect the customer to for payment
    pub url: String,
}

/// Webhook event kinds the gateway recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Checkout session completed, the only kind that materializes an order
    CheckoutCompleted,
    /// Payment intent succeeded
    PaymentSucceeded,
    /// Payment intent failed
    PaymentFailed,
    /// Anything else the provider is configured to send
    Unknown(String),
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::CheckoutCompleted => write!(f, "checkout.session.completed"),
            WebhookEventType::PaymentSucceeded => write!(f, "payment_intent.succeeded"),
            WebhookEventType::PaymentFailed => write!(f, "payment_intent.payment_failed"),
            WebhookEventType::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// A verified, parsed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event id from the provider
    pub event_id: String,

    /// Event kind
    pub event_type: WebhookEventType,

    /// Completed-session payload, present for `CheckoutCompleted` events
    pub session: Option<CompletedSession>,

    /// Provider event timestamp
    pub timestamp: DateTime<Utc>,
}

/// The completed session object carried by a `checkout.session.completed`
/// event. Money fields are provider minor units; the metadata bag is the one
/// written at session creation, echoed back unchanged.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub session_id: String,
    pub client_reference_id: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: i64,
    pub amount_tax: i64,
    pub amount_shipping: i64,
    pub payment_intent: Option<String>,
    pub payment_status: String,
    pub metadata: HashMap<String, String>,
}

/// One line item fetched back from a completed session.
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    /// Provider product reference (not the internal product id)
    pub product_ref: String,

    /// Unit price, provider decimal-minor-unit field
    pub unit_amount_minor: f64,

    /// Quantity purchased
    pub quantity: u32,
}

/// A provider product record, fetched to recover display attributes and the
/// internal product id carried in its metadata.
#[derive(Debug, Clone)]
pub struct ProviderProduct {
    /// Provider product id
    pub provider_id: String,

    /// Display name
    pub name: String,

    /// Image URLs
    pub images: Vec<String>,

    /// Metadata bag (carries `productId`)
    pub metadata: HashMap<String, String>,
}
