//! # Order Types
//!
//! The persisted order entity, materialized exactly once per verified
//! completed-checkout event. Money fields are decimal major units echoed
//! back by the provider; they are never recomputed from the original cart.

use crate::cart::ShippingInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchased item, reconstructed from provider line-item and product
/// records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Internal product id (recovered from provider product metadata)
    pub product: String,

    /// Display name
    pub name: String,

    /// Unit price in decimal major units
    pub price: f64,

    /// Quantity
    pub quantity: u32,

    /// Image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payment confirmation echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Opaque payment reference id
    pub id: String,

    /// Payment status string as reported by the provider
    pub status: String,
}

/// Order data ready to be persisted. The store assigns the id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub items_price: f64,
    pub tax_amount: f64,
    pub shipping_amount: f64,
    pub total_amount: f64,
    pub payment_info: PaymentInfo,
    pub payment_method: String,
    /// Owning user id
    pub user: String,
}

/// A persisted order with a store-generated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub items_price: f64,
    pub tax_amount: f64,
    pub shipping_amount: f64,
    pub total_amount: f64,
    pub payment_info: PaymentInfo,
    pub payment_method: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Attach a generated id and creation timestamp to order data.
    pub fn from_new(data: NewOrder, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shipping_info: data.shipping_info,
            order_items: data.order_items,
            items_price: data.items_price,
            tax_amount: data.tax_amount,
            shipping_amount: data.shipping_amount,
            total_amount: data.total_amount,
            payment_info: data.payment_info,
            payment_method: data.payment_method,
            user: data.user,
            created_at: Utc::now(),
        }
    }
}
