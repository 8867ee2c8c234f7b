//! # Cart Types
//!
//! The inbound checkout payload: cart items, shipping details, and the
//! items subtotal computed by the storefront. Field names on the wire are
//! camelCase to match the storefront API contract.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single item in the cart, as submitted by the storefront.
///
/// Prices here are client-supplied display values. They are forwarded to the
/// provider's hosted checkout but never trusted for the persisted order
/// totals, which come back from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Internal product identifier
    pub product: String,

    /// Display name
    pub name: String,

    /// Image URL
    pub image: String,

    /// Unit price in decimal major currency units
    pub price: f64,

    /// Quantity
    pub quantity: u32,
}

/// Shipping details, round-tripped opaquely through session metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub phone_no: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Flatten into the session metadata bag.
    ///
    /// Keys mirror the wire field names so the webhook can recover the
    /// structure field-for-field.
    pub fn write_metadata(&self, metadata: &mut HashMap<String, String>) {
        metadata.insert("address".to_string(), self.address.clone());
        metadata.insert("city".to_string(), self.city.clone());
        metadata.insert("phoneNo".to_string(), self.phone_no.clone());
        metadata.insert("zipCode".to_string(), self.zip_code.clone());
        metadata.insert("country".to_string(), self.country.clone());
    }

    /// Recover shipping details from echoed session metadata.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> PaymentResult<Self> {
        let field = |key: &str| -> PaymentResult<String> {
            metadata.get(key).cloned().ok_or_else(|| {
                PaymentError::WebhookParseError(format!("missing metadata field: {}", key))
            })
        };

        Ok(Self {
            address: field("address")?,
            city: field("city")?,
            phone_no: field("phoneNo")?,
            zip_code: field("zipCode")?,
            country: field("country")?,
        })
    }
}

/// The full checkout request body from the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Items to purchase
    pub order_items: Vec<CartItem>,

    /// Shipping details
    pub shipping_info: ShippingInfo,

    /// Items subtotal in decimal major units, as computed by the storefront
    pub items_price: f64,
}

/// Authenticated caller identity, supplied by the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutUser {
    /// Internal user id (string form, carried as the session client reference)
    pub id: String,

    /// Email used to prefill the hosted checkout
    pub email: String,
}
