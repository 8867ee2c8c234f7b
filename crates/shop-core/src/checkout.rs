//! # Checkout Session Creation
//!
//! Translates a storefront cart into a provider session-creation request and
//! returns the hosted redirect URL. Pure translation plus one provider call;
//! nothing is persisted at this stage.

use crate::cart::{Cart, CheckoutUser};
use crate::error::{PaymentError, PaymentResult};
use crate::money::Currency;
use crate::provider::BoxedPaymentProvider;
use crate::session::{CheckoutSession, CheckoutSessionRequest, LineItemSpec};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Metadata key used to round-trip the items subtotal through the provider.
pub const ITEMS_PRICE_KEY: &str = "itemsPrice";

/// Checkout configuration: currency, redirect base, and the shipping-rate
/// threshold rule. Rate identifiers are opaque references to provider-side
/// shipping rate objects.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    /// Currency applied to every line item
    pub currency: Currency,

    /// Storefront base URL for success/cancel redirects
    pub frontend_url: String,

    /// Subtotal at or above which the free rate applies
    pub free_shipping_threshold: f64,

    /// Rate applied at or above the threshold
    pub free_shipping_rate: String,

    /// Rate applied below the threshold
    pub standard_shipping_rate: String,
}

impl CheckoutPolicy {
    pub fn new(
        currency: Currency,
        frontend_url: impl Into<String>,
        free_shipping_threshold: f64,
        free_shipping_rate: impl Into<String>,
        standard_shipping_rate: impl Into<String>,
    ) -> Self {
        Self {
            currency,
            frontend_url: frontend_url.into(),
            free_shipping_threshold,
            free_shipping_rate: free_shipping_rate.into(),
            standard_shipping_rate: standard_shipping_rate.into(),
        }
    }

    /// Threshold rule on the items subtotal. The boundary value gets the
    /// free rate.
    pub fn shipping_rate_for(&self, items_price: f64) -> &str {
        if items_price >= self.free_shipping_threshold {
            &self.free_shipping_rate
        } else {
            &self.standard_shipping_rate
        }
    }

    /// Redirect target after a successful payment
    pub fn success_url(&self) -> String {
        format!("{}/me/orders?order_success=true", self.frontend_url)
    }

    /// Redirect target if the customer backs out
    pub fn cancel_url(&self) -> String {
        self.frontend_url.clone()
    }
}

/// Creates hosted checkout sessions from storefront carts.
pub struct CheckoutSessionCreator {
    policy: CheckoutPolicy,
    provider: BoxedPaymentProvider,
}

impl CheckoutSessionCreator {
    pub fn new(policy: CheckoutPolicy, provider: BoxedPaymentProvider) -> Self {
        Self { policy, provider }
    }

    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Build the session-creation request. Pure translation: line items get
    /// the configured currency and minor-unit amounts, the metadata bag
    /// carries the shipping details and subtotal for the webhook to recover,
    /// and the client reference ties the session to the user.
    pub fn build_session_request(
        &self,
        cart: &Cart,
        user: &CheckoutUser,
    ) -> PaymentResult<CheckoutSessionRequest> {
        if cart.order_items.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Cart has no items".to_string(),
            ));
        }

        let line_items = cart
            .order_items
            .iter()
            .map(|item| LineItemSpec {
                product_id: item.product.clone(),
                name: item.name.clone(),
                image: item.image.clone(),
                unit_amount: self.policy.currency.to_minor_units(item.price),
                quantity: item.quantity,
            })
            .collect();

        let mut metadata = HashMap::new();
        cart.shipping_info.write_metadata(&mut metadata);
        // Stringified so the webhook recovers it verbatim, not recomputed
        metadata.insert(ITEMS_PRICE_KEY.to_string(), format!("{}", cart.items_price));

        Ok(CheckoutSessionRequest {
            currency: self.policy.currency,
            line_items,
            success_url: self.policy.success_url(),
            cancel_url: self.policy.cancel_url(),
            customer_email: user.email.clone(),
            client_reference_id: user.id.clone(),
            metadata,
            shipping_rate: self.policy.shipping_rate_for(cart.items_price).to_string(),
        })
    }

    /// Create a hosted session for the cart and return it. Provider failures
    /// propagate typed; there is no retry and no partial state.
    #[instrument(skip(self, cart, user), fields(user_id = %user.id, items = cart.order_items.len()))]
    pub async fn create(&self, cart: &Cart, user: &CheckoutUser) -> PaymentResult<CheckoutSession> {
        let request = self.build_session_request(cart, user)?;
        let session = self.provider.create_checkout_session(&request).await?;

        info!(
            "Created checkout session: id={}, provider={}",
            session.session_id,
            self.provider.provider_name()
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, ShippingInfo};
    use crate::session::{ProviderProduct, SessionLineItem, WebhookEvent};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullProvider;

    #[async_trait]
    impl crate::provider::PaymentProvider for NullProvider {
        async fn create_checkout_session(
            &self,
            _request: &CheckoutSessionRequest,
        ) -> PaymentResult<CheckoutSession> {
            Ok(CheckoutSession {
                session_id: "cs_test_1".to_string(),
                url: "https://checkout.example.com/cs_test_1".to_string(),
            })
        }

        async fn verify_webhook(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> PaymentResult<WebhookEvent> {
            Err(PaymentError::WebhookVerificationFailed("unused".to_string()))
        }

        async fn list_line_items(
            &self,
            _session_id: &str,
        ) -> PaymentResult<Vec<SessionLineItem>> {
            Ok(Vec::new())
        }

        async fn retrieve_product(&self, _product_ref: &str) -> PaymentResult<ProviderProduct> {
            Err(PaymentError::ProviderError {
                provider: "null".to_string(),
                message: "unused".to_string(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "null"
        }
    }

    fn creator_with_threshold(threshold: f64) -> CheckoutSessionCreator {
        let policy = CheckoutPolicy::new(
            Currency::USD,
            "https://shop.example.com",
            threshold,
            "rate_free",
            "rate_standard",
        );
        CheckoutSessionCreator::new(policy, Arc::new(NullProvider))
    }

    fn sample_cart(items_price: f64) -> Cart {
        Cart {
            order_items: vec![
                CartItem {
                    product: "p1".to_string(),
                    name: "Widget".to_string(),
                    image: "https://cdn.example.com/w.png".to_string(),
                    price: 49.99,
                    quantity: 2,
                },
                CartItem {
                    product: "p2".to_string(),
                    name: "Gadget".to_string(),
                    image: "https://cdn.example.com/g.png".to_string(),
                    price: 12.5,
                    quantity: 1,
                },
            ],
            shipping_info: ShippingInfo {
                address: "12 High Street".to_string(),
                city: "Pune".to_string(),
                phone_no: "5550100".to_string(),
                zip_code: "411001".to_string(),
                country: "India".to_string(),
            },
            items_price,
        }
    }

    fn sample_user() -> CheckoutUser {
        CheckoutUser {
            id: "user-1".to_string(),
            email: "buyer@example.com".to_string(),
        }
    }

    #[test]
    fn test_line_items_map_one_to_one() {
        let creator = creator_with_threshold(200.0);
        let request = creator
            .build_session_request(&sample_cart(112.48), &sample_user())
            .unwrap();

        assert_eq!(request.line_items.len(), 2);
        assert_eq!(request.line_items[0].unit_amount, 4999);
        assert_eq!(request.line_items[0].quantity, 2);
        assert_eq!(request.line_items[0].product_id, "p1");
        assert_eq!(request.line_items[1].unit_amount, 1250);
        assert_eq!(request.line_items[1].quantity, 1);
    }

    #[test]
    fn test_shipping_rate_threshold() {
        let creator = creator_with_threshold(200.0);

        let below = creator
            .build_session_request(&sample_cart(199.99), &sample_user())
            .unwrap();
        assert_eq!(below.shipping_rate, "rate_standard");

        // boundary: exactly at the threshold gets the free rate
        let boundary = creator
            .build_session_request(&sample_cart(200.0), &sample_user())
            .unwrap();
        assert_eq!(boundary.shipping_rate, "rate_free");

        let above = creator
            .build_session_request(&sample_cart(350.0), &sample_user())
            .unwrap();
        assert_eq!(above.shipping_rate, "rate_free");
    }

    #[test]
    fn test_metadata_carries_shipping_and_subtotal() {
        let creator = creator_with_threshold(200.0);
        let cart = sample_cart(200.0);
        let request = creator.build_session_request(&cart, &sample_user()).unwrap();

        let recovered = ShippingInfo::from_metadata(&request.metadata).unwrap();
        assert_eq!(recovered, cart.shipping_info);
        assert_eq!(request.metadata.get(ITEMS_PRICE_KEY).unwrap(), "200");
    }

    #[test]
    fn test_user_identity_on_request() {
        let creator = creator_with_threshold(200.0);
        let request = creator
            .build_session_request(&sample_cart(50.0), &sample_user())
            .unwrap();

        assert_eq!(request.client_reference_id, "user-1");
        assert_eq!(request.customer_email, "buyer@example.com");
        assert_eq!(
            request.success_url,
            "https://shop.example.com/me/orders?order_success=true"
        );
        assert_eq!(request.cancel_url, "https://shop.example.com");
    }

    #[test]
    fn test_empty_cart_rejected() {
        let creator = creator_with_threshold(200.0);
        let mut cart = sample_cart(0.0);
        cart.order_items.clear();

        let result = creator.build_session_request(&cart, &sample_user());
        assert!(matches!(result, Err(PaymentError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_create_returns_session_url() {
        let creator = creator_with_threshold(200.0);
        let session = creator
            .create(&sample_cart(50.0), &sample_user())
            .await
            .unwrap();

        assert_eq!(session.url, "https://checkout.example.com/cs_test_1");
    }
}
