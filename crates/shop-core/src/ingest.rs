//! # Webhook Ingestion
//!
//! Verifies a signed provider event and materializes an order from a
//! completed checkout session. Line items are not embedded in the event, so
//! reconstruction takes one provider call for the line-item list plus one
//! per-item product fetch; the product fetches run concurrently and results
//! recombine by position.

use crate::cart::ShippingInfo;
use crate::error::{PaymentError, PaymentResult};
use crate::order::{NewOrder, Order, OrderItem, PaymentInfo};
use crate::provider::BoxedPaymentProvider;
use crate::session::{CompletedSession, SessionLineItem, WebhookEventType};
use crate::store::BoxedOrderStore;
use futures_util::future::try_join_all;
use tracing::{info, instrument};

/// Payment method label recorded on every order from this flow.
const PAYMENT_METHOD_CARD: &str = "Card";

/// Ingests signed webhook events and persists orders for completed sessions.
pub struct WebhookIngestor {
    provider: BoxedPaymentProvider,
    orders: BoxedOrderStore,
}

impl WebhookIngestor {
    pub fn new(provider: BoxedPaymentProvider, orders: BoxedOrderStore) -> Self {
        Self { provider, orders }
    }

    /// Verify and process one raw event.
    ///
    /// Returns the persisted order for a completed-checkout event. Every
    /// other recognized event kind yields `UnsupportedEventType`, which the
    /// HTTP layer treats as an explicit no-op; verification and provider
    /// failures propagate typed. Persistence is the last step, so an order
    /// is created atomically or not at all.
    #[instrument(skip(self, payload, signature))]
    pub async fn ingest(&self, payload: &[u8], signature: &str) -> PaymentResult<Order> {
        let event = self.provider.verify_webhook(payload, signature).await?;

        if event.event_type != WebhookEventType::CheckoutCompleted {
            return Err(PaymentError::UnsupportedEventType {
                event_type: event.event_type.to_string(),
            });
        }

        let session = event.session.ok_or_else(|| {
            PaymentError::WebhookParseError(
                "completed event carries no session object".to_string(),
            )
        })?;

        let data = self.reconstruct_order(&session).await?;
        let order = self.orders.create(data).await?;

        info!(
            "Order {} created for session {} (total {})",
            order.id, session.session_id, order.total_amount
        );

        Ok(order)
    }

    /// Rebuild order data from the completed session: provider-echoed money,
    /// metadata-recovered shipping info and subtotal, and line items
    /// reconstructed through product lookups.
    async fn reconstruct_order(&self, session: &CompletedSession) -> PaymentResult<NewOrder> {
        let line_items = self.provider.list_line_items(&session.session_id).await?;

        let order_items =
            try_join_all(line_items.iter().map(|item| self.reconstruct_item(item))).await?;

        let user = session.client_reference_id.clone().ok_or_else(|| {
            PaymentError::WebhookParseError("session carries no client reference".to_string())
        })?;

        let payment_id = session.payment_intent.clone().ok_or_else(|| {
            PaymentError::WebhookParseError("session carries no payment reference".to_string())
        })?;

        let items_price = session
            .metadata
            .get(crate::checkout::ITEMS_PRICE_KEY)
            .and_then(|value| value.parse::<f64>().ok())
            .ok_or_else(|| {
                PaymentError::WebhookParseError("missing metadata field: itemsPrice".to_string())
            })?;

        Ok(NewOrder {
            shipping_info: ShippingInfo::from_metadata(&session.metadata)?,
            order_items,
            items_price,
            tax_amount: session.amount_tax as f64 / 100.0,
            shipping_amount: session.amount_shipping as f64 / 100.0,
            total_amount: session.amount_total as f64 / 100.0,
            payment_info: PaymentInfo {
                id: payment_id,
                status: session.payment_status.clone(),
            },
            payment_method: PAYMENT_METHOD_CARD.to_string(),
            user,
        })
    }

    /// Recover one order item: the internal product id and display
    /// attributes come from the provider product record, price and quantity
    /// from the line item.
    async fn reconstruct_item(&self, item: &SessionLineItem) -> PaymentResult<OrderItem> {
        let product = self.provider.retrieve_product(&item.product_ref).await?;

        let product_id = product.metadata.get("productId").cloned().ok_or_else(|| {
            PaymentError::WebhookParseError(format!(
                "product {} carries no productId metadata",
                product.provider_id
            ))
        })?;

        Ok(OrderItem {
            product: product_id,
            name: product.name,
            price: item.unit_amount_minor / 100.0,
            quantity: item.quantity,
            image: product.images.first().cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PaymentProvider;
    use crate::session::{
        CheckoutSession, CheckoutSessionRequest, ProviderProduct, WebhookEvent,
    };
    use crate::store::InMemoryOrderStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Test double: accepts the fixed signature "valid" and replays canned
    /// responses.
    struct CannedProvider {
        event: WebhookEvent,
        line_items: Vec<SessionLineItem>,
        products: HashMap<String, ProviderProduct>,
    }

    #[async_trait]
    impl PaymentProvider for CannedProvider {
        async fn create_checkout_session(
            &self,
            _request: &CheckoutSessionRequest,
        ) -> PaymentResult<CheckoutSession> {
            Err(PaymentError::InvalidRequest("not under test".to_string()))
        }

        async fn verify_webhook(
            &self,
            _payload: &[u8],
            signature: &str,
        ) -> PaymentResult<WebhookEvent> {
            if signature == "valid" {
                Ok(self.event.clone())
            } else {
                Err(PaymentError::WebhookVerificationFailed(
                    "Signature mismatch".to_string(),
                ))
            }
        }

        async fn list_line_items(
            &self,
            _session_id: &str,
        ) -> PaymentResult<Vec<SessionLineItem>> {
            Ok(self.line_items.clone())
        }

        async fn retrieve_product(&self, product_ref: &str) -> PaymentResult<ProviderProduct> {
            self.products.get(product_ref).cloned().ok_or_else(|| {
                PaymentError::ProviderError {
                    provider: "canned".to_string(),
                    message: format!("no such product: {}", product_ref),
                }
            })
        }

        fn provider_name(&self) -> &'static str {
            "canned"
        }
    }

    fn session_metadata() -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert("address".to_string(), "12 High Street".to_string());
        metadata.insert("city".to_string(), "Pune".to_string());
        metadata.insert("phoneNo".to_string(), "5550100".to_string());
        metadata.insert("zipCode".to_string(), "411001".to_string());
        metadata.insert("country".to_string(), "India".to_string());
        metadata.insert("itemsPrice".to_string(), "1480".to_string());
        metadata
    }

    fn completed_event() -> WebhookEvent {
        WebhookEvent {
            event_id: "evt_1".to_string(),
            event_type: WebhookEventType::CheckoutCompleted,
            session: Some(CompletedSession {
                session_id: "cs_1".to_string(),
                client_reference_id: Some("user-1".to_string()),
                customer_email: Some("buyer@example.com".to_string()),
                amount_total: 150000,
                amount_tax: 1200,
                amount_shipping: 800,
                payment_intent: Some("pi_1".to_string()),
                payment_status: "paid".to_string(),
                metadata: session_metadata(),
            }),
            timestamp: Utc::now(),
        }
    }

    fn product(provider_ref: &str, internal_id: &str, name: &str) -> ProviderProduct {
        let mut metadata = HashMap::new();
        metadata.insert("productId".to_string(), internal_id.to_string());
        ProviderProduct {
            provider_id: provider_ref.to_string(),
            name: name.to_string(),
            images: vec![format!("https://cdn.example.com/{}.png", internal_id)],
            metadata,
        }
    }

    fn canned_provider() -> CannedProvider {
        let mut products = HashMap::new();
        products.insert("prod_a".to_string(), product("prod_a", "p1", "Widget"));
        products.insert("prod_b".to_string(), product("prod_b", "p2", "Gadget"));

        CannedProvider {
            event: completed_event(),
            line_items: vec![
                SessionLineItem {
                    product_ref: "prod_a".to_string(),
                    unit_amount_minor: 500.0,
                    quantity: 2,
                },
                SessionLineItem {
                    product_ref: "prod_b".to_string(),
                    unit_amount_minor: 1200.0,
                    quantity: 1,
                },
            ],
            products,
        }
    }

    fn ingestor_with(
        provider: CannedProvider,
    ) -> (WebhookIngestor, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let ingestor = WebhookIngestor::new(Arc::new(provider), store.clone());
        (ingestor, store)
    }

    #[tokio::test]
    async fn test_completed_event_materializes_order() {
        let (ingestor, store) = ingestor_with(canned_provider());

        let order = ingestor.ingest(b"{}", "valid").await.unwrap();

        // provider totals divided by 100, subtotal recovered verbatim
        assert_eq!(order.total_amount, 1500.0);
        assert_eq!(order.tax_amount, 12.0);
        assert_eq!(order.shipping_amount, 8.0);
        assert_eq!(order.items_price, 1480.0);

        assert_eq!(order.user, "user-1");
        assert_eq!(order.payment_method, "Card");
        assert_eq!(order.payment_info.id, "pi_1");
        assert_eq!(order.payment_info.status, "paid");
        assert_eq!(order.shipping_info.city, "Pune");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_order_items_reconstructed_by_position() {
        let (ingestor, _store) = ingestor_with(canned_provider());

        let order = ingestor.ingest(b"{}", "valid").await.unwrap();

        assert_eq!(order.order_items.len(), 2);
        assert_eq!(order.order_items[0].product, "p1");
        assert_eq!(order.order_items[0].price, 5.0);
        assert_eq!(order.order_items[0].quantity, 2);
        assert_eq!(order.order_items[0].name, "Widget");
        assert_eq!(
            order.order_items[0].image.as_deref(),
            Some("https://cdn.example.com/p1.png")
        );
        assert_eq!(order.order_items[1].product, "p2");
        assert_eq!(order.order_items[1].price, 12.0);
        assert_eq!(order.order_items[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_bad_signature_creates_no_order() {
        let (ingestor, store) = ingestor_with(canned_provider());

        let result = ingestor.ingest(b"{}", "forged").await;

        assert!(matches!(
            result,
            Err(PaymentError::WebhookVerificationFailed(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_other_event_kinds_create_no_order() {
        let mut provider = canned_provider();
        provider.event = WebhookEvent {
            event_id: "evt_2".to_string(),
            event_type: WebhookEventType::PaymentSucceeded,
            session: None,
            timestamp: Utc::now(),
        };
        let (ingestor, store) = ingestor_with(provider);

        let result = ingestor.ingest(b"{}", "valid").await;

        assert!(matches!(
            result,
            Err(PaymentError::UnsupportedEventType { .. })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_metadata_aborts() {
        let mut provider = canned_provider();
        provider
            .products
            .get_mut("prod_a")
            .unwrap()
            .metadata
            .clear();
        let (ingestor, store) = ingestor_with(provider);

        let result = ingestor.ingest(b"{}", "valid").await;

        assert!(matches!(result, Err(PaymentError::WebhookParseError(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_product_fetch_aborts_whole_request() {
        let mut provider = canned_provider();
        provider.products.remove("prod_b");
        let (ingestor, store) = ingestor_with(provider);

        let result = ingestor.ingest(b"{}", "valid").await;

        assert!(matches!(result, Err(PaymentError::ProviderError { .. })));
        assert!(store.is_empty());
    }
}
