//! # Order Store
//!
//! Persistence boundary for materialized orders. The surrounding application
//! supplies the real store; the in-memory implementation backs the default
//! binary and tests.

use crate::error::PaymentResult;
use crate::order::{NewOrder, Order};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Persistence collaborator. One operation is consumed: create.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist order data, returning the stored order with its generated id.
    async fn create(&self, order: NewOrder) -> PaymentResult<Order>;
}

/// Type alias for a shared order store (dynamic dispatch)
pub type BoxedOrderStore = Arc<dyn OrderStore>;

/// In-memory order store.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored orders
    pub fn all(&self) -> Vec<Order> {
        self.orders.lock().expect("order store lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().expect("order store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> PaymentResult<Order> {
        let stored = Order::from_new(order, Uuid::new_v4().to_string());
        self.orders
            .lock()
            .expect("order store lock poisoned")
            .push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ShippingInfo;
    use crate::order::PaymentInfo;

    fn sample_order() -> NewOrder {
        NewOrder {
            shipping_info: ShippingInfo {
                address: "12 High Street".to_string(),
                city: "Pune".to_string(),
                phone_no: "5550100".to_string(),
                zip_code: "411001".to_string(),
                country: "India".to_string(),
            },
            order_items: Vec::new(),
            items_price: 0.0,
            tax_amount: 0.0,
            shipping_amount: 0.0,
            total_amount: 0.0,
            payment_info: PaymentInfo {
                id: "pi_1".to_string(),
                status: "paid".to_string(),
            },
            payment_method: "Card".to_string(),
            user: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = InMemoryOrderStore::new();
        let order = store.create(sample_order()).await.unwrap();

        assert!(!order.id.is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id, order.id);
    }

    #[tokio::test]
    async fn test_create_is_append_only() {
        let store = InMemoryOrderStore::new();
        let first = store.create(sample_order()).await.unwrap();
        let second = store.create(sample_order()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);
    }
}
