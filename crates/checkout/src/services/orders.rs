//! Order persistence collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;

use crate::order::Order;

/// Errors raised by the order store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderStoreError {
    /// An order with this ID already exists.
    #[error("Order {0} already exists")]
    Duplicate(OrderId),

    /// The storage backend itself failed.
    #[error("Order store backend error: {0}")]
    Backend(String),
}

/// Trait for order persistence operations.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: Order) -> Result<(), OrderStoreError>;

    /// Looks up an order by ID.
    async fn find(&self, order_id: OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Removes an order, typically to unwind a failed commit. Removing
    /// an unknown ID is a no-op.
    async fn remove(&self, order_id: OrderId) -> Result<(), OrderStoreError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderStoreState {
    orders: HashMap<OrderId, Order>,
    fail_on_insert: bool,
    insert_budget: Option<u32>,
}

/// In-memory order store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryOrderStoreState>>,
}

impl InMemoryOrderStore {
    /// Creates a new in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail on the next insert calls.
    pub fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert = fail;
    }

    /// Accepts the next `count` inserts, then refuses the rest.
    pub fn accept_only(&self, count: u32) {
        self.state.write().unwrap().insert_budget = Some(count);
    }

    /// Returns the number of persisted orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), OrderStoreError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_insert {
            return Err(OrderStoreError::Backend("insert refused".to_string()));
        }
        if let Some(budget) = state.insert_budget.as_mut() {
            if *budget == 0 {
                return Err(OrderStoreError::Backend("insert refused".to_string()));
            }
            *budget -= 1;
        }
        if state.orders.contains_key(&order.order_id()) {
            return Err(OrderStoreError::Duplicate(order.order_id()));
        }

        state.orders.insert(order.order_id(), order);
        Ok(())
    }

    async fn find(&self, order_id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        let state = self.state.read().unwrap();
        Ok(state.orders.get(&order_id).cloned())
    }

    async fn remove(&self, order_id: OrderId) -> Result<(), OrderStoreError> {
        self.state.write().unwrap().orders.remove(&order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buyer::BuyerIdentity;
    use common::{Money, ProductId, StoreId};
    use std::collections::BTreeMap;

    fn sample_order() -> Order {
        let mut products = BTreeMap::new();
        products.insert(ProductId::from("sku-1"), 1);
        Order::new(
            StoreId::new(),
            BuyerIdentity::Guest {
                contact_email: "visitor@example.com".to_string(),
            },
            products,
            Money::from_dollars(10),
            10_042,
            "TRACK-0001",
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let order_id = order.order_id();

        store.insert(order).await.unwrap();
        assert_eq!(store.order_count(), 1);

        let found = store.find(order_id).await.unwrap().unwrap();
        assert_eq!(found.order_id(), order_id);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.find(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let order_id = order.order_id();

        store.insert(order.clone()).await.unwrap();
        let err = store.insert(order).await.unwrap_err();
        assert_eq!(err, OrderStoreError::Duplicate(order_id));
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_insert() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_insert(true);

        let err = store.insert(sample_order()).await.unwrap_err();
        assert!(matches!(err, OrderStoreError::Backend(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_accept_only_budget() {
        let store = InMemoryOrderStore::new();
        store.accept_only(1);

        store.insert(sample_order()).await.unwrap();
        let err = store.insert(sample_order()).await.unwrap_err();
        assert!(matches!(err, OrderStoreError::Backend(_)));
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let order_id = order.order_id();
        store.insert(order).await.unwrap();

        store.remove(order_id).await.unwrap();
        assert_eq!(store.order_count(), 0);
        // Removing again is a no-op.
        store.remove(order_id).await.unwrap();
    }
}
