//! Authoritative price and stock collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CheckoutId, Money, ProductId, StoreId};
use thiserror::Error;

/// Errors raised by the inventory collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The store does not exist or is not accepting orders.
    #[error("Store {0} is not active")]
    StoreInactive(StoreId),

    /// The store does not carry this product.
    #[error("Store {store_id} does not carry product {product_id}")]
    UnknownProduct {
        store_id: StoreId,
        product_id: ProductId,
    },

    /// Not enough unreserved stock to satisfy the request.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The inventory backend itself failed.
    #[error("Inventory backend error: {0}")]
    Backend(String),
}

/// The authoritative view of one product at one store.
///
/// Unit price and weight always come from here, never from the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductOffer {
    /// Authoritative unit price.
    pub unit_price: Money,
    /// Units on hand minus all outstanding holds.
    pub available: u32,
    /// Shipping weight of one unit, in kilograms.
    pub unit_weight_kg: f64,
}

/// Trait for authoritative price and stock operations.
///
/// Reserve and release are keyed by `(checkout, store, product)` and are
/// individually idempotent, so the coordinator may safely retry either.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Returns whether the store exists and accepts orders.
    async fn store_active(&self, store_id: StoreId) -> Result<bool, InventoryError>;

    /// Looks up the authoritative offer for one product.
    async fn offer(
        &self,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<ProductOffer, InventoryError>;

    /// Places a hold on stock for one cart line.
    async fn reserve(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), InventoryError>;

    /// Releases a hold. Releasing an absent hold is a no-op.
    async fn release(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<(), InventoryError>;

    /// Converts a hold into a permanent stock decrement.
    /// Committing an absent hold is a no-op.
    async fn commit(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<(), InventoryError>;
}

#[derive(Debug, Clone)]
struct StockRecord {
    unit_price: Money,
    unit_weight_kg: f64,
    on_hand: u32,
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    stores: HashMap<StoreId, bool>,
    stock: HashMap<(StoreId, ProductId), StockRecord>,
    holds: HashMap<(CheckoutId, StoreId, ProductId), u32>,
    fail_on_release: bool,
}

impl InMemoryInventoryState {
    fn held_units(&self, store_id: StoreId, product_id: &ProductId) -> u32 {
        self.holds
            .iter()
            .filter(|((_, sid, pid), _)| *sid == store_id && pid == product_id)
            .map(|(_, qty)| qty)
            .sum()
    }
}

/// In-memory inventory service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates a new in-memory inventory service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active store.
    pub fn register_store(&self, store_id: StoreId) {
        self.state.write().unwrap().stores.insert(store_id, true);
    }

    /// Marks a store as no longer accepting orders.
    pub fn deactivate_store(&self, store_id: StoreId) {
        self.state.write().unwrap().stores.insert(store_id, false);
    }

    /// Stocks a product at a store.
    pub fn add_product(
        &self,
        store_id: StoreId,
        product_id: impl Into<ProductId>,
        unit_price: Money,
        unit_weight_kg: f64,
        on_hand: u32,
    ) {
        self.state.write().unwrap().stock.insert(
            (store_id, product_id.into()),
            StockRecord {
                unit_price,
                unit_weight_kg,
                on_hand,
            },
        );
    }

    /// Configures the service to fail on the next release calls.
    pub fn set_fail_on_release(&self, fail: bool) {
        self.state.write().unwrap().fail_on_release = fail;
    }

    /// Returns units on hand, ignoring holds.
    pub fn on_hand(&self, store_id: StoreId, product_id: &ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .stock
            .get(&(store_id, product_id.clone()))
            .map(|record| record.on_hand)
    }

    /// Returns the number of outstanding holds.
    pub fn hold_count(&self) -> usize {
        self.state.read().unwrap().holds.len()
    }

    /// Returns true if a hold exists for the given key.
    pub fn has_hold(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> bool {
        self.state
            .read()
            .unwrap()
            .holds
            .contains_key(&(checkout_id, store_id, product_id.clone()))
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn store_active(&self, store_id: StoreId) -> Result<bool, InventoryError> {
        let state = self.state.read().unwrap();
        Ok(state.stores.get(&store_id).copied().unwrap_or(false))
    }

    async fn offer(
        &self,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<ProductOffer, InventoryError> {
        let state = self.state.read().unwrap();

        if !state.stores.get(&store_id).copied().unwrap_or(false) {
            return Err(InventoryError::StoreInactive(store_id));
        }
        let record = state
            .stock
            .get(&(store_id, product_id.clone()))
            .ok_or_else(|| InventoryError::UnknownProduct {
                store_id,
                product_id: product_id.clone(),
            })?;

        let held = state.held_units(store_id, product_id);
        Ok(ProductOffer {
            unit_price: record.unit_price,
            available: record.on_hand.saturating_sub(held),
            unit_weight_kg: record.unit_weight_kg,
        })
    }

    async fn reserve(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        let mut state = self.state.write().unwrap();

        let key = (checkout_id, store_id, product_id.clone());
        if state.holds.contains_key(&key) {
            // Retry of an already-placed hold.
            return Ok(());
        }

        if !state.stores.get(&store_id).copied().unwrap_or(false) {
            return Err(InventoryError::StoreInactive(store_id));
        }
        let on_hand = state
            .stock
            .get(&(store_id, product_id.clone()))
            .map(|record| record.on_hand)
            .ok_or_else(|| InventoryError::UnknownProduct {
                store_id,
                product_id: product_id.clone(),
            })?;

        let available = on_hand.saturating_sub(state.held_units(store_id, product_id));
        if quantity > available {
            return Err(InventoryError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available,
            });
        }

        state.holds.insert(key, quantity);
        Ok(())
    }

    async fn release(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<(), InventoryError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_release {
            return Err(InventoryError::Backend("release refused".to_string()));
        }

        state
            .holds
            .remove(&(checkout_id, store_id, product_id.clone()));
        Ok(())
    }

    async fn commit(
        &self,
        checkout_id: CheckoutId,
        store_id: StoreId,
        product_id: &ProductId,
    ) -> Result<(), InventoryError> {
        let mut state = self.state.write().unwrap();

        let Some(quantity) = state
            .holds
            .remove(&(checkout_id, store_id, product_id.clone()))
        else {
            return Ok(());
        };
        if let Some(record) = state.stock.get_mut(&(store_id, product_id.clone())) {
            record.on_hand = record.on_hand.saturating_sub(quantity);
        }
        Ok(())
    }
}
