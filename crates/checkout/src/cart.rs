//! Cart snapshot taken at the start of a checkout.

use std::collections::BTreeMap;

use common::{ProductId, StoreId};
use serde::{Deserialize, Serialize};

/// The goods from one store inside a cart.
///
/// Items are keyed by product and carry the requested quantity. The
/// map is ordered so iteration, pricing, and reservation always walk
/// products in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    store_id: StoreId,
    items: BTreeMap<ProductId, u32>,
}

impl Basket {
    /// Creates an empty basket for a store.
    pub fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            items: BTreeMap::new(),
        }
    }

    /// Adds an item, accumulating quantity if the product repeats.
    pub fn with_item(mut self, product_id: impl Into<ProductId>, quantity: u32) -> Self {
        *self.items.entry(product_id.into()).or_insert(0) += quantity;
        self
    }

    /// The store this basket belongs to.
    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    /// Iterates items in product order.
    pub fn items(&self) -> impl Iterator<Item = (&ProductId, u32)> {
        self.items.iter().map(|(product, quantity)| (product, *quantity))
    }

    /// Number of distinct products.
    pub fn product_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all products.
    pub fn total_units(&self) -> u32 {
        self.items.values().sum()
    }

    /// True when the basket holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items map, for building an order.
    pub fn items_map(&self) -> &BTreeMap<ProductId, u32> {
        &self.items
    }
}

/// One flattened cart position: a product quantity within a store.
///
/// Reservation, release, and commit calls all operate on lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub store_id: StoreId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Immutable snapshot of the cart a checkout runs against.
///
/// Baskets keep their given order; every per-basket output of the
/// checkout (orders, shipments) is aligned with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    baskets: Vec<Basket>,
}

impl CartSnapshot {
    /// Creates a snapshot from baskets in checkout order.
    pub fn new(baskets: Vec<Basket>) -> Self {
        Self { baskets }
    }

    /// The baskets in checkout order.
    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    /// Number of baskets.
    pub fn basket_count(&self) -> usize {
        self.baskets.len()
    }

    /// True when the cart holds no baskets at all.
    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }

    /// Flattens the cart into lines, basket order first, product order
    /// within each basket.
    pub fn lines(&self) -> Vec<CartLine> {
        self.baskets
            .iter()
            .flat_map(|basket| {
                basket.items().map(|(product_id, quantity)| CartLine {
                    store_id: basket.store_id(),
                    product_id: product_id.clone(),
                    quantity,
                })
            })
            .collect()
    }
}
