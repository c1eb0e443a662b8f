//! Order records produced at commit time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, StoreId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buyer::BuyerIdentity;

/// The status of a committed order.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Completed
///           └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been created but not yet confirmed.
    #[default]
    Pending,

    /// Order is confirmed and fulfilled (terminal state).
    Completed,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by order status transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("invalid transition: cannot {action} an order in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: OrderStatus,
    },
}

/// One store's committed order for a checkout.
///
/// Orders come into existence only after the charge and every shipment
/// for the checkout have succeeded. Apart from the status transition
/// they are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    order_id: OrderId,
    store_id: StoreId,
    buyer: BuyerIdentity,
    products: BTreeMap<ProductId, u32>,
    total_price: Money,
    final_price: Money,
    order_date: DateTime<Utc>,
    status: OrderStatus,
    payment_transaction_id: i64,
    delivery_handle: String,
}

impl Order {
    /// Creates a pending order for one basket.
    pub fn new(
        store_id: StoreId,
        buyer: BuyerIdentity,
        products: BTreeMap<ProductId, u32>,
        total_price: Money,
        payment_transaction_id: i64,
        delivery_handle: impl Into<String>,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            store_id,
            buyer,
            products,
            total_price,
            // No discount policy applies at commit time.
            final_price: total_price,
            order_date: Utc::now(),
            status: OrderStatus::Pending,
            payment_transaction_id,
            delivery_handle: delivery_handle.into(),
        }
    }

    /// Marks the order completed.
    pub fn complete(&mut self) -> Result<(), OrderError> {
        if !self.status.can_complete() {
            return Err(OrderError::InvalidTransition {
                action: "complete",
                status: self.status,
            });
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }

    /// Marks the order cancelled.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidTransition {
                action: "cancel",
                status: self.status,
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn buyer(&self) -> &BuyerIdentity {
        &self.buyer
    }

    pub fn products(&self) -> &BTreeMap<ProductId, u32> {
        &self.products
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn final_price(&self) -> Money {
        self.final_price
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_transaction_id(&self) -> i64 {
        self.payment_transaction_id
    }

    pub fn delivery_handle(&self) -> &str {
        &self.delivery_handle
    }
}
