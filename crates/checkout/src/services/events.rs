//! Fire-and-forget notification of committed checkouts.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CheckoutId, Money, OrderId};
use serde::{Deserialize, Serialize};

/// Notification emitted once per committed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommitted {
    /// The checkout attempt that committed.
    pub checkout_id: CheckoutId,
    /// Created order IDs, in basket order.
    pub order_ids: Vec<OrderId>,
    /// The single charge's transaction ID.
    pub payment_transaction_id: i64,
    /// The charged total.
    pub total_amount: Money,
    /// When the checkout committed.
    pub committed_at: DateTime<Utc>,
}

impl OrderCommitted {
    /// Creates a notification stamped with the current time.
    pub fn new(
        checkout_id: CheckoutId,
        order_ids: Vec<OrderId>,
        payment_transaction_id: i64,
        total_amount: Money,
    ) -> Self {
        Self {
            checkout_id,
            order_ids,
            payment_transaction_id,
            total_amount,
            committed_at: Utc::now(),
        }
    }
}

/// Trait for publishing committed-checkout notifications downstream.
///
/// Publishing is fire-and-forget: implementations must not fail the
/// checkout, whatever happens to the notification.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one notification.
    async fn publish(&self, event: OrderCommitted);
}

/// In-memory publisher that captures notifications for assertions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    published: Arc<RwLock<Vec<OrderCommitted>>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of captured notifications.
    pub fn published_count(&self) -> usize {
        self.published.read().unwrap().len()
    }

    /// Returns a copy of the captured notifications, in publish order.
    pub fn published(&self) -> Vec<OrderCommitted> {
        self.published.read().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: OrderCommitted) {
        self.published.write().unwrap().push(event);
    }
}

/// Publisher that writes each notification to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    /// Creates a new logging publisher.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: OrderCommitted) {
        tracing::info!(
            checkout_id = %event.checkout_id,
            orders = event.order_ids.len(),
            payment_transaction_id = event.payment_transaction_id,
            total = %event.total_amount,
            "order committed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_publisher_captures_events() {
        let publisher = InMemoryEventPublisher::new();
        let checkout_id = CheckoutId::new();

        publisher
            .publish(OrderCommitted::new(
                checkout_id,
                vec![OrderId::new()],
                10_042,
                Money::from_dollars(25),
            ))
            .await;

        assert_eq!(publisher.published_count(), 1);
        let events = publisher.published();
        assert_eq!(events[0].checkout_id, checkout_id);
        assert_eq!(events[0].payment_transaction_id, 10_042);
    }
}
