//! Checkout saga instance.

use common::{CheckoutId, Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::error::CheckoutFailureKind;
use crate::events::{
    CheckoutSagaEvent, CompensationLegSettledData, ShipmentBookedData, ShipmentFailedData,
};
use crate::state::CheckoutState;

/// One checkout attempt, rebuilt by folding its journal.
///
/// The coordinator records an event for every step outcome; the instance
/// keeps the journal alongside the folded view so a failed checkout can be
/// inspected leg by leg afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSaga {
    checkout_id: Option<CheckoutId>,
    state: CheckoutState,
    basket_count: usize,
    total: Option<Money>,
    reserved_lines: Vec<CartLine>,
    payment_transaction_id: Option<i64>,
    booked_shipments: Vec<ShipmentBookedData>,
    failed_shipments: Vec<ShipmentFailedData>,
    compensation_legs: Vec<CompensationLegSettledData>,
    order_ids: Vec<OrderId>,
    failure_kind: Option<CheckoutFailureKind>,
    failure_reason: Option<String>,
    journal: Vec<CheckoutSagaEvent>,
}

impl CheckoutSaga {
    /// Creates an empty saga instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an instance by folding a journal in order.
    pub fn replay(events: impl IntoIterator<Item = CheckoutSagaEvent>) -> Self {
        let mut saga = Self::default();
        for event in events {
            saga.record(event);
        }
        saga
    }

    /// Appends an event to the journal and applies it to the folded view.
    pub fn record(&mut self, event: CheckoutSagaEvent) {
        self.journal.push(event.clone());
        self.apply(event);
    }

    fn apply(&mut self, event: CheckoutSagaEvent) {
        match event {
            CheckoutSagaEvent::CheckoutStarted(data) => {
                self.checkout_id = Some(data.checkout_id);
                self.basket_count = data.basket_count;
                self.state = CheckoutState::Initiated;
            }
            CheckoutSagaEvent::CartValidated(data) => {
                self.total = Some(data.total);
                self.state = CheckoutState::Validated;
            }
            CheckoutSagaEvent::StockReserved(data) => {
                self.reserved_lines = data.lines;
            }
            CheckoutSagaEvent::ChargeRequested(_) => {
                self.state = CheckoutState::PaymentPending;
            }
            CheckoutSagaEvent::ChargeSucceeded(data) => {
                self.payment_transaction_id = Some(data.transaction_id);
                self.state = CheckoutState::Paid;
            }
            CheckoutSagaEvent::ShipmentsRequested(_) => {
                self.state = CheckoutState::SupplyPending;
            }
            CheckoutSagaEvent::ShipmentBooked(data) => {
                self.booked_shipments.push(data);
            }
            CheckoutSagaEvent::ShipmentFailed(data) => {
                self.failed_shipments.push(data);
            }
            CheckoutSagaEvent::CompensationStarted(_) => {
                self.state = CheckoutState::Compensating;
            }
            CheckoutSagaEvent::CompensationLegSettled(data) => {
                self.compensation_legs.push(data);
            }
            CheckoutSagaEvent::CheckoutCommitted(data) => {
                self.order_ids = data.order_ids;
                self.state = CheckoutState::Committed;
            }
            CheckoutSagaEvent::CheckoutFailed(data) => {
                self.failure_kind = Some(data.kind);
                self.failure_reason = Some(data.message);
                self.state = CheckoutState::Failed;
            }
        }
    }
}

// Query methods
impl CheckoutSaga {
    /// Returns the saga state.
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Returns the checkout attempt ID.
    pub fn checkout_id(&self) -> Option<CheckoutId> {
        self.checkout_id
    }

    /// Returns how many baskets the cart held.
    pub fn basket_count(&self) -> usize {
        self.basket_count
    }

    /// Returns the authoritative total, once priced.
    pub fn total(&self) -> Option<Money> {
        self.total
    }

    /// Returns the reserved cart lines.
    pub fn reserved_lines(&self) -> &[CartLine] {
        &self.reserved_lines
    }

    /// Returns the payment transaction ID, once charged.
    pub fn payment_transaction_id(&self) -> Option<i64> {
        self.payment_transaction_id
    }

    /// Returns the successfully booked shipment legs.
    pub fn booked_shipments(&self) -> &[ShipmentBookedData] {
        &self.booked_shipments
    }

    /// Returns the failed shipment legs.
    pub fn failed_shipments(&self) -> &[ShipmentFailedData] {
        &self.failed_shipments
    }

    /// Returns the settled compensation legs.
    pub fn compensation_legs(&self) -> &[CompensationLegSettledData] {
        &self.compensation_legs
    }

    /// Returns true when every settled compensation leg was cancelled.
    pub fn compensation_fully_cancelled(&self) -> bool {
        self.compensation_legs.iter().all(|leg| leg.cancelled)
    }

    /// Returns the created order IDs, in basket order.
    pub fn order_ids(&self) -> &[OrderId] {
        &self.order_ids
    }

    /// Returns the failure kind, if the checkout failed.
    pub fn failure_kind(&self) -> Option<CheckoutFailureKind> {
        self.failure_kind
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns the full journal in record order.
    pub fn journal(&self) -> &[CheckoutSagaEvent] {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::CompensationTarget;
    use common::{ProductId, StoreId};

    fn line(store_id: StoreId) -> CartLine {
        CartLine {
            store_id,
            product_id: ProductId::from("sku-1"),
            quantity: 2,
        }
    }

    #[test]
    fn test_default_saga() {
        let saga = CheckoutSaga::new();
        assert!(saga.checkout_id().is_none());
        assert_eq!(saga.state(), CheckoutState::Initiated);
        assert!(saga.journal().is_empty());
        assert!(saga.order_ids().is_empty());
    }

    #[test]
    fn test_happy_path_fold() {
        let mut saga = CheckoutSaga::new();
        let checkout_id = CheckoutId::new();
        let store_a = StoreId::new();
        let store_b = StoreId::new();

        saga.record(CheckoutSagaEvent::checkout_started(checkout_id, 2));
        assert_eq!(saga.checkout_id(), Some(checkout_id));
        assert_eq!(saga.basket_count(), 2);
        assert_eq!(saga.state(), CheckoutState::Initiated);

        saga.record(CheckoutSagaEvent::cart_validated(Money::from_dollars(40)));
        assert_eq!(saga.state(), CheckoutState::Validated);
        assert_eq!(saga.total(), Some(Money::from_dollars(40)));

        saga.record(CheckoutSagaEvent::stock_reserved(vec![
            line(store_a),
            line(store_b),
        ]));
        assert_eq!(saga.state(), CheckoutState::Validated);
        assert_eq!(saga.reserved_lines().len(), 2);

        saga.record(CheckoutSagaEvent::charge_requested(Money::from_dollars(40)));
        assert_eq!(saga.state(), CheckoutState::PaymentPending);

        saga.record(CheckoutSagaEvent::charge_succeeded(10_042));
        assert_eq!(saga.state(), CheckoutState::Paid);
        assert_eq!(saga.payment_transaction_id(), Some(10_042));

        saga.record(CheckoutSagaEvent::shipments_requested(2));
        assert_eq!(saga.state(), CheckoutState::SupplyPending);

        saga.record(CheckoutSagaEvent::shipment_booked(
            store_a,
            10_043,
            Some("TRACK-0001".into()),
        ));
        saga.record(CheckoutSagaEvent::shipment_booked(
            store_b,
            10_044,
            Some("TRACK-0002".into()),
        ));
        assert_eq!(saga.booked_shipments().len(), 2);

        let order_ids = vec![OrderId::new(), OrderId::new()];
        saga.record(CheckoutSagaEvent::checkout_committed(order_ids.clone()));
        assert_eq!(saga.state(), CheckoutState::Committed);
        assert!(saga.state().is_terminal());
        assert_eq!(saga.order_ids(), order_ids.as_slice());
        assert_eq!(saga.journal().len(), 9);
    }

    #[test]
    fn test_shipment_failure_and_compensation_fold() {
        let mut saga = CheckoutSaga::new();
        let checkout_id = CheckoutId::new();
        let store_a = StoreId::new();
        let store_b = StoreId::new();

        saga.record(CheckoutSagaEvent::checkout_started(checkout_id, 2));
        saga.record(CheckoutSagaEvent::cart_validated(Money::from_dollars(40)));
        saga.record(CheckoutSagaEvent::stock_reserved(vec![
            line(store_a),
            line(store_b),
        ]));
        saga.record(CheckoutSagaEvent::charge_requested(Money::from_dollars(40)));
        saga.record(CheckoutSagaEvent::charge_succeeded(10_042));
        saga.record(CheckoutSagaEvent::shipments_requested(2));
        saga.record(CheckoutSagaEvent::shipment_booked(
            store_a,
            10_043,
            Some("TRACK-0001".into()),
        ));
        saga.record(CheckoutSagaEvent::shipment_failed(store_b, "no capacity"));

        saga.record(CheckoutSagaEvent::compensation_started("no capacity"));
        assert_eq!(saga.state(), CheckoutState::Compensating);

        saga.record(CheckoutSagaEvent::compensation_leg_settled(
            CompensationTarget::Shipment {
                store_id: store_a,
                transaction_id: 10_043,
            },
            true,
            None,
        ));
        saga.record(CheckoutSagaEvent::compensation_leg_settled(
            CompensationTarget::Payment {
                transaction_id: 10_042,
            },
            false,
            Some("cancel timed out".into()),
        ));
        assert_eq!(saga.compensation_legs().len(), 2);
        assert!(!saga.compensation_fully_cancelled());

        saga.record(CheckoutSagaEvent::checkout_failed(
            CheckoutFailureKind::SupplyDeclined,
            "no capacity",
        ));
        assert_eq!(saga.state(), CheckoutState::Failed);
        assert!(saga.state().is_terminal());
        assert_eq!(
            saga.failure_kind(),
            Some(CheckoutFailureKind::SupplyDeclined)
        );
        assert_eq!(saga.failure_reason(), Some("no capacity"));
        assert!(saga.order_ids().is_empty());
    }

    #[test]
    fn test_validation_failure_goes_straight_to_failed() {
        let mut saga = CheckoutSaga::new();
        saga.record(CheckoutSagaEvent::checkout_started(CheckoutId::new(), 1));
        saga.record(CheckoutSagaEvent::checkout_failed(
            CheckoutFailureKind::ValidationError,
            "cart is empty",
        ));

        assert_eq!(saga.state(), CheckoutState::Failed);
        assert!(saga.booked_shipments().is_empty());
        assert!(saga.compensation_legs().is_empty());
    }

    #[test]
    fn test_replay_rebuilds_instance() {
        let mut saga = CheckoutSaga::new();
        let checkout_id = CheckoutId::new();
        let store_id = StoreId::new();

        saga.record(CheckoutSagaEvent::checkout_started(checkout_id, 1));
        saga.record(CheckoutSagaEvent::cart_validated(Money::from_dollars(25)));
        saga.record(CheckoutSagaEvent::stock_reserved(vec![line(store_id)]));
        saga.record(CheckoutSagaEvent::charge_requested(Money::from_dollars(25)));
        saga.record(CheckoutSagaEvent::charge_succeeded(10_042));

        let replayed = CheckoutSaga::replay(saga.journal().to_vec());
        assert_eq!(replayed.checkout_id(), Some(checkout_id));
        assert_eq!(replayed.state(), CheckoutState::Paid);
        assert_eq!(replayed.payment_transaction_id(), Some(10_042));
        assert_eq!(replayed.journal().len(), saga.journal().len());
    }

    #[test]
    fn test_serialization() {
        let mut saga = CheckoutSaga::new();
        let checkout_id = CheckoutId::new();

        saga.record(CheckoutSagaEvent::checkout_started(checkout_id, 1));
        saga.record(CheckoutSagaEvent::cart_validated(Money::from_dollars(25)));

        let json = serde_json::to_string(&saga).unwrap();
        let deserialized: CheckoutSaga = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.checkout_id(), Some(checkout_id));
        assert_eq!(deserialized.state(), CheckoutState::Validated);
        assert_eq!(deserialized.journal().len(), 2);
    }
}
