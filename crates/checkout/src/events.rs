//! Checkout saga journal events.

use chrono::{DateTime, Utc};
use common::{CheckoutId, Money, OrderId, StoreId};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::compensation::CompensationTarget;
use crate::error::CheckoutFailureKind;

/// Events recorded while a checkout saga executes.
///
/// The saga instance is rebuilt by folding these in order, so every
/// externally visible step outcome must be captured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CheckoutSagaEvent {
    /// Checkout execution started.
    CheckoutStarted(CheckoutStartedData),

    /// Cart, instruments, and stock checks passed; total priced.
    CartValidated(CartValidatedData),

    /// Stock reserved for every cart line.
    StockReserved(StockReservedData),

    /// The single charge call was issued.
    ChargeRequested(ChargeRequestedData),

    /// The charge was approved by the payment processor.
    ChargeSucceeded(ChargeSucceededData),

    /// Shipment calls were dispatched, one per basket.
    ShipmentsRequested(ShipmentsRequestedData),

    /// One basket's shipment was booked.
    ShipmentBooked(ShipmentBookedData),

    /// One basket's shipment failed.
    ShipmentFailed(ShipmentFailedData),

    /// Compensation started after a shipment failure.
    CompensationStarted(CompensationStartedData),

    /// One compensation leg finished (cancelled or gave up).
    CompensationLegSettled(CompensationLegSettledData),

    /// Checkout committed; orders exist.
    CheckoutCommitted(CheckoutCommittedData),

    /// Checkout failed; no orders exist.
    CheckoutFailed(CheckoutFailedData),
}

impl CheckoutSagaEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            CheckoutSagaEvent::CheckoutStarted(_) => "CheckoutStarted",
            CheckoutSagaEvent::CartValidated(_) => "CartValidated",
            CheckoutSagaEvent::StockReserved(_) => "StockReserved",
            CheckoutSagaEvent::ChargeRequested(_) => "ChargeRequested",
            CheckoutSagaEvent::ChargeSucceeded(_) => "ChargeSucceeded",
            CheckoutSagaEvent::ShipmentsRequested(_) => "ShipmentsRequested",
            CheckoutSagaEvent::ShipmentBooked(_) => "ShipmentBooked",
            CheckoutSagaEvent::ShipmentFailed(_) => "ShipmentFailed",
            CheckoutSagaEvent::CompensationStarted(_) => "CompensationStarted",
            CheckoutSagaEvent::CompensationLegSettled(_) => "CompensationLegSettled",
            CheckoutSagaEvent::CheckoutCommitted(_) => "CheckoutCommitted",
            CheckoutSagaEvent::CheckoutFailed(_) => "CheckoutFailed",
        }
    }
}

/// Data for CheckoutStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutStartedData {
    /// The checkout attempt ID.
    pub checkout_id: CheckoutId,
    /// How many per-store baskets the cart holds.
    pub basket_count: usize,
    /// When the checkout started.
    pub started_at: DateTime<Utc>,
}

/// Data for CartValidated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartValidatedData {
    /// The authoritative cart total.
    pub total: Money,
}

/// Data for StockReserved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReservedData {
    /// Every reserved (store, product, quantity) line.
    pub lines: Vec<CartLine>,
}

/// Data for ChargeRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequestedData {
    /// The amount sent to the payment processor.
    pub amount: Money,
}

/// Data for ChargeSucceeded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeSucceededData {
    /// The processor's transaction ID.
    pub transaction_id: i64,
}

/// Data for ShipmentsRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentsRequestedData {
    /// How many shipment calls were dispatched.
    pub count: usize,
}

/// Data for ShipmentBooked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentBookedData {
    /// The basket's store.
    pub store_id: StoreId,
    /// The supplier's transaction ID.
    pub transaction_id: i64,
    /// Tracking token, when the supplier issued one.
    pub tracking_number: Option<String>,
}

/// Data for ShipmentFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentFailedData {
    /// The basket's store.
    pub store_id: StoreId,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for CompensationStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationStartedData {
    /// The failure that triggered compensation.
    pub reason: String,
}

/// Data for CompensationLegSettled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationLegSettledData {
    /// Which external resource the cancel targeted.
    pub target: CompensationTarget,
    /// Whether the cancel was confirmed.
    pub cancelled: bool,
    /// Failure detail when the cancel was not confirmed.
    pub detail: Option<String>,
}

/// Data for CheckoutCommitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCommittedData {
    /// Created order IDs, in basket order.
    pub order_ids: Vec<OrderId>,
    /// When the checkout committed.
    pub committed_at: DateTime<Utc>,
}

/// Data for CheckoutFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutFailedData {
    /// Machine-readable failure kind.
    pub kind: CheckoutFailureKind,
    /// Human-readable failure message.
    pub message: String,
    /// When the checkout failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl CheckoutSagaEvent {
    /// Creates a CheckoutStarted event.
    pub fn checkout_started(checkout_id: CheckoutId, basket_count: usize) -> Self {
        CheckoutSagaEvent::CheckoutStarted(CheckoutStartedData {
            checkout_id,
            basket_count,
            started_at: Utc::now(),
        })
    }

    /// Creates a CartValidated event.
    pub fn cart_validated(total: Money) -> Self {
        CheckoutSagaEvent::CartValidated(CartValidatedData { total })
    }

    /// Creates a StockReserved event.
    pub fn stock_reserved(lines: Vec<CartLine>) -> Self {
        CheckoutSagaEvent::StockReserved(StockReservedData { lines })
    }

    /// Creates a ChargeRequested event.
    pub fn charge_requested(amount: Money) -> Self {
        CheckoutSagaEvent::ChargeRequested(ChargeRequestedData { amount })
    }

    /// Creates a ChargeSucceeded event.
    pub fn charge_succeeded(transaction_id: i64) -> Self {
        CheckoutSagaEvent::ChargeSucceeded(ChargeSucceededData { transaction_id })
    }

    /// Creates a ShipmentsRequested event.
    pub fn shipments_requested(count: usize) -> Self {
        CheckoutSagaEvent::ShipmentsRequested(ShipmentsRequestedData { count })
    }

    /// Creates a ShipmentBooked event.
    pub fn shipment_booked(
        store_id: StoreId,
        transaction_id: i64,
        tracking_number: Option<String>,
    ) -> Self {
        CheckoutSagaEvent::ShipmentBooked(ShipmentBookedData {
            store_id,
            transaction_id,
            tracking_number,
        })
    }

    /// Creates a ShipmentFailed event.
    pub fn shipment_failed(store_id: StoreId, error: impl Into<String>) -> Self {
        CheckoutSagaEvent::ShipmentFailed(ShipmentFailedData {
            store_id,
            error: error.into(),
        })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(reason: impl Into<String>) -> Self {
        CheckoutSagaEvent::CompensationStarted(CompensationStartedData {
            reason: reason.into(),
        })
    }

    /// Creates a CompensationLegSettled event.
    pub fn compensation_leg_settled(
        target: CompensationTarget,
        cancelled: bool,
        detail: Option<String>,
    ) -> Self {
        CheckoutSagaEvent::CompensationLegSettled(CompensationLegSettledData {
            target,
            cancelled,
            detail,
        })
    }

    /// Creates a CheckoutCommitted event.
    pub fn checkout_committed(order_ids: Vec<OrderId>) -> Self {
        CheckoutSagaEvent::CheckoutCommitted(CheckoutCommittedData {
            order_ids,
            committed_at: Utc::now(),
        })
    }

    /// Creates a CheckoutFailed event.
    pub fn checkout_failed(kind: CheckoutFailureKind, message: impl Into<String>) -> Self {
        CheckoutSagaEvent::CheckoutFailed(CheckoutFailedData {
            kind,
            message: message.into(),
            failed_at: Utc::now(),
        })
    }
}
