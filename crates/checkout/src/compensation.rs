//! Idempotent unwinding of partially completed checkouts.

use common::{CheckoutId, ProductId, StoreId};
use futures_util::future::{join, join_all};
use payment::{PaymentClient, PaymentGateway};
use serde::{Deserialize, Serialize};
use supply::{SupplyClient, SupplyGateway};

use crate::cart::CartLine;
use crate::services::InventoryService;

/// One external resource a compensation round must unwind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CompensationTarget {
    /// A booked shipment to cancel.
    #[serde(rename_all = "camelCase")]
    Shipment {
        store_id: StoreId,
        transaction_id: i64,
    },

    /// The single charge to cancel.
    #[serde(rename_all = "camelCase")]
    Payment { transaction_id: i64 },

    /// A stock hold to release.
    #[serde(rename_all = "camelCase")]
    Reservation {
        store_id: StoreId,
        product_id: ProductId,
    },
}

impl std::fmt::Display for CompensationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompensationTarget::Shipment {
                store_id,
                transaction_id,
            } => write!(f, "shipment {transaction_id} (store {store_id})"),
            CompensationTarget::Payment { transaction_id } => {
                write!(f, "payment {transaction_id}")
            }
            CompensationTarget::Reservation {
                store_id,
                product_id,
            } => write!(f, "reservation {product_id} (store {store_id})"),
        }
    }
}

/// A successfully booked shipment leg, eligible for cancellation.
#[derive(Debug, Clone)]
pub struct BookedShipment {
    pub store_id: StoreId,
    pub transaction_id: i64,
}

/// Outcome of one cancel or release attempt.
#[derive(Debug, Clone)]
pub struct CompensationLeg {
    /// Which resource was targeted.
    pub target: CompensationTarget,
    /// Whether the unwind was confirmed.
    pub cancelled: bool,
    /// Failure detail when the unwind was not confirmed.
    pub detail: Option<String>,
}

/// Aggregate outcome of one compensation round.
///
/// Purely informational: the caller of the checkout still receives the
/// failure that triggered compensation, whatever this report says.
#[derive(Debug, Clone, Default)]
pub struct CompensationReport {
    pub legs: Vec<CompensationLeg>,
}

impl CompensationReport {
    /// Returns true when every leg confirmed its unwind.
    pub fn is_complete(&self) -> bool {
        self.legs.iter().all(|leg| leg.cancelled)
    }

    /// Returns the legs that did not confirm.
    pub fn failed_legs(&self) -> impl Iterator<Item = &CompensationLeg> {
        self.legs.iter().filter(|leg| !leg.cancelled)
    }
}

/// Runs the failure branch of a checkout: cancel every succeeded leg,
/// then release every stock hold.
///
/// Every leg is attempted exactly once per round regardless of how
/// earlier legs fared, and the round itself never fails.
pub struct CompensationManager<'a, PC, SC, I>
where
    PC: PaymentClient,
    SC: SupplyClient,
{
    payment: &'a PaymentGateway<PC>,
    supply: &'a SupplyGateway<SC>,
    inventory: &'a I,
}

impl<'a, PC, SC, I> CompensationManager<'a, PC, SC, I>
where
    PC: PaymentClient,
    SC: SupplyClient,
    I: InventoryService,
{
    /// Creates a manager borrowing the gateways and the inventory collaborator.
    pub fn new(
        payment: &'a PaymentGateway<PC>,
        supply: &'a SupplyGateway<SC>,
        inventory: &'a I,
    ) -> Self {
        Self {
            payment,
            supply,
            inventory,
        }
    }

    /// Unwinds one failed checkout.
    ///
    /// Gateway cancels target independent external systems and run
    /// concurrently; holds are released afterwards. Failed legs are
    /// logged at error severity with enough context for manual
    /// reconciliation.
    #[tracing::instrument(skip(self, shipments, reserved), fields(checkout_id = %checkout_id))]
    pub async fn run(
        &self,
        checkout_id: CheckoutId,
        charge: Option<i64>,
        shipments: &[BookedShipment],
        reserved: &[CartLine],
    ) -> CompensationReport {
        let shipment_cancels = shipments.iter().map(|leg| async move {
            let cancelled = self.supply.cancel(leg.transaction_id).await;
            CompensationLeg {
                target: CompensationTarget::Shipment {
                    store_id: leg.store_id,
                    transaction_id: leg.transaction_id,
                },
                cancelled,
                detail: (!cancelled).then(|| "cancel not confirmed by supplier".to_string()),
            }
        });
        let payment_cancel = async {
            let transaction_id = charge?;
            let cancelled = self.payment.cancel(transaction_id).await;
            Some(CompensationLeg {
                target: CompensationTarget::Payment { transaction_id },
                cancelled,
                detail: (!cancelled)
                    .then(|| "cancel not confirmed by payment processor".to_string()),
            })
        };

        let (mut legs, payment_leg) = join(join_all(shipment_cancels), payment_cancel).await;
        legs.extend(payment_leg);

        for line in reserved {
            let released = self
                .inventory
                .release(checkout_id, line.store_id, &line.product_id)
                .await;
            let (cancelled, detail) = match released {
                Ok(()) => (true, None),
                Err(err) => (false, Some(err.to_string())),
            };
            legs.push(CompensationLeg {
                target: CompensationTarget::Reservation {
                    store_id: line.store_id,
                    product_id: line.product_id.clone(),
                },
                cancelled,
                detail,
            });
        }

        for leg in legs.iter().filter(|leg| !leg.cancelled) {
            tracing::error!(
                checkout_id = %checkout_id,
                target = %leg.target,
                detail = leg.detail.as_deref().unwrap_or("no detail"),
                "compensation leg failed, manual reconciliation required"
            );
        }

        CompensationReport { legs }
    }
}
