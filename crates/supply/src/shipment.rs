//! Per-basket shipment order.

use serde::{Deserialize, Serialize};

/// The delivery order for one basket, handed to the supply gateway.
///
/// One checkout produces one of these per basket, all sharing the same
/// delivery method and address. Parcel weight travels separately since
/// it is computed from the catalog, not from buyer input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetails {
    /// Caller-assigned id, unique within the checkout.
    pub shipment_id: String,

    /// Rendered delivery address.
    pub address: String,

    /// Total number of units in the basket.
    pub quantity: u32,

    /// Who the parcel is for: a buyer id or a guest contact email.
    pub buyer_identity: String,

    /// True when the buyer checked out as a guest.
    pub is_guest: bool,
}

impl ShipmentDetails {
    /// Creates a shipment order.
    pub fn new(
        shipment_id: impl Into<String>,
        address: impl Into<String>,
        quantity: u32,
        buyer_identity: impl Into<String>,
        is_guest: bool,
    ) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            address: address.into(),
            quantity,
            buyer_identity: buyer_identity.into(),
            is_guest,
        }
    }
}
