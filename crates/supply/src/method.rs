//! Delivery method variants.

use serde::{Deserialize, Serialize};

/// How the goods of a checkout reach the buyer.
///
/// One method applies to the whole checkout and is fanned out to every
/// basket. The wire representation carries a `type` discriminator
/// (`standardShipping`, `expressShipping`, `pickup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SupplyMethod {
    /// Regular parcel delivery.
    #[serde(rename = "standardShipping", rename_all = "camelCase")]
    Standard {
        /// Carrier name, e.g. `DHL`.
        carrier: String,
        /// Promised delivery window in days, 1 to 60.
        estimated_days: u32,
    },

    /// Expedited delivery.
    #[serde(rename = "expressShipping", rename_all = "camelCase")]
    Express {
        /// Carrier name.
        carrier: String,
        /// Priority tier, 1 (highest) to 3.
        priority_level: u32,
    },

    /// Buyer collects at a pickup point.
    #[serde(rename_all = "camelCase")]
    Pickup {
        /// Pickup point description.
        location: String,
        /// Collection code, 4 to 10 uppercase alphanumerics.
        pickup_code: String,
    },
}

impl SupplyMethod {
    /// Returns the wire discriminator for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            SupplyMethod::Standard { .. } => "standardShipping",
            SupplyMethod::Express { .. } => "expressShipping",
            SupplyMethod::Pickup { .. } => "pickup",
        }
    }
}

impl std::fmt::Display for SupplyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupplyMethod::Standard {
                carrier,
                estimated_days,
            } => write!(f, "standard shipping via {carrier} ({estimated_days} days)"),
            SupplyMethod::Express {
                carrier,
                priority_level,
            } => write!(f, "express shipping via {carrier} (priority {priority_level})"),
            SupplyMethod::Pickup { location, .. } => write!(f, "pickup at {location}"),
        }
    }
}
