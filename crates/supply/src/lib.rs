//! Shipment booking and the supply gateway.
//!
//! Mirrors the payment crate: [`validator`] for local structural
//! checks, [`SupplyClient`] as the carrier transport seam, and
//! [`SupplyGateway`] for retry and failure classification.

pub mod client;
pub mod error;
pub mod gateway;
pub mod method;
pub mod result;
pub mod shipment;
pub mod validator;

pub use client::{InMemorySupplyClient, ShipOutcome, ShipRequest, SupplyClient};
pub use error::{SupplyError, SupplyValidationError, SupplyValidationResult};
pub use gateway::SupplyGateway;
pub use method::SupplyMethod;
pub use result::SupplyResult;
pub use shipment::ShipmentDetails;
