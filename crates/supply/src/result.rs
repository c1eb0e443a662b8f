//! Booking outcome record.

use common::{FAILED_TRANSACTION_ID, VALID_TRANSACTION_IDS};

use crate::error::SupplyError;
use crate::method::SupplyMethod;
use crate::shipment::ShipmentDetails;

/// Outcome of a single shipment booking.
///
/// Immutable once constructed. A successful result carries a
/// transaction id inside [`VALID_TRANSACTION_IDS`] plus a carrier
/// tracking number; a failed one carries the `-1` sentinel and an
/// error.
#[derive(Debug, Clone)]
pub struct SupplyResult {
    success: bool,
    transaction_id: i64,
    tracking_number: Option<String>,
    error: Option<SupplyError>,
    method: SupplyMethod,
    details: ShipmentDetails,
}

impl SupplyResult {
    pub(crate) fn succeeded(
        transaction_id: i64,
        tracking_number: String,
        method: SupplyMethod,
        details: ShipmentDetails,
    ) -> Self {
        debug_assert!(VALID_TRANSACTION_IDS.contains(&transaction_id));
        Self {
            success: true,
            transaction_id,
            tracking_number: Some(tracking_number),
            error: None,
            method,
            details,
        }
    }

    pub(crate) fn failed(error: SupplyError, method: SupplyMethod, details: ShipmentDetails) -> Self {
        Self {
            success: false,
            transaction_id: FAILED_TRANSACTION_ID,
            tracking_number: None,
            error: Some(error),
            method,
            details,
        }
    }

    /// True when the booking went through.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Transaction id issued by the carrier, or `-1` on failure.
    pub fn transaction_id(&self) -> i64 {
        self.transaction_id
    }

    /// Carrier tracking number, present on success.
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// The failure, when there is one.
    pub fn error(&self) -> Option<&SupplyError> {
        self.error.as_ref()
    }

    /// Rendered failure message, when there is one.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// The delivery method the booking was for.
    pub fn method(&self) -> &SupplyMethod {
        &self.method
    }

    /// The shipment order the booking was for.
    pub fn details(&self) -> &ShipmentDetails {
        &self.details
    }
}
