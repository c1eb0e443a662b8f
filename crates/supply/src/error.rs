//! Error types for shipment validation and booking.

use thiserror::Error;

/// Result alias for supply validator checks.
pub type SupplyValidationResult = Result<(), SupplyValidationError>;

/// Why a delivery method or shipment order failed structural
/// validation. Local checks only; no remote call was made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupplyValidationError {
    #[error("carrier name must not be blank")]
    CarrierMissing,

    #[error("estimated days must be between 1 and 60")]
    EstimatedDaysOutOfRange,

    #[error("priority level must be between 1 and 3")]
    PriorityOutOfRange,

    #[error("pickup location must be at least 3 characters")]
    LocationTooShort,

    #[error("pickup code must be 4 to 10 uppercase letters or digits")]
    PickupCodeMalformed,

    #[error("shipment id must not be blank")]
    ShipmentIdMissing,

    #[error("delivery address must not be blank")]
    AddressMissing,

    #[error("shipment quantity must be at least 1")]
    QuantityZero,

    #[error("buyer identity must not be blank")]
    BuyerMissing,

    #[error("shipment weight must be a positive number")]
    WeightNotPositive,
}

/// Classification of a failed booking or cancel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupplyError {
    /// The method or shipment order failed local validation; nothing
    /// was sent to the carrier.
    #[error("invalid shipment request: {0}")]
    Rejected(#[from] SupplyValidationError),

    /// The carrier answered with an explicit refusal. Never retried.
    #[error("shipment declined: {0}")]
    Declined(String),

    /// The carrier could not be reached within the attempt budget, or
    /// the gateway is disabled.
    #[error("supply service unavailable: {0}")]
    Unavailable(String),
}

impl SupplyError {
    /// Returns true when the carrier itself refused the booking.
    pub fn is_declined(&self) -> bool {
        matches!(self, SupplyError::Declined(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts_to_rejected() {
        let error: SupplyError = SupplyValidationError::QuantityZero.into();
        assert!(matches!(
            error,
            SupplyError::Rejected(SupplyValidationError::QuantityZero)
        ));
    }

    #[test]
    fn test_error_messages() {
        let error = SupplyError::Declined("no coverage for region".to_string());
        assert_eq!(error.to_string(), "shipment declined: no coverage for region");
    }
}
