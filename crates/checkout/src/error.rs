//! Checkout error taxonomy.

use payment::PaymentError;
use serde::{Deserialize, Serialize};
use supply::SupplyError;
use thiserror::Error;

use crate::services::InventoryError;

/// Machine-readable failure kinds surfaced to callers.
///
/// `CompensationPartialFailure` is recorded in the journal and logs only;
/// the caller always receives the kind of the failure that triggered
/// compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutFailureKind {
    ValidationError,
    PaymentDeclined,
    PaymentUnavailable,
    SupplyDeclined,
    SupplyUnavailable,
    CompensationPartialFailure,
    InternalError,
}

impl CheckoutFailureKind {
    /// Returns true for failures worth presenting as "try again later".
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutFailureKind::PaymentUnavailable | CheckoutFailureKind::SupplyUnavailable
        )
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutFailureKind::ValidationError => "VALIDATION_ERROR",
            CheckoutFailureKind::PaymentDeclined => "PAYMENT_DECLINED",
            CheckoutFailureKind::PaymentUnavailable => "PAYMENT_UNAVAILABLE",
            CheckoutFailureKind::SupplyDeclined => "SUPPLY_DECLINED",
            CheckoutFailureKind::SupplyUnavailable => "SUPPLY_UNAVAILABLE",
            CheckoutFailureKind::CompensationPartialFailure => "COMPENSATION_PARTIAL_FAILURE",
            CheckoutFailureKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for CheckoutFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can terminate a checkout.
///
/// Every gateway and collaborator failure is converted into one of these
/// at the coordinator boundary; raw transport errors never cross it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Rejected before any external call was made.
    #[error("Checkout validation failed: {0}")]
    Validation(String),

    /// The payment processor explicitly declined the charge.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// The payment processor could not be reached.
    #[error("Payment service unavailable: {0}")]
    PaymentUnavailable(String),

    /// A supplier explicitly refused a shipment.
    #[error("Shipment declined: {0}")]
    SupplyDeclined(String),

    /// A supplier could not be reached.
    #[error("Supply service unavailable: {0}")]
    SupplyUnavailable(String),

    /// A collaborator failed while committing an already-paid checkout.
    #[error("Internal checkout error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Returns the failure kind for this error.
    pub fn kind(&self) -> CheckoutFailureKind {
        match self {
            CheckoutError::Validation(_) => CheckoutFailureKind::ValidationError,
            CheckoutError::PaymentDeclined(_) => CheckoutFailureKind::PaymentDeclined,
            CheckoutError::PaymentUnavailable(_) => CheckoutFailureKind::PaymentUnavailable,
            CheckoutError::SupplyDeclined(_) => CheckoutFailureKind::SupplyDeclined,
            CheckoutError::SupplyUnavailable(_) => CheckoutFailureKind::SupplyUnavailable,
            CheckoutError::Internal(_) => CheckoutFailureKind::InternalError,
        }
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rejected(violation) => CheckoutError::Validation(violation.to_string()),
            PaymentError::Declined(reason) => CheckoutError::PaymentDeclined(reason),
            PaymentError::Unavailable(detail) => CheckoutError::PaymentUnavailable(detail),
        }
    }
}

impl From<SupplyError> for CheckoutError {
    fn from(err: SupplyError) -> Self {
        match err {
            SupplyError::Rejected(violation) => CheckoutError::Validation(violation.to_string()),
            SupplyError::Declined(reason) => CheckoutError::SupplyDeclined(reason),
            SupplyError::Unavailable(detail) => CheckoutError::SupplyUnavailable(detail),
        }
    }
}

impl From<InventoryError> for CheckoutError {
    fn from(err: InventoryError) -> Self {
        // Reservation problems are pre-charge and validation-class.
        CheckoutError::Validation(err.to_string())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            CheckoutError::Validation("empty cart".into()).kind(),
            CheckoutFailureKind::ValidationError
        );
        assert_eq!(
            CheckoutError::PaymentDeclined("insufficient funds".into()).kind(),
            CheckoutFailureKind::PaymentDeclined
        );
        assert_eq!(
            CheckoutError::PaymentUnavailable("timed out".into()).kind(),
            CheckoutFailureKind::PaymentUnavailable
        );
        assert_eq!(
            CheckoutError::SupplyDeclined("no capacity".into()).kind(),
            CheckoutFailureKind::SupplyDeclined
        );
        assert_eq!(
            CheckoutError::SupplyUnavailable("timed out".into()).kind(),
            CheckoutFailureKind::SupplyUnavailable
        );
        assert_eq!(
            CheckoutError::Internal("order store down".into()).kind(),
            CheckoutFailureKind::InternalError
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(CheckoutFailureKind::PaymentUnavailable.is_retryable());
        assert!(CheckoutFailureKind::SupplyUnavailable.is_retryable());
        assert!(!CheckoutFailureKind::PaymentDeclined.is_retryable());
        assert!(!CheckoutFailureKind::ValidationError.is_retryable());
        assert!(!CheckoutFailureKind::CompensationPartialFailure.is_retryable());
    }

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_string(&CheckoutFailureKind::PaymentDeclined).unwrap();
        assert_eq!(json, "\"PAYMENT_DECLINED\"");
        let json = serde_json::to_string(&CheckoutFailureKind::CompensationPartialFailure).unwrap();
        assert_eq!(json, "\"COMPENSATION_PARTIAL_FAILURE\"");
    }

    #[test]
    fn test_payment_error_conversion() {
        let err: CheckoutError = PaymentError::Declined("card expired".to_string()).into();
        assert_eq!(
            err,
            CheckoutError::PaymentDeclined("card expired".to_string())
        );

        let err: CheckoutError = PaymentError::Unavailable("3 attempts failed".to_string()).into();
        assert_eq!(err.kind(), CheckoutFailureKind::PaymentUnavailable);
    }

    #[test]
    fn test_supply_error_conversion() {
        let err: CheckoutError = SupplyError::Declined("region not served".to_string()).into();
        assert_eq!(
            err,
            CheckoutError::SupplyDeclined("region not served".to_string())
        );
    }
}
