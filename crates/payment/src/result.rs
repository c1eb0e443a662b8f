//! Charge outcome record.

use common::{FAILED_TRANSACTION_ID, Money, VALID_TRANSACTION_IDS};

use crate::error::PaymentError;
use crate::method::PaymentMethod;

/// Outcome of a single charge call.
///
/// Immutable once constructed. A successful result always carries a
/// transaction id inside [`VALID_TRANSACTION_IDS`]; a failed one
/// carries the `-1` sentinel and an error.
#[derive(Debug, Clone)]
pub struct PaymentResult {
    success: bool,
    transaction_id: i64,
    error: Option<PaymentError>,
    method: PaymentMethod,
    amount: Money,
}

impl PaymentResult {
    pub(crate) fn succeeded(transaction_id: i64, method: PaymentMethod, amount: Money) -> Self {
        debug_assert!(VALID_TRANSACTION_IDS.contains(&transaction_id));
        Self {
            success: true,
            transaction_id,
            error: None,
            method,
            amount,
        }
    }

    pub(crate) fn failed(error: PaymentError, method: PaymentMethod, amount: Money) -> Self {
        Self {
            success: false,
            transaction_id: FAILED_TRANSACTION_ID,
            error: Some(error),
            method,
            amount,
        }
    }

    /// True when the charge went through.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Transaction id issued by the processor, or `-1` on failure.
    pub fn transaction_id(&self) -> i64 {
        self.transaction_id
    }

    /// The failure, when there is one.
    pub fn error(&self) -> Option<&PaymentError> {
        self.error.as_ref()
    }

    /// Rendered failure message, when there is one.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// The instrument this result refers to.
    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    /// The amount the charge was for.
    pub fn amount(&self) -> Money {
        self.amount
    }
}
