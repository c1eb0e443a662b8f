//! Error types for payment validation and charging.

use thiserror::Error;

/// Result alias for validator checks.
pub type ValidationResult = Result<(), ValidationError>;

/// Why an instrument or amount failed structural validation.
///
/// Validation is local and side-effect free; none of these variants
/// imply that a remote call was made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amounts must be strictly positive.
    #[error("amount must be greater than zero")]
    AmountNotPositive,

    /// Amounts are capped at 1,000,000.00.
    #[error("amount exceeds the charge limit")]
    AmountTooLarge,

    #[error("card number must be 13 to 19 digits")]
    CardNumberMalformed,

    #[error("card number failed checksum")]
    CardNumberChecksum,

    #[error("card expiry must be in MM/YY form")]
    CardExpiryMalformed,

    /// The expiry month has already passed.
    #[error("card is expired")]
    CardExpired,

    #[error("card cvv must be 3 or 4 digits")]
    CardCvvMalformed,

    #[error("cardholder name must be at least 2 letters")]
    CardHolderMalformed,

    #[error("account number must be 8 to 20 digits")]
    AccountNumberMalformed,

    #[error("bank name must be 2 to 100 characters")]
    BankNameMalformed,

    #[error("wallet email is not a valid address")]
    WalletEmailMalformed,
}

/// Classification of a failed charge or cancel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The instrument or amount failed local validation; nothing was
    /// sent to the processor.
    #[error("invalid payment request: {0}")]
    Rejected(#[from] ValidationError),

    /// The processor answered with an explicit refusal. Never retried.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The processor could not be reached within the attempt budget,
    /// or the gateway is disabled.
    #[error("payment service unavailable: {0}")]
    Unavailable(String),
}

impl PaymentError {
    /// Returns true when the failure came from the remote processor
    /// refusing the charge, as opposed to transport trouble.
    pub fn is_declined(&self) -> bool {
        matches!(self, PaymentError::Declined(_))
    }
}
