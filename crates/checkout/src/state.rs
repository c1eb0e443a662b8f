//! Checkout saga state machine.

use serde::{Deserialize, Serialize};

/// The state of a checkout saga in its lifecycle.
///
/// State transitions:
/// ```text
/// Initiated ──► Validated ──► PaymentPending ──► Paid ──► SupplyPending ──► Committed
///     │             │               │                           │
///     │             │               │                           ▼
///     └─────────────┴───────────────┴──► Failed ◄────────── Compensating
/// ```
///
/// There are no backward transitions. A failure before the charge goes
/// straight to `Failed` after releasing reservations; a failure after the
/// charge always passes through `Compensating` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// Checkout request received, nothing verified yet.
    #[default]
    Initiated,

    /// Cart, instruments, and stock levels verified; total priced.
    Validated,

    /// Stock reserved, the single charge call is in flight.
    PaymentPending,

    /// Charge confirmed, no shipments arranged yet.
    Paid,

    /// Shipment calls are in flight, waiting on all outcomes.
    SupplyPending,

    /// Charge and every shipment succeeded; orders exist (terminal state).
    Committed,

    /// A shipment leg failed after the charge; cancels are in flight.
    Compensating,

    /// Checkout failed; no orders exist (terminal state).
    Failed,
}

impl CheckoutState {
    /// Returns true if validation can run in this state.
    pub fn can_validate(&self) -> bool {
        matches!(self, CheckoutState::Initiated)
    }

    /// Returns true if stock reservation and the charge can start.
    pub fn can_start_payment(&self) -> bool {
        matches!(self, CheckoutState::Validated)
    }

    /// Returns true if the charge outcome can be recorded.
    pub fn can_mark_paid(&self) -> bool {
        matches!(self, CheckoutState::PaymentPending)
    }

    /// Returns true if shipment dispatch can start.
    pub fn can_start_supply(&self) -> bool {
        matches!(self, CheckoutState::Paid)
    }

    /// Returns true if the checkout can commit in this state.
    pub fn can_commit(&self) -> bool {
        matches!(self, CheckoutState::SupplyPending)
    }

    /// Returns true if compensation can begin in this state.
    pub fn can_compensate(&self) -> bool {
        matches!(self, CheckoutState::SupplyPending)
    }

    /// Returns true if the checkout can fail directly from this state.
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            CheckoutState::Initiated
                | CheckoutState::Validated
                | CheckoutState::PaymentPending
                | CheckoutState::Compensating
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Committed | CheckoutState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Initiated => "Initiated",
            CheckoutState::Validated => "Validated",
            CheckoutState::PaymentPending => "PaymentPending",
            CheckoutState::Paid => "Paid",
            CheckoutState::SupplyPending => "SupplyPending",
            CheckoutState::Committed => "Committed",
            CheckoutState::Compensating => "Compensating",
            CheckoutState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_initiated() {
        assert_eq!(CheckoutState::default(), CheckoutState::Initiated);
    }

    #[test]
    fn test_can_validate() {
        assert!(CheckoutState::Initiated.can_validate());
        assert!(!CheckoutState::Validated.can_validate());
        assert!(!CheckoutState::PaymentPending.can_validate());
        assert!(!CheckoutState::Paid.can_validate());
        assert!(!CheckoutState::SupplyPending.can_validate());
        assert!(!CheckoutState::Committed.can_validate());
        assert!(!CheckoutState::Compensating.can_validate());
        assert!(!CheckoutState::Failed.can_validate());
    }

    #[test]
    fn test_can_start_payment() {
        assert!(!CheckoutState::Initiated.can_start_payment());
        assert!(CheckoutState::Validated.can_start_payment());
        assert!(!CheckoutState::PaymentPending.can_start_payment());
        assert!(!CheckoutState::Paid.can_start_payment());
        assert!(!CheckoutState::SupplyPending.can_start_payment());
        assert!(!CheckoutState::Committed.can_start_payment());
        assert!(!CheckoutState::Compensating.can_start_payment());
        assert!(!CheckoutState::Failed.can_start_payment());
    }

    #[test]
    fn test_can_mark_paid() {
        assert!(!CheckoutState::Initiated.can_mark_paid());
        assert!(!CheckoutState::Validated.can_mark_paid());
        assert!(CheckoutState::PaymentPending.can_mark_paid());
        assert!(!CheckoutState::Paid.can_mark_paid());
        assert!(!CheckoutState::SupplyPending.can_mark_paid());
        assert!(!CheckoutState::Committed.can_mark_paid());
        assert!(!CheckoutState::Compensating.can_mark_paid());
        assert!(!CheckoutState::Failed.can_mark_paid());
    }

    #[test]
    fn test_can_start_supply() {
        assert!(!CheckoutState::Initiated.can_start_supply());
        assert!(!CheckoutState::Validated.can_start_supply());
        assert!(!CheckoutState::PaymentPending.can_start_supply());
        assert!(CheckoutState::Paid.can_start_supply());
        assert!(!CheckoutState::SupplyPending.can_start_supply());
        assert!(!CheckoutState::Committed.can_start_supply());
        assert!(!CheckoutState::Compensating.can_start_supply());
        assert!(!CheckoutState::Failed.can_start_supply());
    }

    #[test]
    fn test_can_commit_and_compensate_only_from_supply_pending() {
        assert!(CheckoutState::SupplyPending.can_commit());
        assert!(CheckoutState::SupplyPending.can_compensate());
        for state in [
            CheckoutState::Initiated,
            CheckoutState::Validated,
            CheckoutState::PaymentPending,
            CheckoutState::Paid,
            CheckoutState::Committed,
            CheckoutState::Compensating,
            CheckoutState::Failed,
        ] {
            assert!(!state.can_commit(), "{state} must not commit");
            assert!(!state.can_compensate(), "{state} must not compensate");
        }
    }

    #[test]
    fn test_can_fail() {
        assert!(CheckoutState::Initiated.can_fail());
        assert!(CheckoutState::Validated.can_fail());
        assert!(CheckoutState::PaymentPending.can_fail());
        assert!(!CheckoutState::Paid.can_fail());
        assert!(!CheckoutState::SupplyPending.can_fail());
        assert!(!CheckoutState::Committed.can_fail());
        assert!(CheckoutState::Compensating.can_fail());
        assert!(!CheckoutState::Failed.can_fail());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CheckoutState::Initiated.is_terminal());
        assert!(!CheckoutState::Validated.is_terminal());
        assert!(!CheckoutState::PaymentPending.is_terminal());
        assert!(!CheckoutState::Paid.is_terminal());
        assert!(!CheckoutState::SupplyPending.is_terminal());
        assert!(CheckoutState::Committed.is_terminal());
        assert!(!CheckoutState::Compensating.is_terminal());
        assert!(CheckoutState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutState::Initiated.to_string(), "Initiated");
        assert_eq!(CheckoutState::Validated.to_string(), "Validated");
        assert_eq!(CheckoutState::PaymentPending.to_string(), "PaymentPending");
        assert_eq!(CheckoutState::Paid.to_string(), "Paid");
        assert_eq!(CheckoutState::SupplyPending.to_string(), "SupplyPending");
        assert_eq!(CheckoutState::Committed.to_string(), "Committed");
        assert_eq!(CheckoutState::Compensating.to_string(), "Compensating");
        assert_eq!(CheckoutState::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_serialization() {
        let state = CheckoutState::SupplyPending;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
