//! Transport seam to the remote card processor.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, TransportError, VALID_TRANSACTION_IDS};

use crate::method::PaymentMethod;

/// Raw request handed to the processor transport.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub method: PaymentMethod,
    pub amount: Money,
}

/// What the processor answered, when it could be reached at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// Funds secured under the given transaction id.
    Approved { transaction_id: i64 },

    /// Explicit business refusal.
    Declined { reason: String },
}

/// Low-level processor transport.
///
/// Implementations report transient trouble as [`TransportError`] and
/// business refusals as [`ChargeOutcome::Declined`]. Retry policy
/// lives above this trait, in the gateway.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Submits one charge attempt.
    async fn authorize(&self, request: &ChargeRequest) -> Result<ChargeOutcome, TransportError>;

    /// Attempts to void a previously approved transaction. `Ok(true)`
    /// only on confirmed cancellation. Voiding an already voided
    /// transaction is confirmed again, so callers may retry safely.
    async fn void(&self, transaction_id: i64) -> Result<bool, TransportError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentClientState {
    charges: HashMap<i64, Money>,
    voided: HashSet<i64>,
    next_seq: i64,
    decline_reason: Option<String>,
    authorize_faults: u32,
    void_faults: u32,
    latency: Option<Duration>,
    authorize_calls: u32,
    void_calls: u32,
}

/// In-memory processor for tests and local runs.
///
/// Issues sequential transaction ids from the bottom of the valid id
/// space and keeps every approved charge until it is voided.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentClient {
    state: Arc<RwLock<InMemoryPaymentClientState>>,
}

impl InMemoryPaymentClient {
    /// Creates a new in-memory processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent authorize call decline with `reason`.
    pub fn set_decline(&self, reason: impl Into<String>) {
        self.state.write().unwrap().decline_reason = Some(reason.into());
    }

    /// Clears a previously configured decline.
    pub fn clear_decline(&self) {
        self.state.write().unwrap().decline_reason = None;
    }

    /// Makes the next `count` authorize calls fail at transport level.
    pub fn fail_authorize(&self, count: u32) {
        self.state.write().unwrap().authorize_faults = count;
    }

    /// Makes the next `count` void calls fail at transport level.
    pub fn fail_void(&self, count: u32) {
        self.state.write().unwrap().void_faults = count;
    }

    /// Delays every call by `latency`, for timeout tests.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Number of authorize calls seen, including failed ones.
    pub fn authorize_calls(&self) -> u32 {
        self.state.read().unwrap().authorize_calls
    }

    /// Number of void calls seen, including failed ones.
    pub fn void_calls(&self) -> u32 {
        self.state.read().unwrap().void_calls
    }

    /// Number of approved charges not yet voided.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// True if a charge with this id is active.
    pub fn has_charge(&self, transaction_id: i64) -> bool {
        self.state.read().unwrap().charges.contains_key(&transaction_id)
    }

    /// True if this id was voided.
    pub fn was_voided(&self, transaction_id: i64) -> bool {
        self.state.read().unwrap().voided.contains(&transaction_id)
    }

    async fn simulate_latency(&self) {
        let latency = self.state.read().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PaymentClient for InMemoryPaymentClient {
    async fn authorize(&self, request: &ChargeRequest) -> Result<ChargeOutcome, TransportError> {
        self.state.write().unwrap().authorize_calls += 1;
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        if state.authorize_faults > 0 {
            state.authorize_faults -= 1;
            return Err(TransportError::Connection("connection reset".to_string()));
        }
        if let Some(reason) = state.decline_reason.clone() {
            return Ok(ChargeOutcome::Declined { reason });
        }

        state.next_seq += 1;
        let transaction_id = VALID_TRANSACTION_IDS.start() + state.next_seq - 1;
        state.charges.insert(transaction_id, request.amount);
        Ok(ChargeOutcome::Approved { transaction_id })
    }

    async fn void(&self, transaction_id: i64) -> Result<bool, TransportError> {
        self.state.write().unwrap().void_calls += 1;
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        if state.void_faults > 0 {
            state.void_faults -= 1;
            return Err(TransportError::Connection("connection reset".to_string()));
        }
        if state.charges.remove(&transaction_id).is_some() {
            state.voided.insert(transaction_id);
            return Ok(true);
        }
        // A repeated void of the same transaction is still a confirmed
        // cancellation.
        Ok(state.voided.contains(&transaction_id))
    }
}
