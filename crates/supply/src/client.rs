//! Transport seam to the remote carrier.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{TransportError, VALID_TRANSACTION_IDS};

use crate::method::SupplyMethod;
use crate::shipment::ShipmentDetails;

/// Raw request handed to the carrier transport.
#[derive(Debug, Clone)]
pub struct ShipRequest {
    pub method: SupplyMethod,
    pub details: ShipmentDetails,
    pub weight_kg: f64,
}

/// What the carrier answered, when it could be reached at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipOutcome {
    /// Booking accepted under the given transaction id.
    Booked {
        transaction_id: i64,
        tracking_number: String,
    },

    /// Explicit business refusal.
    Declined { reason: String },
}

/// Low-level carrier transport.
///
/// Implementations report transient trouble as [`TransportError`] and
/// business refusals as [`ShipOutcome::Declined`]. Retry policy lives
/// above this trait, in the gateway.
#[async_trait]
pub trait SupplyClient: Send + Sync {
    /// Submits one booking attempt.
    async fn book(&self, request: &ShipRequest) -> Result<ShipOutcome, TransportError>;

    /// Attempts to void a previous booking. `Ok(true)` only on
    /// confirmed cancellation; repeat voids of the same id are
    /// confirmed again.
    async fn void(&self, transaction_id: i64) -> Result<bool, TransportError>;
}

#[derive(Debug, Default)]
struct InMemorySupplyClientState {
    shipments: HashMap<i64, ShipmentDetails>,
    voided: HashSet<i64>,
    next_seq: i64,
    decline_reason: Option<String>,
    approve_budget: Option<u32>,
    book_faults: u32,
    void_faults: u32,
    latency: Option<Duration>,
    book_calls: u32,
    void_calls: u32,
}

/// In-memory carrier for tests and local runs.
///
/// Issues sequential transaction ids from the bottom of the valid id
/// space and sequential `TRACK-` numbers.
#[derive(Debug, Clone, Default)]
pub struct InMemorySupplyClient {
    state: Arc<RwLock<InMemorySupplyClientState>>,
}

impl InMemorySupplyClient {
    /// Creates a new in-memory carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent booking decline with `reason`.
    pub fn set_decline(&self, reason: impl Into<String>) {
        self.state.write().unwrap().decline_reason = Some(reason.into());
    }

    /// Approves the next `count` bookings, then declines the rest.
    ///
    /// Used to fail one basket of a multi-basket checkout.
    pub fn approve_only(&self, count: u32, reason: impl Into<String>) {
        let mut state = self.state.write().unwrap();
        state.approve_budget = Some(count);
        state.decline_reason = Some(reason.into());
    }

    /// Makes the next `count` book calls fail at transport level.
    pub fn fail_book(&self, count: u32) {
        self.state.write().unwrap().book_faults = count;
    }

    /// Makes the next `count` void calls fail at transport level.
    pub fn fail_void(&self, count: u32) {
        self.state.write().unwrap().void_faults = count;
    }

    /// Delays every call by `latency`, for timeout tests.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Number of book calls seen, including failed ones.
    pub fn book_calls(&self) -> u32 {
        self.state.read().unwrap().book_calls
    }

    /// Number of void calls seen, including failed ones.
    pub fn void_calls(&self) -> u32 {
        self.state.read().unwrap().void_calls
    }

    /// Number of accepted bookings not yet voided.
    pub fn shipment_count(&self) -> usize {
        self.state.read().unwrap().shipments.len()
    }

    /// True if a booking with this id is active.
    pub fn has_shipment(&self, transaction_id: i64) -> bool {
        self.state
            .read()
            .unwrap()
            .shipments
            .contains_key(&transaction_id)
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
impl SupplyClient for InMemorySupplyClient {
    async fn book(&self, request: &ShipRequest) -> Result<ShipOutcome, TransportError> {
        self.state.write().unwrap().book_calls += 1;
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        if state.book_faults > 0 {
            state.book_faults -= 1;
            return Err(TransportError::Connection("connection reset".to_string()));
        }

        let declined = if let Some(budget) = state.approve_budget {
            if budget == 0 {
                true
            } else {
                state.approve_budget = Some(budget - 1);
                false
            }
        } else {
            state.decline_reason.is_some()
        };
        if declined {
            let reason = state
                .decline_reason
                .clone()
                .unwrap_or_else(|| "booking refused".to_string());
            return Ok(ShipOutcome::Declined { reason });
        }

        state.next_seq += 1;
        let transaction_id = VALID_TRANSACTION_IDS.start() + state.next_seq - 1;
        let tracking_number = format!("TRACK-{:04}", state.next_seq);
        state
            .shipments
            .insert(transaction_id, request.details.clone());
        Ok(ShipOutcome::Booked {
            transaction_id,
            tracking_number,
        })
    }

    async fn void(&self, transaction_id: i64) -> Result<bool, TransportError> {
        self.state.write().unwrap().void_calls += 1;
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        if state.void_faults > 0 {
            state.void_faults -= 1;
            return Err(TransportError::Connection("connection reset".to_string()));
        }
        if state.shipments.remove(&transaction_id).is_some() {
            state.voided.insert(transaction_id);
            return Ok(true);
        }
        Ok(state.voided.contains(&transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ShipRequest {
        ShipRequest {
            method: SupplyMethod::Standard {
                carrier: "DHL".to_string(),
                estimated_days: 5,
            },
            details: ShipmentDetails::new(
                "chk-1/store-1",
                "1 Main St",
                2,
                "buyer@example.com",
                false,
            ),
            weight_kg: 2.5,
        }
    }

    #[tokio::test]
    async fn test_book_issues_sequential_ids_and_tracking() {
        let client = InMemorySupplyClient::new();

        let first = client.book(&request()).await.unwrap();
        let second = client.book(&request()).await.unwrap();

        assert_eq!(
            first,
            ShipOutcome::Booked {
                transaction_id: 10_000,
                tracking_number: "TRACK-0001".to_string()
            }
        );
        assert_eq!(
            second,
            ShipOutcome::Booked {
                transaction_id: 10_001,
                tracking_number: "TRACK-0002".to_string()
            }
        );
        assert_eq!(client.shipment_count(), 2);
    }

    #[tokio::test]
    async fn test_approve_only_budget() {
        let client = InMemorySupplyClient::new();
        client.approve_only(1, "no capacity");

        let first = client.book(&request()).await.unwrap();
        let second = client.book(&request()).await.unwrap();

        assert!(matches!(first, ShipOutcome::Booked { .. }));
        assert_eq!(
            second,
            ShipOutcome::Declined {
                reason: "no capacity".to_string()
            }
        );
        assert_eq!(client.shipment_count(), 1);
    }

    #[tokio::test]
    async fn test_void_confirms_and_is_idempotent() {
        let client = InMemorySupplyClient::new();
        let ShipOutcome::Booked { transaction_id, .. } = client.book(&request()).await.unwrap()
        else {
            panic!("expected booking");
        };

        assert!(client.void(transaction_id).await.unwrap());
        assert!(client.void(transaction_id).await.unwrap());
        assert_eq!(client.shipment_count(), 0);
        assert!(client.was_voided(transaction_id));
    }

    #[tokio::test]
    async fn test_transient_faults_are_consumed() {
        let client = InMemorySupplyClient::new();
        client.fail_book(1);

        assert!(client.book(&request()).await.is_err());
        assert!(client.book(&request()).await.is_ok());
        assert_eq!(client.book_calls(), 2);
    }
}
