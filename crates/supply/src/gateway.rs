//! Booking front door: validation, retry, and failure classification.

use common::{GatewayConfig, TransportError, VALID_TRANSACTION_IDS};
use tokio::time;

use crate::client::{ShipOutcome, ShipRequest, SupplyClient};
use crate::error::SupplyError;
use crate::method::SupplyMethod;
use crate::result::SupplyResult;
use crate::shipment::ShipmentDetails;
use crate::validator;

/// Number of tries a cancel gets before giving up.
const CANCEL_ATTEMPTS: u32 = 2;

/// Front door to the carrier.
///
/// Same discipline as the payment side: local validation before any
/// remote call, fixed-delay retry on transport faults, no retry on an
/// explicit refusal, all failures classified in the result.
pub struct SupplyGateway<C: SupplyClient> {
    client: C,
    config: GatewayConfig,
}

impl<C: SupplyClient> SupplyGateway<C> {
    /// Creates a gateway over a transport client.
    pub fn new(client: C, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Books one shipment of `weight_kg` kilograms under `method`.
    #[tracing::instrument(
        skip(self, method, details),
        fields(shipment_id = %details.shipment_id, method = method.kind())
    )]
    pub async fn ship(
        &self,
        method: &SupplyMethod,
        details: &ShipmentDetails,
        weight_kg: f64,
    ) -> SupplyResult {
        if let Err(error) = validator::validate_shipment(method, details, weight_kg) {
            tracing::debug!(%error, "shipment rejected by local validation");
            return SupplyResult::failed(error.into(), method.clone(), details.clone());
        }
        if !self.config.enabled {
            tracing::warn!("shipment refused: supply gateway disabled");
            return SupplyResult::failed(
                SupplyError::Unavailable("supply gateway disabled".to_string()),
                method.clone(),
                details.clone(),
            );
        }

        let request = ShipRequest {
            method: method.clone(),
            details: details.clone(),
            weight_kg,
        };
        let attempts = self.config.retry_attempts.max(1);
        let mut last_fault: Option<TransportError> = None;

        for attempt in 1..=attempts {
            match time::timeout(self.config.request_timeout, self.client.book(&request)).await {
                Ok(Ok(ShipOutcome::Booked {
                    transaction_id,
                    tracking_number,
                })) => {
                    if !VALID_TRANSACTION_IDS.contains(&transaction_id) {
                        tracing::error!(transaction_id, "carrier issued an out-of-range id");
                        return SupplyResult::failed(
                            SupplyError::Unavailable(
                                "carrier issued an out-of-range transaction id".to_string(),
                            ),
                            method.clone(),
                            details.clone(),
                        );
                    }
                    tracing::info!(transaction_id, %tracking_number, attempt, "shipment booked");
                    return SupplyResult::succeeded(
                        transaction_id,
                        tracking_number,
                        method.clone(),
                        details.clone(),
                    );
                }
                Ok(Ok(ShipOutcome::Declined { reason })) => {
                    tracing::info!(%reason, attempt, "shipment declined");
                    return SupplyResult::failed(
                        SupplyError::Declined(reason),
                        method.clone(),
                        details.clone(),
                    );
                }
                Ok(Err(fault)) => {
                    tracing::warn!(error = %fault, attempt, "booking attempt failed");
                    last_fault = Some(fault);
                }
                Err(_) => {
                    tracing::warn!(attempt, "booking attempt timed out");
                    last_fault = Some(TransportError::Timeout);
                }
            }
            if attempt < attempts {
                time::sleep(self.config.retry_delay).await;
            }
        }

        let detail = last_fault
            .map(|fault| fault.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        tracing::warn!(%detail, "booking gave up after {attempts} attempts");
        SupplyResult::failed(
            SupplyError::Unavailable(detail),
            method.clone(),
            details.clone(),
        )
    }

    /// Attempts to void a prior booking, returning true only when the
    /// carrier confirmed the cancellation.
    ///
    /// Ids outside the issued space are refused without a remote call.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, transaction_id: i64) -> bool {
        if !VALID_TRANSACTION_IDS.contains(&transaction_id) {
            tracing::debug!(transaction_id, "cancel refused: id outside the issued space");
            return false;
        }
        if !self.config.enabled {
            tracing::warn!(transaction_id, "cancel refused: supply gateway disabled");
            return false;
        }

        for attempt in 1..=CANCEL_ATTEMPTS {
            match time::timeout(self.config.request_timeout, self.client.void(transaction_id))
                .await
            {
                Ok(Ok(confirmed)) => {
                    tracing::info!(transaction_id, confirmed, "cancel answered");
                    return confirmed;
                }
                Ok(Err(fault)) => {
                    tracing::warn!(transaction_id, error = %fault, attempt, "cancel attempt failed");
                }
                Err(_) => {
                    tracing::warn!(transaction_id, attempt, "cancel attempt timed out");
                }
            }
            if attempt < CANCEL_ATTEMPTS {
                time::sleep(self.config.retry_delay).await;
            }
        }
        false
    }
}
