//! Charge front door: validation, retry, and failure classification.

use common::{GatewayConfig, Money, TransportError, VALID_TRANSACTION_IDS};
use tokio::time;

use crate::client::{ChargeOutcome, ChargeRequest, PaymentClient};
use crate::error::PaymentError;
use crate::method::PaymentMethod;
use crate::result::PaymentResult;
use crate::validator;

/// Number of tries a cancel gets before giving up.
const CANCEL_ATTEMPTS: u32 = 2;

/// Front door to the payment processor.
///
/// Validates locally before any remote call, retries transient
/// transport faults with a fixed delay, and never retries an explicit
/// decline. All failures come back classified inside the
/// [`PaymentResult`]; this type does not return errors itself.
pub struct PaymentGateway<C: PaymentClient> {
    client: C,
    config: GatewayConfig,
}

impl<C: PaymentClient> PaymentGateway<C> {
    /// Creates a gateway over a transport client.
    pub fn new(client: C, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Charges `amount` against `method`.
    ///
    /// Invalid requests are rejected before any remote call. A
    /// disabled gateway fails fast as unavailable.
    #[tracing::instrument(skip(self, method), fields(amount = %amount, method = method.kind()))]
    pub async fn charge(&self, method: &PaymentMethod, amount: Money) -> PaymentResult {
        if let Err(error) = validator::validate(method, amount) {
            tracing::debug!(%error, "charge rejected by local validation");
            return PaymentResult::failed(error.into(), method.clone(), amount);
        }
        if !self.config.enabled {
            tracing::warn!("charge refused: payment gateway disabled");
            return PaymentResult::failed(
                PaymentError::Unavailable("payment gateway disabled".to_string()),
                method.clone(),
                amount,
            );
        }

        let request = ChargeRequest {
            method: method.clone(),
            amount,
        };
        let attempts = self.config.retry_attempts.max(1);
        let mut last_fault: Option<TransportError> = None;

        for attempt in 1..=attempts {
            match time::timeout(self.config.request_timeout, self.client.authorize(&request)).await
            {
                Ok(Ok(ChargeOutcome::Approved { transaction_id })) => {
                    if !VALID_TRANSACTION_IDS.contains(&transaction_id) {
                        tracing::error!(transaction_id, "processor issued an out-of-range id");
                        return PaymentResult::failed(
                            PaymentError::Unavailable(
                                "processor issued an out-of-range transaction id".to_string(),
                            ),
                            method.clone(),
                            amount,
                        );
                    }
                    tracing::info!(transaction_id, attempt, "charge approved");
                    return PaymentResult::succeeded(transaction_id, method.clone(), amount);
                }
                Ok(Ok(ChargeOutcome::Declined { reason })) => {
                    tracing::info!(%reason, attempt, "charge declined");
                    return PaymentResult::failed(
                        PaymentError::Declined(reason),
                        method.clone(),
                        amount,
                    );
                }
                Ok(Err(fault)) => {
                    tracing::warn!(error = %fault, attempt, "charge attempt failed");
                    last_fault = Some(fault);
                }
                Err(_) => {
                    tracing::warn!(attempt, "charge attempt timed out");
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
        tracing::warn!(%detail, "charge gave up after {attempts} attempts");
        PaymentResult::failed(PaymentError::Unavailable(detail), method.clone(), amount)
    }

    /// Attempts to void a prior charge, returning true only when the
    /// processor confirmed the cancellation.
    ///
    /// Ids outside the issued space are refused without a remote call.
    /// One transient fault is retried; an unconfirmed cancel is
    /// reported as false, never as an error.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, transaction_id: i64) -> bool {
        if !VALID_TRANSACTION_IDS.contains(&transaction_id) {
            tracing::debug!(transaction_id, "cancel refused: id outside the issued space");
            return false;
        }
        if !self.config.enabled {
            tracing::warn!(transaction_id, "cancel refused: payment gateway disabled");
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
