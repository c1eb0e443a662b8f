//! Checkout coordinator orchestrating the saga across both gateways.

use std::collections::{BTreeMap, HashSet};

use common::{CheckoutId, Money, OrderId, StoreId};
use futures_util::stream::{self, StreamExt};
use payment::{PaymentClient, PaymentError, PaymentGateway, PaymentMethod};
use serde::{Deserialize, Serialize};
use supply::{ShipmentDetails, SupplyClient, SupplyError, SupplyGateway, SupplyMethod, SupplyResult};

use crate::buyer::{Address, BuyerIdentity};
use crate::cart::{CartLine, CartSnapshot};
use crate::compensation::{BookedShipment, CompensationManager};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutFailureKind};
use crate::events::CheckoutSagaEvent;
use crate::order::Order;
use crate::saga::CheckoutSaga;
use crate::services::{AddressBook, EventPublisher, InventoryService, OrderCommitted, OrderStore};
use crate::state::CheckoutState;

/// Everything the coordinator needs to run one checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Caller-assigned attempt ID; also keys the stock holds.
    #[serde(default = "CheckoutId::new")]
    pub checkout_id: CheckoutId,
    /// Per-store baskets, immutable once submitted.
    pub cart: CartSnapshot,
    /// The single payment instrument for the whole cart.
    pub payment_method: PaymentMethod,
    /// The delivery instrument shared by every basket.
    pub supply_method: SupplyMethod,
    /// Who is checking out.
    pub buyer: BuyerIdentity,
    /// Explicit delivery address; optional for registered buyers.
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

/// The success result of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub checkout_id: CheckoutId,
    /// Created order IDs, one per basket, in basket order.
    pub order_ids: Vec<OrderId>,
    /// The single charge's transaction ID.
    pub payment_transaction_id: i64,
    /// One delivery handle per basket, in basket order.
    pub tracking_numbers: Vec<String>,
    /// The charged total.
    pub total_amount: Money,
    pub message: String,
}

/// One basket priced against the authoritative catalog.
#[derive(Debug, Clone)]
struct PricedBasket {
    store_id: StoreId,
    products: BTreeMap<common::ProductId, u32>,
    quantity: u32,
    weight_kg: f64,
    amount: Money,
}

/// The whole cart priced, with the resolved delivery address.
#[derive(Debug, Clone)]
struct PricedCart {
    lines: Vec<CartLine>,
    baskets: Vec<PricedBasket>,
    total: Money,
    address: Address,
}

/// Drives a checkout from request to a terminal state.
///
/// The pipeline is validate → reserve → charge → ship(s) → commit. The
/// charge is issued exactly once per attempt and no shipment call is
/// made before it succeeds; any failure after the charge passes through
/// compensation before the caller sees a result.
pub struct CheckoutCoordinator<PC, SC, I, O, A, E>
where
    PC: PaymentClient,
    SC: SupplyClient,
    I: InventoryService,
    O: OrderStore,
    A: AddressBook,
    E: EventPublisher,
{
    payment: PaymentGateway<PC>,
    supply: SupplyGateway<SC>,
    inventory: I,
    orders: O,
    addresses: A,
    publisher: E,
    config: CheckoutConfig,
}

impl<PC, SC, I, O, A, E> CheckoutCoordinator<PC, SC, I, O, A, E>
where
    PC: PaymentClient,
    SC: SupplyClient,
    I: InventoryService,
    O: OrderStore,
    A: AddressBook,
    E: EventPublisher,
{
    /// Creates a new checkout coordinator.
    pub fn new(
        payment: PaymentGateway<PC>,
        supply: SupplyGateway<SC>,
        inventory: I,
        orders: O,
        addresses: A,
        publisher: E,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            payment,
            supply,
            inventory,
            orders,
            addresses,
            publisher,
            config,
        }
    }

    /// Runs one checkout attempt to a terminal state.
    #[tracing::instrument(
        skip(self, request),
        fields(checkout_id = %request.checkout_id, baskets = request.cart.basket_count())
    )]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let mut saga = CheckoutSaga::new();
        let result = self.drive(&mut saga, &request).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    orders = receipt.order_ids.len(),
                    total = %receipt.total_amount,
                    duration,
                    "checkout committed"
                );
            }
            Err(error) => {
                metrics::counter!("checkout_failed").increment(1);
                tracing::warn!(kind = %error.kind(), %error, duration, "checkout failed");
            }
        }
        debug_assert!(saga.state().is_terminal());

        result
    }

    async fn drive(
        &self,
        saga: &mut CheckoutSaga,
        request: &CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        saga.record(CheckoutSagaEvent::checkout_started(
            request.checkout_id,
            request.cart.basket_count(),
        ));

        // 1. Validate everything locally before touching any external system.
        let priced = match self.validate_and_price(request).await {
            Ok(priced) => priced,
            Err(error) => return Err(self.fail(saga, error)),
        };
        saga.record(CheckoutSagaEvent::cart_validated(priced.total));

        // 2. Reserve stock for every line; a partial failure unwinds itself.
        if let Err(error) = self.reserve_stock(request.checkout_id, &priced.lines).await {
            return Err(self.fail(saga, error));
        }
        saga.record(CheckoutSagaEvent::stock_reserved(priced.lines.clone()));

        // 3. One charge for the entire cart.
        saga.record(CheckoutSagaEvent::charge_requested(priced.total));
        let charge = self
            .payment
            .charge(&request.payment_method, priced.total)
            .await;
        if !charge.is_success() {
            let error = charge
                .error()
                .cloned()
                .map(CheckoutError::from)
                .unwrap_or_else(|| {
                    CheckoutError::PaymentUnavailable("charge failed without detail".to_string())
                });
            // Nothing external to cancel yet, just give the stock back.
            self.release_lines(request.checkout_id, &priced.lines).await;
            return Err(self.fail(saga, error));
        }
        let payment_transaction_id = charge.transaction_id();
        saga.record(CheckoutSagaEvent::charge_succeeded(payment_transaction_id));

        // 4. Fan out one shipment per basket and wait for every outcome.
        saga.record(CheckoutSagaEvent::shipments_requested(priced.baskets.len()));
        let results = self.dispatch_shipments(request, &priced).await;

        let mut booked = Vec::new();
        let mut first_failure: Option<CheckoutError> = None;
        for (basket, result) in priced.baskets.iter().zip(&results) {
            if result.is_success() {
                saga.record(CheckoutSagaEvent::shipment_booked(
                    basket.store_id,
                    result.transaction_id(),
                    result.tracking_number().map(str::to_string),
                ));
                booked.push(BookedShipment {
                    store_id: basket.store_id,
                    transaction_id: result.transaction_id(),
                });
            } else {
                let error = result
                    .error()
                    .cloned()
                    .map(CheckoutError::from)
                    .unwrap_or_else(|| {
                        CheckoutError::SupplyUnavailable(
                            "shipment failed without detail".to_string(),
                        )
                    });
                saga.record(CheckoutSagaEvent::shipment_failed(
                    basket.store_id,
                    error.to_string(),
                ));
                if first_failure.is_none() {
                    first_failure = Some(error);
                }
            }
        }

        if let Some(error) = first_failure {
            return Err(self
                .compensate(
                    saga,
                    request.checkout_id,
                    Some(payment_transaction_id),
                    &booked,
                    &priced.lines,
                    error,
                )
                .await);
        }

        // 5. Commit: one order per basket, then permanent stock decrements.
        self.commit(saga, request, &priced, payment_transaction_id, &results)
            .await
    }

    async fn validate_and_price(
        &self,
        request: &CheckoutRequest,
    ) -> Result<PricedCart, CheckoutError> {
        if request.cart.is_empty() {
            return Err(CheckoutError::Validation("cart is empty".to_string()));
        }
        let mut seen_stores = HashSet::new();
        for basket in request.cart.baskets() {
            if !seen_stores.insert(basket.store_id()) {
                return Err(CheckoutError::Validation(format!(
                    "duplicate basket for store {}",
                    basket.store_id()
                )));
            }
            if basket.is_empty() {
                return Err(CheckoutError::Validation(format!(
                    "basket for store {} is empty",
                    basket.store_id()
                )));
            }
        }

        payment::validator::validate_method(&request.payment_method)
            .map_err(PaymentError::from)?;
        supply::validator::validate_method(&request.supply_method).map_err(SupplyError::from)?;

        let address = self.resolve_address(request).await?;

        let mut lines = Vec::new();
        let mut baskets = Vec::with_capacity(request.cart.basket_count());
        let mut total = Money::zero();
        for basket in request.cart.baskets() {
            let store_id = basket.store_id();
            if !self.inventory.store_active(store_id).await? {
                return Err(CheckoutError::Validation(format!(
                    "store {store_id} is not active"
                )));
            }

            let mut amount = Money::zero();
            let mut quantity: u32 = 0;
            let mut weight_kg = 0.0_f64;
            for (product_id, qty) in basket.items() {
                if qty == 0 {
                    return Err(CheckoutError::Validation(format!(
                        "quantity for product {product_id} must be positive"
                    )));
                }
                // Price, weight, and availability come from the catalog,
                // never from the request.
                let offer = self.inventory.offer(store_id, product_id).await?;
                if offer.available < qty {
                    return Err(CheckoutError::Validation(format!(
                        "insufficient stock for {product_id}: requested {qty}, available {}",
                        offer.available
                    )));
                }
                amount += offer.unit_price.multiply(qty);
                quantity += qty;
                weight_kg += offer.unit_weight_kg * f64::from(qty);
                lines.push(CartLine {
                    store_id,
                    product_id: product_id.clone(),
                    quantity: qty,
                });
            }
            total += amount;
            baskets.push(PricedBasket {
                store_id,
                products: basket.items_map().clone(),
                quantity,
                weight_kg,
                amount,
            });
        }

        payment::validator::validate_amount(total).map_err(PaymentError::from)?;

        Ok(PricedCart {
            lines,
            baskets,
            total,
            address,
        })
    }

    async fn resolve_address(&self, request: &CheckoutRequest) -> Result<Address, CheckoutError> {
        match &request.buyer {
            BuyerIdentity::Guest { contact_email } => {
                if !common::email::is_valid(contact_email) {
                    return Err(CheckoutError::Validation(
                        "guest contact email is invalid".to_string(),
                    ));
                }
                match &request.shipping_address {
                    Some(address) if address.is_complete() => Ok(address.clone()),
                    Some(_) => Err(CheckoutError::Validation(
                        "shipping address is incomplete".to_string(),
                    )),
                    None => Err(CheckoutError::Validation(
                        "guest checkout requires a shipping address".to_string(),
                    )),
                }
            }
            BuyerIdentity::Registered { buyer_id } => {
                if let Some(address) = &request.shipping_address {
                    return if address.is_complete() {
                        Ok(address.clone())
                    } else {
                        Err(CheckoutError::Validation(
                            "shipping address is incomplete".to_string(),
                        ))
                    };
                }
                let fallback = self
                    .addresses
                    .default_address(*buyer_id)
                    .await
                    .map_err(|err| CheckoutError::Validation(err.to_string()))?;
                match fallback {
                    Some(address) if address.is_complete() => Ok(address),
                    _ => Err(CheckoutError::Validation(format!(
                        "no shipping address on file for buyer {buyer_id}"
                    ))),
                }
            }
        }
    }

    async fn reserve_stock(
        &self,
        checkout_id: CheckoutId,
        lines: &[CartLine],
    ) -> Result<(), CheckoutError> {
        for (index, line) in lines.iter().enumerate() {
            if let Err(err) = self
                .inventory
                .reserve(checkout_id, line.store_id, &line.product_id, line.quantity)
                .await
            {
                // Give back the holds placed so far.
                self.release_lines(checkout_id, &lines[..index]).await;
                return Err(err.into());
            }
        }
        Ok(())
    }

    async fn release_lines(&self, checkout_id: CheckoutId, lines: &[CartLine]) {
        for line in lines {
            if let Err(err) = self
                .inventory
                .release(checkout_id, line.store_id, &line.product_id)
                .await
            {
                tracing::warn!(
                    checkout_id = %checkout_id,
                    product_id = %line.product_id,
                    error = %err,
                    "failed to release stock hold"
                );
            }
        }
    }

    /// Best-effort removal of orders inserted before a commit failure.
    async fn remove_orders(&self, order_ids: &[OrderId]) {
        for order_id in order_ids {
            if let Err(err) = self.orders.remove(*order_id).await {
                tracing::error!(
                    order_id = %order_id,
                    error = %err,
                    "failed to remove order during unwind, manual reconciliation required"
                );
            }
        }
    }

    /// Issues every shipment call with bounded parallelism and returns the
    /// outcomes in basket order.
    async fn dispatch_shipments(
        &self,
        request: &CheckoutRequest,
        priced: &PricedCart,
    ) -> Vec<SupplyResult> {
        let concurrency = self.config.shipment_concurrency.max(1);
        // Each call owns its inputs so the futures carry no borrow of the
        // priced cart into the pool.
        let calls: Vec<(usize, ShipmentDetails, SupplyMethod, f64)> = priced
            .baskets
            .iter()
            .enumerate()
            .map(|(index, basket)| {
                let details = ShipmentDetails::new(
                    format!("{}/{}", request.checkout_id, basket.store_id),
                    priced.address.to_string(),
                    basket.quantity,
                    request.buyer.label(),
                    request.buyer.is_guest(),
                );
                (index, details, request.supply_method.clone(), basket.weight_kg)
            })
            .collect();

        let mut outcomes: Vec<(usize, SupplyResult)> = stream::iter(calls)
            .map(|(index, details, method, weight_kg)| async move {
                let result = self.supply.ship(&method, &details, weight_kg).await;
                (index, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, result)| result).collect()
    }

    /// Unwinds every succeeded leg, records the report, and fails the saga
    /// with the error that triggered compensation.
    async fn compensate(
        &self,
        saga: &mut CheckoutSaga,
        checkout_id: CheckoutId,
        charge: Option<i64>,
        booked: &[BookedShipment],
        reserved: &[CartLine],
        error: CheckoutError,
    ) -> CheckoutError {
        saga.record(CheckoutSagaEvent::compensation_started(error.to_string()));
        metrics::counter!("compensation_runs_total").increment(1);

        let manager = CompensationManager::new(&self.payment, &self.supply, &self.inventory);
        let report = manager.run(checkout_id, charge, booked, reserved).await;
        for leg in &report.legs {
            saga.record(CheckoutSagaEvent::compensation_leg_settled(
                leg.target.clone(),
                leg.cancelled,
                leg.detail.clone(),
            ));
        }
        if !report.is_complete() {
            metrics::counter!("compensation_partial_failures_total").increment(1);
            tracing::error!(
                checkout_id = %checkout_id,
                kind = %CheckoutFailureKind::CompensationPartialFailure,
                failed_legs = report.failed_legs().count(),
                "compensation incomplete, manual reconciliation required"
            );
        }

        self.fail(saga, error)
    }

    async fn commit(
        &self,
        saga: &mut CheckoutSaga,
        request: &CheckoutRequest,
        priced: &PricedCart,
        payment_transaction_id: i64,
        results: &[SupplyResult],
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let mut staged = Vec::with_capacity(priced.baskets.len());
        let mut tracking_numbers = Vec::with_capacity(priced.baskets.len());
        let mut commit_failure: Option<String> = None;

        // Build and complete every order before the first insert, so a
        // bad basket creates nothing.
        for (basket, result) in priced.baskets.iter().zip(results) {
            let delivery_handle = result
                .tracking_number()
                .map(str::to_string)
                .unwrap_or_else(|| result.transaction_id().to_string());

            let mut order = Order::new(
                basket.store_id,
                request.buyer.clone(),
                basket.products.clone(),
                basket.amount,
                payment_transaction_id,
                delivery_handle.clone(),
            );
            if let Err(err) = order.complete() {
                commit_failure = Some(err.to_string());
                break;
            }
            staged.push(order);
            tracking_numbers.push(delivery_handle);
        }

        let mut order_ids = Vec::with_capacity(staged.len());
        if commit_failure.is_none() {
            for order in staged {
                let order_id = order.order_id();
                if let Err(err) = self.orders.insert(order).await {
                    commit_failure = Some(err.to_string());
                    break;
                }
                order_ids.push(order_id);
            }
        }

        if let Some(reason) = commit_failure {
            // Money is captured and parcels are booked. Unwind all of it
            // and hand the mess to reconciliation.
            tracing::error!(
                checkout_id = %request.checkout_id,
                inserted_orders = ?order_ids,
                payment_transaction_id,
                reason = %reason,
                "order commit failed after charge and shipments, manual reconciliation required"
            );
            // A failed checkout must leave no order behind.
            self.remove_orders(&order_ids).await;
            let booked: Vec<BookedShipment> = priced
                .baskets
                .iter()
                .zip(results)
                .map(|(basket, result)| BookedShipment {
                    store_id: basket.store_id,
                    transaction_id: result.transaction_id(),
                })
                .collect();
            let error = CheckoutError::Internal(reason);
            return Err(self
                .compensate(
                    saga,
                    request.checkout_id,
                    Some(payment_transaction_id),
                    &booked,
                    &priced.lines,
                    error,
                )
                .await);
        }

        // Turn the holds into permanent decrements. A failure here leaves
        // a stray hold behind, never a failed checkout.
        for line in &priced.lines {
            if let Err(err) = self
                .inventory
                .commit(request.checkout_id, line.store_id, &line.product_id)
                .await
            {
                tracing::warn!(
                    checkout_id = %request.checkout_id,
                    product_id = %line.product_id,
                    error = %err,
                    "stock commit failed, hold left in place"
                );
            }
        }

        saga.record(CheckoutSagaEvent::checkout_committed(order_ids.clone()));
        self.publisher
            .publish(OrderCommitted::new(
                request.checkout_id,
                order_ids.clone(),
                payment_transaction_id,
                priced.total,
            ))
            .await;

        let message = format!("Checkout completed: {} order(s) placed", order_ids.len());
        Ok(CheckoutReceipt {
            checkout_id: request.checkout_id,
            order_ids,
            payment_transaction_id,
            tracking_numbers,
            total_amount: priced.total,
            message,
        })
    }

    /// Records the terminal failure event and hands the error back.
    fn fail(&self, saga: &mut CheckoutSaga, error: CheckoutError) -> CheckoutError {
        saga.record(CheckoutSagaEvent::checkout_failed(
            error.kind(),
            error.to_string(),
        ));
        debug_assert_eq!(saga.state(), CheckoutState::Failed);
        error
    }
}
