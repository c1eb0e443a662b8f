//! Checkout submission endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::{
    CheckoutCoordinator, CheckoutReceipt, CheckoutRequest, InMemoryAddressBook,
    InMemoryInventoryService, InMemoryOrderStore, LoggingEventPublisher,
};
use payment::InMemoryPaymentClient;
use supply::InMemorySupplyClient;

use crate::error::ApiError;

/// The coordinator wiring this server runs: in-memory backends behind
/// both gateway seams.
pub type DefaultCoordinator = CheckoutCoordinator<
    InMemoryPaymentClient,
    InMemorySupplyClient,
    InMemoryInventoryService,
    InMemoryOrderStore,
    InMemoryAddressBook,
    LoggingEventPublisher,
>;

/// Shared application state accessible from all handlers.
///
/// The client and service handles share state with the instances inside
/// the coordinator, so catalog seeding and order lookups go through the
/// same data the coordinator sees.
pub struct AppState {
    pub coordinator: DefaultCoordinator,
    pub payment_client: InMemoryPaymentClient,
    pub supply_client: InMemorySupplyClient,
    pub inventory: InMemoryInventoryService,
    pub orders: InMemoryOrderStore,
    pub addresses: InMemoryAddressBook,
}

/// POST /checkout — run one checkout attempt to completion.
#[tracing::instrument(skip(state, request), fields(checkout_id = %request.checkout_id))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), ApiError> {
    let receipt = state.coordinator.checkout(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
