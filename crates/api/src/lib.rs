//! HTTP front door for the checkout orchestrator.
//!
//! Exposes checkout submission and order lookup endpoints, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutConfig, CheckoutCoordinator, InMemoryAddressBook, InMemoryInventoryService,
    InMemoryOrderStore, LoggingEventPublisher,
};
use common::GatewayConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use payment::{InMemoryPaymentClient, PaymentGateway};
use supply::{InMemorySupplyClient, SupplyGateway};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::checkout::{AppState, DefaultCoordinator};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::submit))
        .route("/orders/{id}", get(routes::orders::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: the coordinator wired to
/// in-memory backends, with gateway settings read from the environment.
pub fn create_default_state() -> Arc<AppState> {
    let payment_client = InMemoryPaymentClient::new();
    let supply_client = InMemorySupplyClient::new();
    let inventory = InMemoryInventoryService::new();
    let orders = InMemoryOrderStore::new();
    let addresses = InMemoryAddressBook::new();

    let coordinator = CheckoutCoordinator::new(
        PaymentGateway::new(
            payment_client.clone(),
            GatewayConfig::from_env("PAYMENT_GATEWAY", "http://localhost:9000"),
        ),
        SupplyGateway::new(
            supply_client.clone(),
            GatewayConfig::from_env("SUPPLY_GATEWAY", "http://localhost:9100"),
        ),
        inventory.clone(),
        orders.clone(),
        addresses.clone(),
        LoggingEventPublisher::new(),
        CheckoutConfig::from_env(),
    );

    Arc::new(AppState {
        coordinator,
        payment_client,
        supply_client,
        inventory,
        orders,
        addresses,
    })
}
