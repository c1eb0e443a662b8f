//! Order lookup endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{BuyerIdentity, Order, OrderStore};
use common::OrderId;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::checkout::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub store_id: String,
    pub buyer: BuyerIdentity,
    pub status: String,
    pub lines: Vec<OrderLineResponse>,
    pub total_cents: i64,
    pub final_cents: i64,
    pub payment_transaction_id: i64,
    pub delivery_handle: String,
    pub order_date: String,
}

impl OrderResponse {
    fn from_order(order: &Order) -> Self {
        let lines = order
            .products()
            .iter()
            .map(|(product_id, quantity)| OrderLineResponse {
                product_id: product_id.to_string(),
                quantity: *quantity,
            })
            .collect();

        Self {
            id: order.order_id().to_string(),
            store_id: order.store_id().to_string(),
            buyer: order.buyer().clone(),
            status: order.status().to_string(),
            lines,
            total_cents: order.total_price().cents(),
            final_cents: order.final_price().cents(),
            payment_transaction_id: order.payment_transaction_id(),
            delivery_handle: order.delivery_handle().to_string(),
            order_date: order.order_date().to_rfc3339(),
        }
    }
}

/// GET /orders/:id — load a committed order by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .find(order_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(OrderResponse::from_order(&order)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
