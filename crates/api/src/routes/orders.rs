//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hello_laundry_core::{OrderId, OrderStatus, PaymentStatus, Price};

use crate::error::{AppJson, Result};
use crate::middleware::RequireAuth;
use crate::models::OrderLine;
use crate::services::OrderService;
use crate::state::AppState;

/// Response body for `POST /api/order/place`.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Price,
    pub items: Vec<OrderLine>,
}

/// Request body for `PATCH /api/order/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Request body for `PATCH /api/order/{id}/payment-status`.
#[derive(Debug, Deserialize)]
pub struct SetPaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Response body for the status-change endpoints.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Convert the caller's active cart into a pending order.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PlaceOrderResponse>> {
    let (order, items) = OrderService::new(state.pool()).place(user.id).await?;

    tracing::info!(order_id = %order.id, total = %order.total_price, "Order placed");

    Ok(Json(PlaceOrderResponse {
        success: true,
        order_id: order.id,
        status: order.status,
        payment_status: order.payment_status,
        total_price: order.total_price,
        items,
    }))
}

/// Change an order's fulfilment status.
#[instrument(skip(state, body))]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(body): AppJson<SetStatusRequest>,
) -> Result<Json<StatusResponse>> {
    let order = OrderService::new(state.pool())
        .set_status(OrderId::new(id), body.status)
        .await?;

    Ok(Json(StatusResponse {
        success: true,
        order_id: order.id,
        status: order.status,
        payment_status: order.payment_status,
    }))
}

/// Change an order's payment status.
#[instrument(skip(state, body))]
pub async fn set_payment_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(body): AppJson<SetPaymentStatusRequest>,
) -> Result<Json<StatusResponse>> {
    let order = OrderService::new(state.pool())
        .set_payment_status(OrderId::new(id), body.payment_status)
        .await?;

    Ok(Json(StatusResponse {
        success: true,
        order_id: order.id,
        status: order.status,
        payment_status: order.payment_status,
    }))
}
