//! # Order Routes
//!
//! Writes go through [`OrderService`] so every committed change is pushed
//! to the live feed; reads hit the repository directly.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use dinein_core::{
    CoreError, NewOrder, NewPayment, Order, OrderDetail, OrderStatus, OrderStatusLog, Payment,
    StatusChange,
};

use crate::error::ApiError;
use crate::services::OrderService;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}

pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderListQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.db.orders().list(query.status).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetail>), ApiError> {
    let Json(new_order) = payload?;
    let detail = OrderService::new(&state).place_order(&new_order).await?;
    info!(
        order_id = detail.order.id,
        table_id = detail.order.table_id,
        total = %detail.order.total(),
        lines = detail.items.len(),
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderDetail>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.db.orders().get_detail(id).await?))
}

pub async fn order_logs(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<OrderStatusLog>>, ApiError> {
    let Path(id) = id?;
    let orders = state.db.orders();
    if orders.get_by_id(id).await?.is_none() {
        return Err(CoreError::OrderNotFound(id).into());
    }
    Ok(Json(orders.status_logs(id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<StatusChange>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let change = OrderService::new(&state)
        .set_status(id, request.status)
        .await?;
    Ok(Json(change))
}

pub async fn pay_order(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payment) = payload?;
    let receipt = OrderService::new(&state).pay(id, &payment).await?;
    Ok(Json(PaymentResponse {
        payment: receipt.payment,
        old_status: receipt.change.old_status,
        new_status: receipt.change.new_status,
    }))
}
