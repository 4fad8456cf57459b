//! Order workflow endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{PlaceOrder, UpdateOrderStatus};
use record_store::{Order, OrderStatus, RecordStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct AdminOrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<String>,
}

// -- Handlers --

/// POST /orders/place — place an order (farmer).
#[tracing::instrument(skip(state, user, request))]
pub async fn place<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Json(request): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.workflow.place_order(&user.0, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order,
        }),
    ))
}

/// GET /orders/farmer/my-orders — list the farmer's own orders.
#[tracing::instrument(skip(state, user))]
pub async fn farmer_orders<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.workflow.farmer_orders(&user.0).await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// PATCH /orders/farmer/:id/cancel — cancel an order (farmer).
#[tracing::instrument(skip(state, user))]
pub async fn cancel<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.workflow.cancel_order(&user.0, order_id).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// GET /orders/dealer/my-orders — list the dealer's incoming orders.
#[tracing::instrument(skip(state, user))]
pub async fn dealer_orders<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.workflow.dealer_orders(&user.0).await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// PATCH /orders/dealer/:id/status — move an order along its lifecycle
/// (dealer).
#[tracing::instrument(skip(state, user, request))]
pub async fn update_status<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderStatus>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .workflow
        .update_status(&user.0, order_id, request)
        .await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// GET /orders/admin/all — list every order, optionally filtered by
/// status (admin).
#[tracing::instrument(skip(state, user))]
pub async fn admin_all<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Query(query): Query<AdminOrdersQuery>,
) -> Result<Json<AdminOrdersResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let orders = state.workflow.all_orders(&user.0, status).await?;
    Ok(Json(AdminOrdersResponse {
        success: true,
        count: orders.len(),
        orders,
    }))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    Uuid::parse_str(id)
        .map(OrderId::from_uuid)
        .map_err(|err| ApiError::BadRequest(format!("Invalid order id: {err}")))
}
