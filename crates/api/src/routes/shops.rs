//! Shop registry endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Role, ShopId};
use domain::{CreateShop, authorize};
use record_store::{RecordStore, Shop, ShopStatus, ShopStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateShopStatusRequest {
    pub status: ShopStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct ShopResponse {
    pub success: bool,
    pub shop: Shop,
}

#[derive(Serialize)]
pub struct ShopsResponse {
    pub success: bool,
    pub shops: Vec<Shop>,
}

// -- Handlers --

/// POST /shops — register a shop, pending admin review (dealer).
#[tracing::instrument(skip(state, user, request))]
pub async fn create<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Json(request): Json<CreateShop>,
) -> Result<(StatusCode, Json<ShopResponse>), ApiError> {
    authorize(&user.0, &[Role::Dealer])?;
    request.validate()?;

    let shop = state
        .store
        .save_shop(Shop::new(user.0.id, request.name.trim(), request.address))
        .await?;

    tracing::info!(shop_id = %shop.id, dealer = %user.0.id, "shop registered");

    Ok((
        StatusCode::CREATED,
        Json(ShopResponse {
            success: true,
            shop,
        }),
    ))
}

/// GET /shops/mine — list the dealer's own shops.
#[tracing::instrument(skip(state, user))]
pub async fn mine<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<ShopsResponse>, ApiError> {
    authorize(&user.0, &[Role::Dealer])?;

    let shops = state.store.shops_by_owner(user.0.id).await?;
    Ok(Json(ShopsResponse {
        success: true,
        shops,
    }))
}

/// GET /shops/admin/all — list every shop (admin).
#[tracing::instrument(skip(state, user))]
pub async fn admin_all<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<ShopsResponse>, ApiError> {
    authorize(&user.0, &[Role::Admin])?;

    let shops = state.store.all_shops().await?;
    Ok(Json(ShopsResponse {
        success: true,
        shops,
    }))
}

/// PATCH /shops/admin/:id/status — approve or reject a shop (admin).
#[tracing::instrument(skip(state, user, request))]
pub async fn admin_status<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateShopStatusRequest>,
) -> Result<Json<ShopResponse>, ApiError> {
    authorize(&user.0, &[Role::Admin])?;

    let shop_id = Uuid::parse_str(&id)
        .map(ShopId::from_uuid)
        .map_err(|err| ApiError::BadRequest(format!("Invalid shop id: {err}")))?;

    let mut shop = state
        .store
        .shop(shop_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shop not found".to_string()))?;

    shop.status = request.status;
    let shop = state.store.save_shop(shop).await?;

    tracing::info!(shop_id = %shop.id, status = %shop.status.as_str(), "shop status updated");

    Ok(Json(ShopResponse {
        success: true,
        shop,
    }))
}
