//! Catalog endpoints: dealer-side management and farmer browsing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use common::{Money, ProductId, ShopId};
use domain::{AddProduct, UpdateProduct};
use record_store::{Product, ProductFilter, RecordStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddProductRequest {
    #[serde(flatten)]
    pub product: AddProduct,

    /// Optional base64-encoded image, forwarded to the upload service.
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    #[serde(flatten)]
    pub product: UpdateProduct,

    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Minimum unit price in paise (inclusive).
    pub min_price: Option<i64>,
    /// Maximum unit price in paise (inclusive).
    pub max_price: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

/// Farmer-facing product view.
///
/// Deliberately omits `warehouse_quantity` and the publication flags:
/// farmers only ever see the visible stock of orderable products.
#[derive(Serialize)]
pub struct BrowseProduct {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub price: Money,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl From<Product> for BrowseProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            shop_id: product.shop_id,
            name: product.name,
            category: product.category,
            description: product.description,
            unit: product.unit,
            price: product.price,
            quantity: product.quantity,
            image_url: product.image_url,
        }
    }
}

#[derive(Serialize)]
pub struct BrowseResponse {
    pub success: bool,
    pub products: Vec<BrowseProduct>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

// -- Handlers --

/// GET /products/browse — list orderable products (farmer).
#[tracing::instrument(skip(state, user))]
pub async fn browse<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, ApiError> {
    let mut filter = ProductFilter::new();
    if let Some(search) = query.search {
        filter = filter.search(search);
    }
    if let Some(category) = query.category {
        filter = filter.category(category);
    }
    if let Some(min) = query.min_price {
        filter = filter.min_price(Money::from_paise(min));
    }
    if let Some(max) = query.max_price {
        filter = filter.max_price(Money::from_paise(max));
    }

    let products = state.catalog.browse(&user.0, &filter).await?;
    Ok(Json(BrowseResponse {
        success: true,
        products: products.into_iter().map(BrowseProduct::from).collect(),
    }))
}

/// GET /products/dealer/list — list the dealer's own products.
#[tracing::instrument(skip(state, user))]
pub async fn dealer_list<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state.catalog.dealer_products(&user.0).await?;
    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

/// POST /products/dealer/add — add a product to an approved shop (dealer).
#[tracing::instrument(skip(state, user, request))]
pub async fn add<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Json(request): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let image_url = resolve_image(&state, request.image_base64.as_deref()).await?;
    let product = state
        .catalog
        .add_product(&user.0, request.product, image_url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// PUT /products/dealer/:id — sparse-update one of the dealer's products.
#[tracing::instrument(skip(state, user, request))]
pub async fn update<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let image_url = resolve_image(&state, request.image_base64.as_deref()).await?;
    let product = state
        .catalog
        .update_product(&user.0, product_id, request.product, image_url)
        .await?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// DELETE /products/dealer/:id — remove one of the dealer's products.
#[tracing::instrument(skip(state, user))]
pub async fn delete<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.catalog.delete_product(&user.0, product_id).await?;

    Ok(Json(DeletedResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}

/// Decodes an inline image and hands it to the upload service.
async fn resolve_image<S: RecordStore>(
    state: &AppState<S>,
    image_base64: Option<&str>,
) -> Result<Option<String>, ApiError> {
    match image_base64 {
        None => Ok(None),
        Some(encoded) => {
            let bytes = BASE64
                .decode(encoded)
                .map_err(|err| ApiError::BadRequest(format!("Invalid image encoding: {err}")))?;
            Ok(Some(state.uploader.store(&bytes, "products").await))
        }
    }
}

fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    Uuid::parse_str(id)
        .map(ProductId::from_uuid)
        .map_err(|err| ApiError::BadRequest(format!("Invalid product id: {err}")))
}
