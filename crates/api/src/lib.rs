//! HTTP API server for the marketplace backend.
//!
//! Wires the axum surface to the domain services: JWT-authenticated
//! routes for orders, products, shops and notifications, plus public
//! auth, health and Prometheus metrics endpoints. Generic over
//! `S: RecordStore`, so the same app runs on the in-memory store in tests
//! and PostgreSQL in production.

pub mod auth;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod routes;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use domain::{Catalog, OrderWorkflow};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::RecordStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::{JwtConfig, JwtService};
use config::Config;
use upload::{UnconfiguredUploader, UploadService};

/// Shared application state accessible from all handlers.
pub struct AppState<S: RecordStore> {
    pub store: S,
    pub workflow: OrderWorkflow<S>,
    pub catalog: Catalog<S>,
    pub jwt: JwtService,
    pub uploader: Arc<dyn UploadService>,
}

/// Builds the application state from a store and the process config.
///
/// Service handles are constructed exactly once here and injected; nothing
/// lives in module-level globals.
pub fn create_state<S: RecordStore>(store: S, config: &Config) -> Arc<AppState<S>> {
    Arc::new(AppState {
        workflow: OrderWorkflow::new(store.clone()),
        catalog: Catalog::new(store.clone()),
        jwt: JwtService::new(&JwtConfig {
            secret: config.jwt_secret.clone(),
            expiry_hours: config.jwt_expiry_hours,
        }),
        uploader: Arc::new(UnconfiguredUploader::new(config.upload_base_url.clone())),
        store,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RecordStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/register", post(routes::auth::register::<S>))
        .route("/auth/login", post(routes::auth::login::<S>))
        .route("/orders/place", post(routes::orders::place::<S>))
        .route(
            "/orders/farmer/my-orders",
            get(routes::orders::farmer_orders::<S>),
        )
        .route(
            "/orders/farmer/{id}/cancel",
            patch(routes::orders::cancel::<S>),
        )
        .route(
            "/orders/dealer/my-orders",
            get(routes::orders::dealer_orders::<S>),
        )
        .route(
            "/orders/dealer/{id}/status",
            patch(routes::orders::update_status::<S>),
        )
        .route("/orders/admin/all", get(routes::orders::admin_all::<S>))
        .route("/products/browse", get(routes::products::browse::<S>))
        .route(
            "/products/dealer/list",
            get(routes::products::dealer_list::<S>),
        )
        .route("/products/dealer/add", post(routes::products::add::<S>))
        .route(
            "/products/dealer/{id}",
            put(routes::products::update::<S>).delete(routes::products::delete::<S>),
        )
        .route("/shops", post(routes::shops::create::<S>))
        .route("/shops/mine", get(routes::shops::mine::<S>))
        .route("/shops/admin/all", get(routes::shops::admin_all::<S>))
        .route(
            "/shops/admin/{id}/status",
            patch(routes::shops::admin_status::<S>),
        )
        .route("/notifications", get(routes::notifications::list::<S>))
        .route(
            "/notifications/{id}/read",
            patch(routes::notifications::mark_read::<S>),
        )
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
