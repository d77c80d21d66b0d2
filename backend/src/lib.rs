//! Warehouse Inventory backend
//!
//! Stock ledger, purchases and sales analytics behind an axum HTTP API.

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};

use config::InventoryConfig;
use repository::{HealthCheck, ProductCatalog, SalesLedger, StockLedger, WarehouseCatalog};
use services::{
    AnalyticsRecorder, AnalyticsService, DispatchStats, InventoryService, ProductService,
    PurchaseService, WarehouseService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub purchases: PurchaseService,
    pub analytics: AnalyticsService,
    pub warehouses: WarehouseService,
    pub products: ProductService,
    pub health: Arc<dyn HealthCheck>,
    pub dispatch_stats: Option<Arc<DispatchStats>>,
}

impl AppState {
    /// Wire every service to one store
    pub fn new<S>(store: Arc<S>, recorder: Arc<dyn AnalyticsRecorder>, settings: &InventoryConfig) -> Self
    where
        S: StockLedger + WarehouseCatalog + ProductCatalog + SalesLedger + HealthCheck + 'static,
    {
        Self {
            inventory: InventoryService::new(store.clone(), settings.default_page_limit),
            purchases: PurchaseService::new(store.clone(), recorder, settings.purchase_timeout()),
            analytics: AnalyticsService::new(store.clone()),
            warehouses: WarehouseService::new(store.clone()),
            products: ProductService::new(store.clone()),
            health: store,
            dispatch_stats: None,
        }
    }

    /// Report analytics queue counters on the health endpoint
    pub fn with_dispatch_stats(mut self, stats: Arc<DispatchStats>) -> Self {
        self.dispatch_stats = Some(stats);
        self
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Warehouse Inventory API v1.0"
}
