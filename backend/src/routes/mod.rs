//! Route definitions for the Warehouse Inventory API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/warehouses", warehouse_routes())
        .nest("/products", product_routes())
        .nest("/inventory", inventory_routes())
        .nest("/analytics", analytics_routes())
}

/// Warehouses and the stock held at each
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id/products",
            get(handlers::list_products_at_warehouse),
        )
        .route(
            "/:warehouse_id/products/:product_id",
            get(handlers::get_product_at_warehouse),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/:product_id", put(handlers::update_product))
}

/// Stock changes, cart preview and purchase
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_inventory))
        .route("/change_count", post(handlers::change_product_count))
        .route("/add_discount", post(handlers::add_discount))
        .route("/check_cart", post(handlers::check_cart))
        .route("/buy", post(handlers::buy))
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/warehouses/:warehouse_id", get(handlers::warehouse_analytics))
        .route("/top_warehouses", get(handlers::top_warehouses))
}
