//! Product catalog handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{NewProduct, Product, ProductUpdate};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

/// Response for list of products
#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<ProductsResponse>> {
    let products = state.products.list_products().await?;
    Ok(Json(ProductsResponse { products }))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.products.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update the given fields of a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductUpdate>,
) -> AppResult<StatusCode> {
    state.products.update_product(product_id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
