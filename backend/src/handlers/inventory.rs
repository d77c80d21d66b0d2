//! HTTP handlers for stock, discount, cart and purchase endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{
    CartLine, CartTotals, DiscountUpdate, NewStockEntry, Pagination, ProductDetail, ProductsPage,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

/// Body of a product count change
#[derive(Debug, Deserialize)]
pub struct ChangeCountRequest {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub product_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddDiscountRequest {
    pub warehouse_id: Uuid,
    pub discounts: Vec<DiscountUpdate>,
}

/// Cart body shared by the preview and the purchase
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub warehouse_id: Uuid,
    pub products: Vec<CartLine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Stock a product at a warehouse
pub async fn create_inventory(
    State(state): State<AppState>,
    Json(input): Json<NewStockEntry>,
) -> AppResult<StatusCode> {
    state
        .inventory
        .create_inventory(
            input.warehouse_id,
            input.product_id,
            input.quantity,
            input.unit_price,
        )
        .await?;

    Ok(StatusCode::CREATED)
}

/// Increase the stored count of a product
pub async fn change_product_count(
    State(state): State<AppState>,
    Json(input): Json<ChangeCountRequest>,
) -> AppResult<StatusCode> {
    state
        .inventory
        .change_product_count(input.warehouse_id, input.product_id, input.product_count)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Apply a batch of discounts
pub async fn add_discount(
    State(state): State<AppState>,
    Json(input): Json<AddDiscountRequest>,
) -> AppResult<StatusCode> {
    state
        .inventory
        .add_discount_to_products(input.warehouse_id, &input.discounts)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Price a cart without buying
pub async fn check_cart(
    State(state): State<AppState>,
    Json(input): Json<CartRequest>,
) -> AppResult<Json<CartTotals>> {
    let totals = state
        .inventory
        .calculate_cart(input.warehouse_id, &input.products)
        .await?;
    Ok(Json(totals))
}

/// Buy a cart
pub async fn buy(
    State(state): State<AppState>,
    Json(input): Json<CartRequest>,
) -> AppResult<Json<CartTotals>> {
    let totals = state
        .purchases
        .buy_products(input.warehouse_id, &input.products)
        .await?;
    Ok(Json(totals))
}

/// List the products stocked at a warehouse
pub async fn list_products_at_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<ProductsPage>> {
    let pagination = Pagination::from_query(
        query.page,
        query.limit,
        state.inventory.default_page_limit(),
    );
    let page = state
        .inventory
        .get_products_at_warehouse(pagination, warehouse_id)
        .await?;
    Ok(Json(page))
}

/// Get one product with its stock at a warehouse
pub async fn get_product_at_warehouse(
    State(state): State<AppState>,
    Path((warehouse_id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ProductDetail>> {
    let detail = state
        .inventory
        .get_product_from_warehouse(warehouse_id, product_id)
        .await?;
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_request_wire_format() {
        let id = Uuid::new_v4();
        let body = format!(
            r#"{{"warehouse_id": "{id}", "products": [{{"product_id": "{id}", "product_count": 2}}]}}"#
        );
        let request: CartRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(request.products, vec![CartLine::new(id, 2)]);
    }

    #[test]
    fn test_create_request_reads_price_as_decimal() {
        let body = format!(
            r#"{{"warehouse_id": "{}", "product_id": "{}", "product_count": 10, "product_price": 19.99}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let entry: NewStockEntry = serde_json::from_str(&body).unwrap();
        assert_eq!(entry.unit_price, Decimal::new(1999, 2));
    }
}
