//! Warehouse handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::{NewWarehouse, Warehouse};

use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
pub struct WarehousesResponse {
    pub warehouses: Vec<Warehouse>,
}

pub async fn list_warehouses(State(state): State<AppState>) -> AppResult<Json<WarehousesResponse>> {
    let warehouses = state.warehouses.list_warehouses().await?;
    Ok(Json(WarehousesResponse { warehouses }))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<NewWarehouse>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let warehouse = state.warehouses.create_warehouse(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}
