//! Sales analytics handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{WarehouseAnalytics, WarehouseRevenue};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TopWarehousesQuery {
    pub limit: Option<i64>,
}

/// Sales of one warehouse, per product
pub async fn warehouse_analytics(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseAnalytics>> {
    let report = state.analytics.warehouse_analytics(warehouse_id).await?;
    Ok(Json(report))
}

/// Warehouses ranked by revenue
pub async fn top_warehouses(
    State(state): State<AppState>,
    Query(query): Query<TopWarehousesQuery>,
) -> AppResult<Json<Vec<WarehouseRevenue>>> {
    let ranking = state.analytics.top_warehouses(query.limit).await?;
    Ok(Json(ranking))
}
