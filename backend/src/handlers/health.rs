//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::DispatchStatsSnapshot;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<DispatchStatsSnapshot>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let db_status = match state.health.ping().await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!("Database probe failed: {}", e);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        analytics: state.dispatch_stats.as_ref().map(|s| s.snapshot()),
    })
}
