//! Business logic services

pub mod analytics;
pub mod catalog;
pub mod inventory;
pub mod purchase;

pub use analytics::{
    AnalyticsDispatcher, AnalyticsRecorder, AnalyticsService, AnalyticsWorker, DispatchStats,
    DispatchStatsSnapshot,
};
pub use catalog::{ProductService, WarehouseService};
pub use inventory::InventoryService;
pub use purchase::{PurchasePhase, PurchaseService};

use crate::repository::StockTransaction;

/// Roll back after a failed step; the step's own error is what the caller reports
pub(crate) async fn roll_back(tx: Box<dyn StockTransaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
