//! Sales analytics
//!
//! Completed purchases hand their sale lines to an [`AnalyticsRecorder`]. The
//! production recorder, [`AnalyticsDispatcher`], queues batches on a bounded
//! channel that a background [`AnalyticsWorker`] drains into the sales ledger.
//! Recording is best-effort: a full queue or a storage failure is counted
//! and logged, never reported to the buyer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use shared::{SaleRecord, WarehouseAnalytics, WarehouseRevenue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repository::SalesLedger;

/// Maximum number of warehouses the ranking returns when none is requested
pub const DEFAULT_TOP_WAREHOUSES: i64 = 10;

/// Receives the sale lines of a committed purchase
pub trait AnalyticsRecorder: Send + Sync {
    /// Must not block or fail the caller
    fn record_sale(&self, records: Vec<SaleRecord>);
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Counters for the analytics queue, in sale records
#[derive(Debug, Default)]
pub struct DispatchStats {
    enqueued: AtomicU64,
    recorded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    pub enqueued: u64,
    pub recorded: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn add(counter: &AtomicU64, records: usize) {
        counter.fetch_add(records as u64, Ordering::Relaxed);
    }
}

/// Queues sale batches for the background worker
#[derive(Clone)]
pub struct AnalyticsDispatcher {
    tx: mpsc::Sender<Vec<SaleRecord>>,
    stats: Arc<DispatchStats>,
}

/// Drains the dispatcher queue into the sales ledger
pub struct AnalyticsWorker {
    rx: mpsc::Receiver<Vec<SaleRecord>>,
    stats: Arc<DispatchStats>,
}

impl AnalyticsDispatcher {
    /// Create a dispatcher and its unstarted worker
    pub fn channel(capacity: usize) -> (Self, AnalyticsWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stats = Arc::new(DispatchStats::default());

        (
            Self {
                tx,
                stats: stats.clone(),
            },
            AnalyticsWorker { rx, stats },
        )
    }

    /// Create a dispatcher with its worker already running.
    ///
    /// The worker stops once every dispatcher clone is dropped and the queue
    /// is empty.
    pub fn spawn(sales: Arc<dyn SalesLedger>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (dispatcher, worker) = Self::channel(capacity);
        (dispatcher, worker.spawn(sales))
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }
}

impl AnalyticsRecorder for AnalyticsDispatcher {
    fn record_sale(&self, records: Vec<SaleRecord>) {
        if records.is_empty() {
            return;
        }

        let count = records.len();
        match self.tx.try_send(records) {
            Ok(()) => DispatchStats::add(&self.stats.enqueued, count),
            Err(mpsc::error::TrySendError::Full(_)) => {
                DispatchStats::add(&self.stats.dropped, count);
                tracing::warn!(records = count, "Analytics queue full, sale records dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                DispatchStats::add(&self.stats.dropped, count);
                tracing::error!(records = count, "Analytics worker stopped, sale records dropped");
            }
        }
    }
}

impl AnalyticsWorker {
    pub fn spawn(self, sales: Arc<dyn SalesLedger>) -> JoinHandle<()> {
        tokio::spawn(self.run(sales))
    }

    pub async fn run(mut self, sales: Arc<dyn SalesLedger>) {
        tracing::debug!("Analytics worker started");

        while let Some(batch) = self.rx.recv().await {
            match sales.record_sales(&batch).await {
                Ok(()) => DispatchStats::add(&self.stats.recorded, batch.len()),
                Err(e) => {
                    DispatchStats::add(&self.stats.failed, batch.len());
                    tracing::error!(records = batch.len(), "Failed to record sales: {}", e);
                }
            }
        }

        tracing::debug!("Analytics worker stopped");
    }
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Clone)]
pub struct AnalyticsService {
    sales: Arc<dyn SalesLedger>,
}

impl AnalyticsService {
    pub fn new(sales: Arc<dyn SalesLedger>) -> Self {
        Self { sales }
    }

    /// Sales of one warehouse, aggregated per product
    #[tracing::instrument(skip(self))]
    pub async fn warehouse_analytics(&self, warehouse_id: Uuid) -> AppResult<WarehouseAnalytics> {
        let sales = self.sales.warehouse_sales(warehouse_id).await?;
        Ok(WarehouseAnalytics::from_sales(warehouse_id, sales))
    }

    /// Warehouses ranked by total revenue
    #[tracing::instrument(skip(self))]
    pub async fn top_warehouses(&self, limit: Option<i64>) -> AppResult<Vec<WarehouseRevenue>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_WAREHOUSES);
        if limit < 1 {
            return Err(AppError::validation("limit", "limit must be at least 1"));
        }
        Ok(self.sales.top_warehouses(limit).await?)
    }
}
