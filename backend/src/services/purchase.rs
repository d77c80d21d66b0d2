//! Purchase flow
//!
//! A purchase locks every requested row, checks all quantities, then
//! decrements them in one transaction. Either every line is decremented or
//! none is. Sale records go to the analytics recorder after commit and never
//! affect the outcome.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{price_cart, validate_cart, CartLine, CartTotals, SaleRecord, StockSnapshot};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repository::{StockLedger, StockTransaction, StoreError};

use super::{roll_back, AnalyticsRecorder};

/// Stage a purchase has reached; recorded on the purchase span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchasePhase {
    Validating,
    Locking,
    Decrementing,
    Committed,
    Failed,
    RolledBack,
}

impl fmt::Display for PurchasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PurchasePhase::Validating => "validating",
            PurchasePhase::Locking => "locking",
            PurchasePhase::Decrementing => "decrementing",
            PurchasePhase::Committed => "committed",
            PurchasePhase::Failed => "failed",
            PurchasePhase::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct PurchaseService {
    ledger: Arc<dyn StockLedger>,
    recorder: Arc<dyn AnalyticsRecorder>,
    timeout: Duration,
}

impl PurchaseService {
    pub fn new(
        ledger: Arc<dyn StockLedger>,
        recorder: Arc<dyn AnalyticsRecorder>,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            recorder,
            timeout,
        }
    }

    /// Buy every line of the cart from one warehouse
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len(), phase = tracing::field::Empty))]
    pub async fn buy_products(
        &self,
        warehouse_id: Uuid,
        lines: &[CartLine],
    ) -> AppResult<CartTotals> {
        let span = tracing::Span::current();
        span.record("phase", tracing::field::display(PurchasePhase::Validating));
        validate_cart(lines)?;

        // On expiry the transaction future is dropped, which rolls it back
        let totals = match tokio::time::timeout(self.timeout, self.execute(warehouse_id, lines))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                span.record("phase", tracing::field::display(PurchasePhase::RolledBack));
                tracing::warn!(timeout = ?self.timeout, "Purchase timed out");
                return Err(AppError::Timeout);
            }
        };

        let sold_at = Utc::now();
        let records: Vec<SaleRecord> = totals
            .products
            .iter()
            .map(|line| SaleRecord::from_line(warehouse_id, line, sold_at))
            .collect();
        self.recorder.record_sale(records);

        tracing::info!(
            total_price = %totals.total_price,
            total_price_with_discount = %totals.total_price_with_discount,
            "Purchase completed"
        );
        Ok(totals)
    }

    async fn execute(&self, warehouse_id: Uuid, lines: &[CartLine]) -> AppResult<CartTotals> {
        let span = tracing::Span::current();
        let mut tx = self.ledger.begin().await?;

        match lock_and_decrement(&mut tx, warehouse_id, lines).await {
            Ok(totals) => {
                if let Err(e) = tx.commit().await {
                    span.record("phase", tracing::field::display(PurchasePhase::Failed));
                    return Err(e.into());
                }
                span.record("phase", tracing::field::display(PurchasePhase::Committed));
                Ok(totals)
            }
            Err(err) => {
                roll_back(tx).await;
                span.record("phase", tracing::field::display(PurchasePhase::RolledBack));
                Err(err)
            }
        }
    }
}

async fn lock_and_decrement(
    tx: &mut Box<dyn StockTransaction>,
    warehouse_id: Uuid,
    lines: &[CartLine],
) -> AppResult<CartTotals> {
    let span = tracing::Span::current();
    span.record("phase", tracing::field::display(PurchasePhase::Locking));

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let locked = tx.fetch_for_update(warehouse_id, &product_ids).await?;
    let snapshots: HashMap<Uuid, StockSnapshot> = locked
        .into_iter()
        .map(|row| (row.product_id, row.snapshot))
        .collect();

    let missing: Vec<Uuid> = product_ids
        .iter()
        .filter(|id| !snapshots.contains_key(id))
        .copied()
        .collect();
    if !missing.is_empty() {
        tracing::debug!(?missing, "Products not stocked at warehouse");
        return Err(AppError::ProductsNotAtWarehouse(missing));
    }

    span.record("phase", tracing::field::display(PurchasePhase::Decrementing));
    for line in lines {
        let available = snapshots
            .get(&line.product_id)
            .map(|s| s.quantity)
            .unwrap_or_default();
        if available < line.quantity {
            tracing::debug!(
                product_id = %line.product_id,
                requested = line.quantity,
                available,
                "Not enough stock"
            );
            return Err(AppError::NotEnoughProductCount(line.product_id));
        }
    }

    // Prices come from the rows read under lock
    let totals = price_cart(lines, &snapshots)?;

    for line in lines {
        tx.decrement_quantity(warehouse_id, line.product_id, line.quantity)
            .await
            .map_err(|e| match e {
                StoreError::InsufficientQuantity(id) => AppError::NotEnoughProductCount(id),
                other => other.into(),
            })?;
    }

    Ok(totals)
}
