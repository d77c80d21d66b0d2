//! Analytics tests
//!
//! - Sale records reach the sales ledger through the background worker
//! - A failing sales ledger never fails the purchase
//! - Per-warehouse reports and the revenue ranking

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use shared::{CartLine, ProductSale, SaleRecord, WarehouseRevenue};
use uuid::Uuid;
use wms_backend::config::InventoryConfig;
use wms_backend::repository::{
    MemoryStore, ProductCatalog, SalesLedger, StoreError, StoreResult, WarehouseCatalog,
};
use wms_backend::services::{AnalyticsDispatcher, AnalyticsRecorder, PurchaseService};
use wms_backend::{AppState, ErrorKind};

use common::TestContext;

/// Sales ledger that rejects every write
struct BrokenSalesLedger;

#[async_trait]
impl SalesLedger for BrokenSalesLedger {
    async fn record_sales(&self, _records: &[SaleRecord]) -> StoreResult<()> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn warehouse_sales(&self, _warehouse_id: Uuid) -> StoreResult<Vec<ProductSale>> {
        Ok(Vec::new())
    }

    async fn top_warehouses(&self, _limit: i64) -> StoreResult<Vec<WarehouseRevenue>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_dispatcher_records_purchase_lines() {
    let store = Arc::new(MemoryStore::new());
    let (dispatcher, worker) = AnalyticsDispatcher::spawn(store.clone(), 16);
    let stats = dispatcher.stats();
    let state = AppState::new(store.clone(), Arc::new(dispatcher), &InventoryConfig::default());

    let warehouse = store
        .create_warehouse(&shared::NewWarehouse {
            address: "5 Freight Lane".to_string(),
        })
        .await
        .unwrap()
        .id;
    let product = store
        .create_product(&shared::NewProduct {
            name: "Drum".to_string(),
            weight: 15.0,
            description: String::new(),
            params: None,
            barcode: String::new(),
        })
        .await
        .unwrap()
        .id;
    state
        .inventory
        .create_inventory(warehouse, product, 20, dec!(30))
        .await
        .unwrap();

    state
        .purchases
        .buy_products(warehouse, &[CartLine::new(product, 2)])
        .await
        .unwrap();
    state
        .purchases
        .buy_products(warehouse, &[CartLine::new(product, 1)])
        .await
        .unwrap();

    // Dropping the last dispatcher closes the queue; the worker drains it and exits
    drop(state);
    worker.await.unwrap();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.enqueued, 2);
    assert_eq!(snapshot.recorded, 2);
    assert_eq!(snapshot.failed, 0);

    let sales = store.recorded_sales().await;
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].total_price, dec!(60));
    assert_eq!(sales[1].quantity, 1);
}

#[tokio::test]
async fn test_recording_failure_does_not_fail_purchase() {
    let ctx = TestContext::new();
    let (warehouse, product) = ctx.stocked(5, dec!(8)).await;

    let (dispatcher, worker) = AnalyticsDispatcher::spawn(Arc::new(BrokenSalesLedger), 4);
    let stats = dispatcher.stats();
    let recorder: Arc<dyn AnalyticsRecorder> = Arc::new(dispatcher);
    let purchases = PurchaseService::new(
        ctx.store.clone(),
        recorder.clone(),
        InventoryConfig::default().purchase_timeout(),
    );

    let totals = purchases
        .buy_products(warehouse, &[CartLine::new(product, 5)])
        .await
        .unwrap();
    assert_eq!(totals.total_price, dec!(40));
    assert_eq!(ctx.quantity(warehouse, product).await, 0);

    drop(purchases);
    drop(recorder);
    worker.await.unwrap();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.enqueued, 1);
    assert_eq!(snapshot.failed, 1);
    assert_eq!(snapshot.recorded, 0);
}

#[tokio::test]
async fn test_warehouse_analytics_aggregates_per_product() {
    let ctx = TestContext::new();
    let warehouse = ctx.warehouse("2 Pier Road").await;
    let rope = ctx.product("Rope").await;
    let hook = ctx.product("Hook").await;

    ctx.store
        .record_sales(&[
            SaleRecord {
                warehouse_id: warehouse,
                product_id: rope,
                quantity: 2,
                total_price: dec!(18),
                sold_at: Utc::now(),
            },
            SaleRecord {
                warehouse_id: warehouse,
                product_id: hook,
                quantity: 1,
                total_price: dec!(4.5),
                sold_at: Utc::now(),
            },
            SaleRecord {
                warehouse_id: warehouse,
                product_id: rope,
                quantity: 3,
                total_price: dec!(27),
                sold_at: Utc::now(),
            },
        ])
        .await
        .unwrap();

    let report = ctx.state.analytics.warehouse_analytics(warehouse).await.unwrap();

    assert_eq!(report.warehouse_id, warehouse);
    assert_eq!(report.products.len(), 2);
    assert_eq!(report.products[0].product_name, "Rope");
    assert_eq!(report.products[0].total_count, 5);
    assert_eq!(report.products[0].total_price, dec!(45));
    assert_eq!(report.total_sum, dec!(49.5));
}

#[tokio::test]
async fn test_top_warehouses_ranks_by_revenue() {
    let ctx = TestContext::new();
    let busy = ctx.warehouse("A Street").await;
    let quiet = ctx.warehouse("B Street").await;
    let idle = ctx.warehouse("C Street").await;
    let product = ctx.product("Box").await;

    ctx.store
        .record_sales(&[
            SaleRecord {
                warehouse_id: quiet,
                product_id: product,
                quantity: 1,
                total_price: dec!(10),
                sold_at: Utc::now(),
            },
            SaleRecord {
                warehouse_id: busy,
                product_id: product,
                quantity: 9,
                total_price: dec!(90),
                sold_at: Utc::now(),
            },
        ])
        .await
        .unwrap();

    let ranking = ctx.state.analytics.top_warehouses(None).await.unwrap();
    let ids: Vec<Uuid> = ranking.iter().map(|r| r.warehouse_id).collect();
    assert_eq!(ids, vec![busy, quiet, idle]);
    assert_eq!(ranking[2].warehouse_total_sum, dec!(0));

    let top_one = ctx.state.analytics.top_warehouses(Some(1)).await.unwrap();
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].warehouse_address, "A Street");

    let err = ctx.state.analytics.top_warehouses(Some(0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
