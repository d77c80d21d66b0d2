//! Shared fixtures for the backend integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use shared::{NewProduct, NewWarehouse, SaleRecord};
use uuid::Uuid;
use wms_backend::config::InventoryConfig;
use wms_backend::repository::{MemoryStore, ProductCatalog, StockLedger, WarehouseCatalog};
use wms_backend::services::AnalyticsRecorder;
use wms_backend::AppState;

/// Recorder that keeps every batch it receives
#[derive(Default)]
pub struct CollectingRecorder {
    batches: Mutex<Vec<Vec<SaleRecord>>>,
}

impl CollectingRecorder {
    pub fn batches(&self) -> Vec<Vec<SaleRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

impl AnalyticsRecorder for CollectingRecorder {
    fn record_sale(&self, records: Vec<SaleRecord>) {
        self.batches.lock().unwrap().push(records);
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub recorder: Arc<CollectingRecorder>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let recorder = Arc::new(CollectingRecorder::default());
        let state = AppState::new(store.clone(), recorder.clone(), &InventoryConfig::default());
        Self {
            store,
            recorder,
            state,
        }
    }

    pub async fn warehouse(&self, address: &str) -> Uuid {
        self.store
            .create_warehouse(&NewWarehouse {
                address: address.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn product(&self, name: &str) -> Uuid {
        self.store
            .create_product(&NewProduct {
                name: name.to_string(),
                weight: 1.0,
                description: format!("{} for tests", name),
                params: None,
                barcode: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    /// Create a warehouse with one stocked product
    pub async fn stocked(&self, quantity: i32, unit_price: Decimal) -> (Uuid, Uuid) {
        let warehouse = self.warehouse("1 Harbour Way").await;
        let product = self.product("Pallet").await;
        self.stock(warehouse, product, quantity, unit_price).await;
        (warehouse, product)
    }

    pub async fn stock(&self, warehouse: Uuid, product: Uuid, quantity: i32, unit_price: Decimal) {
        self.store
            .create_entry(&shared::NewStockEntry {
                warehouse_id: warehouse,
                product_id: product,
                quantity,
                unit_price,
            })
            .await
            .unwrap();
    }

    pub async fn quantity(&self, warehouse: Uuid, product: Uuid) -> i32 {
        self.store
            .stock_entry(warehouse, product)
            .await
            .expect("stock entry exists")
            .quantity
    }

    pub async fn discount(&self, warehouse: Uuid, product: Uuid) -> i32 {
        self.store
            .stock_entry(warehouse, product)
            .await
            .expect("stock entry exists")
            .discount_percent
    }
}
