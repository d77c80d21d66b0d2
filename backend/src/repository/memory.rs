//! In-process store
//!
//! Mirrors the PostgreSQL schema constraints: unique pairs and names, foreign
//! keys, non-negative quantities. A transaction holds the store lock until it
//! is committed or dropped, so transactions are fully serialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    LockedStock, NewProduct, NewStockEntry, NewWarehouse, Pagination, Product, ProductSale,
    ProductUpdate, SaleRecord, StockEntry, StockSnapshot, StockedProduct, StockedProductSummary,
    Warehouse, WarehouseRevenue,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    HealthCheck, ProductCatalog, SalesLedger, StockLedger, StockTransaction, StoreError,
    StoreResult, WarehouseCatalog,
};

type StockKey = (Uuid, Uuid);

#[derive(Debug, Default)]
struct State {
    warehouses: Vec<Warehouse>,
    products: Vec<Product>,
    inventory: BTreeMap<StockKey, StockEntry>,
    sales: Vec<SaleRecord>,
}

impl State {
    fn product(&self, product_id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    fn stocked(&self, warehouse_id: Uuid) -> impl Iterator<Item = &StockEntry> {
        self.inventory
            .range((warehouse_id, Uuid::nil())..=(warehouse_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, entry)| entry)
    }
}

/// Store kept entirely in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ledger row for the pair, if any
    pub async fn stock_entry(&self, warehouse_id: Uuid, product_id: Uuid) -> Option<StockEntry> {
        self.state
            .lock()
            .await
            .inventory
            .get(&(warehouse_id, product_id))
            .cloned()
    }

    /// Every sale recorded so far, oldest first
    pub async fn recorded_sales(&self) -> Vec<SaleRecord> {
        self.state.lock().await.sales.clone()
    }
}

#[async_trait]
impl StockLedger for MemoryStore {
    async fn create_entry(&self, entry: &NewStockEntry) -> StoreResult<()> {
        let mut state = self.state.lock().await;

        if !state.warehouses.iter().any(|w| w.id == entry.warehouse_id) {
            return Err(StoreError::ForeignKeyViolation(
                "inventory_warehouse_id_fkey".to_string(),
            ));
        }
        if state.product(entry.product_id).is_none() {
            return Err(StoreError::ForeignKeyViolation(
                "inventory_product_id_fkey".to_string(),
            ));
        }

        let key = (entry.warehouse_id, entry.product_id);
        if state.inventory.contains_key(&key) {
            return Err(StoreError::UniqueViolation("inventory_pkey".to_string()));
        }

        state.inventory.insert(
            key,
            StockEntry {
                warehouse_id: entry.warehouse_id,
                product_id: entry.product_id,
                quantity: entry.quantity,
                unit_price: entry.unit_price,
                discount_percent: 0,
            },
        );
        Ok(())
    }

    async fn increase_quantity(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let entry = state
            .inventory
            .get_mut(&(warehouse_id, product_id))
            .ok_or(StoreError::NotFound)?;

        let quantity = entry
            .quantity
            .checked_add(delta)
            .ok_or(StoreError::QuantityOverflow)?;
        if quantity < 0 {
            return Err(StoreError::InsufficientQuantity(product_id));
        }
        entry.quantity = quantity;
        Ok(())
    }

    async fn fetch_prices_and_discounts(
        &self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, StockSnapshot>> {
        let state = self.state.lock().await;
        Ok(product_ids
            .iter()
            .filter_map(|id| {
                state
                    .inventory
                    .get(&(warehouse_id, *id))
                    .map(|entry| (*id, entry.snapshot()))
            })
            .collect())
    }

    async fn product_at_warehouse(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
    ) -> StoreResult<Option<StockedProduct>> {
        let state = self.state.lock().await;
        let Some(entry) = state.inventory.get(&(warehouse_id, product_id)) else {
            return Ok(None);
        };

        Ok(state.product(product_id).map(|product| StockedProduct {
            product_id,
            name: product.name.clone(),
            description: product.description.clone(),
            weight: product.weight,
            params: product.params.clone(),
            barcode: product.barcode.clone(),
            snapshot: entry.snapshot(),
        }))
    }

    async fn products_at_warehouse(
        &self,
        warehouse_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<Vec<StockedProductSummary>> {
        let state = self.state.lock().await;
        let mut rows: Vec<StockedProductSummary> = state
            .stocked(warehouse_id)
            .filter_map(|entry| {
                state.product(entry.product_id).map(|p| StockedProductSummary {
                    product_id: entry.product_id,
                    name: p.name.clone(),
                    unit_price: entry.unit_price,
                    discount_percent: entry.discount_percent,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.product_id.cmp(&b.product_id)));

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(pagination.limit as usize)
            .collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StockTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.inventory.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

/// Changes are staged on a copy of the ledger and written back on commit
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: BTreeMap<StockKey, StockEntry>,
}

#[async_trait]
impl StockTransaction for MemoryTransaction {
    async fn set_discount(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        discount_percent: i32,
    ) -> StoreResult<()> {
        let entry = self
            .working
            .get_mut(&(warehouse_id, product_id))
            .ok_or(StoreError::NotFound)?;
        entry.discount_percent = discount_percent;
        Ok(())
    }

    async fn fetch_for_update(
        &mut self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<Vec<LockedStock>> {
        let mut locked: Vec<LockedStock> = product_ids
            .iter()
            .filter_map(|id| {
                self.working.get(&(warehouse_id, *id)).map(|entry| LockedStock {
                    product_id: *id,
                    snapshot: entry.snapshot(),
                })
            })
            .collect();
        locked.sort_by_key(|l| l.product_id);
        locked.dedup_by_key(|l| l.product_id);
        Ok(locked)
    }

    async fn decrement_quantity(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> StoreResult<()> {
        let entry = self
            .working
            .get_mut(&(warehouse_id, product_id))
            .ok_or(StoreError::InsufficientQuantity(product_id))?;
        if entry.quantity < amount {
            return Err(StoreError::InsufficientQuantity(product_id));
        }
        entry.quantity -= amount;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        guard.inventory = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl WarehouseCatalog for MemoryStore {
    async fn create_warehouse(&self, input: &NewWarehouse) -> StoreResult<Warehouse> {
        let mut state = self.state.lock().await;
        if state.warehouses.iter().any(|w| w.address == input.address) {
            return Err(StoreError::UniqueViolation(
                "warehouse_warehouse_address_key".to_string(),
            ));
        }

        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            address: input.address.clone(),
        };
        state.warehouses.push(warehouse.clone());
        Ok(warehouse)
    }

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        let mut warehouses = self.state.lock().await.warehouses.clone();
        warehouses.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(warehouses)
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn create_product(&self, input: &NewProduct) -> StoreResult<Product> {
        let mut state = self.state.lock().await;
        if state.products.iter().any(|p| p.name == input.name) {
            return Err(StoreError::UniqueViolation(
                "product_product_name_key".to_string(),
            ));
        }

        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            weight: input.weight,
            description: input.description.clone(),
            params: input.params.clone(),
            barcode: input.barcode.clone(),
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.state.lock().await.products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn update_product(&self, product_id: Uuid, update: &ProductUpdate) -> StoreResult<()> {
        let mut state = self.state.lock().await;

        if let Some(name) = &update.name {
            if state
                .products
                .iter()
                .any(|p| p.id != product_id && &p.name == name)
            {
                return Err(StoreError::UniqueViolation(
                    "product_product_name_key".to_string(),
                ));
            }
        }

        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = &update.name {
            product.name = name.clone();
        }
        if let Some(description) = &update.description {
            product.description = description.clone();
        }
        if let Some(weight) = update.weight {
            product.weight = weight;
        }
        if let Some(params) = &update.params {
            product.params = Some(params.clone());
        }
        if let Some(barcode) = &update.barcode {
            product.barcode = barcode.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl SalesLedger for MemoryStore {
    async fn record_sales(&self, records: &[SaleRecord]) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        for record in records {
            if !state.warehouses.iter().any(|w| w.id == record.warehouse_id) {
                return Err(StoreError::ForeignKeyViolation(
                    "analytics_warehouse_id_fkey".to_string(),
                ));
            }
        }
        state.sales.extend_from_slice(records);
        Ok(())
    }

    async fn warehouse_sales(&self, warehouse_id: Uuid) -> StoreResult<Vec<ProductSale>> {
        let state = self.state.lock().await;
        Ok(state
            .sales
            .iter()
            .filter(|s| s.warehouse_id == warehouse_id)
            .filter_map(|s| {
                state.product(s.product_id).map(|p| ProductSale {
                    product_id: s.product_id,
                    product_name: p.name.clone(),
                    quantity: s.quantity,
                    total_price: s.total_price,
                })
            })
            .collect())
    }

    async fn top_warehouses(&self, limit: i64) -> StoreResult<Vec<WarehouseRevenue>> {
        let state = self.state.lock().await;
        let mut revenue: Vec<WarehouseRevenue> = state
            .warehouses
            .iter()
            .map(|w| WarehouseRevenue {
                warehouse_id: w.id,
                warehouse_address: w.address.clone(),
                warehouse_total_sum: state
                    .sales
                    .iter()
                    .filter(|s| s.warehouse_id == w.id)
                    .map(|s| s.total_price)
                    .sum::<Decimal>(),
            })
            .collect();

        revenue.sort_by(|a, b| {
            b.warehouse_total_sum
                .cmp(&a.warehouse_total_sum)
                .then_with(|| a.warehouse_address.cmp(&b.warehouse_address))
        });
        revenue.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(revenue)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seeded() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let warehouse = store
            .create_warehouse(&NewWarehouse {
                address: "1 Dock Road".to_string(),
            })
            .await
            .unwrap();
        let product = store
            .create_product(&NewProduct {
                name: "Pallet".to_string(),
                weight: 20.0,
                description: String::new(),
                params: None,
                barcode: String::new(),
            })
            .await
            .unwrap();
        store
            .create_entry(&NewStockEntry {
                warehouse_id: warehouse.id,
                product_id: product.id,
                quantity: 5,
                unit_price: dec!(12.5),
            })
            .await
            .unwrap();
        (store, warehouse.id, product.id)
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let (store, warehouse, product) = seeded().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.decrement_quantity(warehouse, product, 3).await.unwrap();
            tx.set_discount(warehouse, product, 40).await.unwrap();
        }

        let entry = store.stock_entry(warehouse, product).await.unwrap();
        assert_eq!(entry.quantity, 5);
        assert_eq!(entry.discount_percent, 0);
    }

    #[tokio::test]
    async fn test_commit_applies_changes() {
        let (store, warehouse, product) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        tx.decrement_quantity(warehouse, product, 5).await.unwrap();
        assert!(matches!(
            tx.decrement_quantity(warehouse, product, 1).await,
            Err(StoreError::InsufficientQuantity(_))
        ));
        tx.commit().await.unwrap();

        assert_eq!(store.stock_entry(warehouse, product).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_entry_constraints() {
        let (store, warehouse, product) = seeded().await;

        let duplicate = NewStockEntry {
            warehouse_id: warehouse,
            product_id: product,
            quantity: 1,
            unit_price: dec!(1),
        };
        assert!(matches!(
            store.create_entry(&duplicate).await,
            Err(StoreError::UniqueViolation(_))
        ));

        let orphan = NewStockEntry {
            warehouse_id: Uuid::new_v4(),
            ..duplicate
        };
        assert!(matches!(
            store.create_entry(&orphan).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
    }
}
