//! Storage contracts
//!
//! Services depend on these narrow traits rather than on a concrete store.
//! [`PgStore`] is the production implementation; [`MemoryStore`] keeps the
//! same guarantees in process and backs the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::{
    LockedStock, NewProduct, NewStockEntry, NewWarehouse, Pagination, Product, ProductSale,
    ProductUpdate, SaleRecord, StockSnapshot, StockedProduct, StockedProductSummary, Warehouse,
    WarehouseRevenue,
};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// SQLSTATE raised when an int4 column would overflow
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Classified storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("insufficient quantity for product {0}")]
    InsufficientQuantity(Uuid),

    #[error("quantity out of range")]
    QuantityOverflow,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation(
                    db_err.constraint().unwrap_or("foreign_key").to_string(),
                )
            }
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) =>
            {
                StoreError::QuantityOverflow
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-warehouse stock: quantity, unit price and discount of each product
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Insert a new entry; the (warehouse, product) pair must not exist yet
    async fn create_entry(&self, entry: &NewStockEntry) -> StoreResult<()>;

    /// Add `delta` to the stored quantity in one statement
    async fn increase_quantity(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> StoreResult<()>;

    /// Current price, discount and quantity of each listed product that is
    /// stocked at the warehouse. Unstocked products are absent from the map.
    async fn fetch_prices_and_discounts(
        &self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, StockSnapshot>>;

    async fn product_at_warehouse(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
    ) -> StoreResult<Option<StockedProduct>>;

    async fn products_at_warehouse(
        &self,
        warehouse_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<Vec<StockedProductSummary>>;

    /// Open a transaction. Dropping it without commit rolls it back.
    async fn begin(&self) -> StoreResult<Box<dyn StockTransaction>>;
}

/// Stock operations that must be applied together
#[async_trait]
pub trait StockTransaction: Send {
    async fn set_discount(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        discount_percent: i32,
    ) -> StoreResult<()>;

    /// Lock the stocked rows among `product_ids`, in product ID order
    async fn fetch_for_update(
        &mut self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<Vec<LockedStock>>;

    /// Subtract `amount`; fails with `InsufficientQuantity` instead of going below zero
    async fn decrement_quantity(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait WarehouseCatalog: Send + Sync {
    async fn create_warehouse(&self, input: &NewWarehouse) -> StoreResult<Warehouse>;

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn create_product(&self, input: &NewProduct) -> StoreResult<Product>;

    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Apply the set fields; `NotFound` when the product does not exist
    async fn update_product(&self, product_id: Uuid, update: &ProductUpdate) -> StoreResult<()>;
}

/// Completed sales, appended after each purchase
#[async_trait]
pub trait SalesLedger: Send + Sync {
    async fn record_sales(&self, records: &[SaleRecord]) -> StoreResult<()>;

    /// Every recorded sale line of the warehouse, joined with product names
    async fn warehouse_sales(&self, warehouse_id: Uuid) -> StoreResult<Vec<ProductSale>>;

    /// Warehouses by total revenue, highest first; warehouses without sales count as zero
    async fn top_warehouses(&self, limit: i64) -> StoreResult<Vec<WarehouseRevenue>>;
}

/// Storage liveness probe for the health endpoint
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}
