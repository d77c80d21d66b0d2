//! PostgreSQL store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    LockedStock, NewProduct, NewStockEntry, NewWarehouse, Pagination, Product, ProductSale,
    ProductUpdate, SaleRecord, StockSnapshot, StockedProduct, StockedProductSummary, Warehouse,
    WarehouseRevenue,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    HealthCheck, ProductCatalog, SalesLedger, StockLedger, StockTransaction, StoreError,
    StoreResult, WarehouseCatalog,
};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for price/discount lookups
#[derive(Debug, FromRow)]
struct StockRow {
    product_id: Uuid,
    product_price: Decimal,
    product_sale: i32,
    product_count: i32,
}

impl StockRow {
    fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            unit_price: self.product_price,
            discount_percent: self.product_sale,
            quantity: self.product_count,
        }
    }
}

#[derive(Debug, FromRow)]
struct StockedProductRow {
    product_id: Uuid,
    product_name: String,
    product_description: String,
    product_weight: f64,
    product_params: Option<serde_json::Value>,
    product_barcode: String,
    product_count: i32,
    product_price: Decimal,
    product_sale: i32,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    product_id: Uuid,
    product_name: String,
    product_price: Decimal,
    product_sale: i32,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    warehouse_id: Uuid,
    warehouse_address: String,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    product_id: Uuid,
    product_name: String,
    product_description: String,
    product_weight: f64,
    product_params: Option<serde_json::Value>,
    product_barcode: String,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    product_id: Uuid,
    product_name: String,
    product_count: i32,
    product_price: Decimal,
}

#[derive(Debug, FromRow)]
struct RevenueRow {
    warehouse_id: Uuid,
    warehouse_address: String,
    warehouse_total_sum: Decimal,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.warehouse_id,
            address: row.warehouse_address,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.product_id,
            name: row.product_name,
            weight: row.product_weight,
            description: row.product_description,
            params: row.product_params,
            barcode: row.product_barcode,
        }
    }
}

// NULL numerics read as zero
const STOCK_COLUMNS: &str = "product_id, COALESCE(product_price, 0) AS product_price, \
     COALESCE(product_sale, 0) AS product_sale, COALESCE(product_count, 0) AS product_count";

#[async_trait]
impl StockLedger for PgStore {
    async fn create_entry(&self, entry: &NewStockEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (warehouse_id, product_id, product_count, product_price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.warehouse_id)
        .bind(entry.product_id)
        .bind(entry.quantity)
        .bind(entry.unit_price)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn increase_quantity(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory SET product_count = product_count + $3
            WHERE warehouse_id = $1 AND product_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .bind(delta)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn fetch_prices_and_discounts(
        &self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, StockSnapshot>> {
        let query = format!(
            "SELECT {} FROM inventory WHERE warehouse_id = $1 AND product_id = ANY($2)",
            STOCK_COLUMNS
        );
        let rows: Vec<StockRow> = sqlx::query_as(&query)
            .bind(warehouse_id)
            .bind(product_ids)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.iter().map(|r| (r.product_id, r.snapshot())).collect())
    }

    async fn product_at_warehouse(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
    ) -> StoreResult<Option<StockedProduct>> {
        let row: Option<StockedProductRow> = sqlx::query_as(
            r#"
            SELECT p.product_id, p.product_name, p.product_description, p.product_weight,
                   p.product_params, p.product_barcode,
                   COALESCE(inv.product_count, 0) AS product_count,
                   COALESCE(inv.product_price, 0) AS product_price,
                   COALESCE(inv.product_sale, 0) AS product_sale
            FROM inventory inv
            JOIN product p USING (product_id)
            WHERE inv.warehouse_id = $1 AND inv.product_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| StockedProduct {
            product_id: r.product_id,
            name: r.product_name,
            description: r.product_description,
            weight: r.product_weight,
            params: r.product_params,
            barcode: r.product_barcode,
            snapshot: StockSnapshot {
                unit_price: r.product_price,
                discount_percent: r.product_sale,
                quantity: r.product_count,
            },
        }))
    }

    async fn products_at_warehouse(
        &self,
        warehouse_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<Vec<StockedProductSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT p.product_id, p.product_name,
                   COALESCE(inv.product_price, 0) AS product_price,
                   COALESCE(inv.product_sale, 0) AS product_sale
            FROM inventory inv
            JOIN product p USING (product_id)
            WHERE inv.warehouse_id = $1
            ORDER BY p.product_name, p.product_id
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(warehouse_id)
        .bind(pagination.offset())
        .bind(i64::from(pagination.limit))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StockedProductSummary {
                product_id: r.product_id,
                name: r.product_name,
                unit_price: r.product_price,
                discount_percent: r.product_sale,
            })
            .collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StockTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgStockTransaction { tx }))
    }
}

/// Open PostgreSQL transaction; sqlx rolls it back when dropped uncommitted
pub struct PgStockTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockTransaction for PgStockTransaction {
    async fn set_discount(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        discount_percent: i32,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory SET product_sale = $3
            WHERE warehouse_id = $1 AND product_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .bind(discount_percent)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn fetch_for_update(
        &mut self,
        warehouse_id: Uuid,
        product_ids: &[Uuid],
    ) -> StoreResult<Vec<LockedStock>> {
        // Fixed lock order keeps overlapping purchases from deadlocking
        let query = format!(
            "SELECT {} FROM inventory WHERE warehouse_id = $1 AND product_id = ANY($2) \
             ORDER BY product_id FOR UPDATE",
            STOCK_COLUMNS
        );
        let rows: Vec<StockRow> = sqlx::query_as(&query)
            .bind(warehouse_id)
            .bind(product_ids)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows
            .iter()
            .map(|r| LockedStock {
                product_id: r.product_id,
                snapshot: r.snapshot(),
            })
            .collect())
    }

    async fn decrement_quantity(
        &mut self,
        warehouse_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory SET product_count = product_count - $3
            WHERE warehouse_id = $1 AND product_id = $2 AND product_count >= $3
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .bind(amount)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::InsufficientQuantity(product_id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl WarehouseCatalog for PgStore {
    async fn create_warehouse(&self, input: &NewWarehouse) -> StoreResult<Warehouse> {
        let row: WarehouseRow = sqlx::query_as(
            r#"
            INSERT INTO warehouse (warehouse_address)
            VALUES ($1)
            RETURNING warehouse_id, warehouse_address
            "#,
        )
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        let rows: Vec<WarehouseRow> = sqlx::query_as(
            "SELECT warehouse_id, warehouse_address FROM warehouse ORDER BY warehouse_address",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Warehouse::from).collect())
    }
}

#[async_trait]
impl ProductCatalog for PgStore {
    async fn create_product(&self, input: &NewProduct) -> StoreResult<Product> {
        let row: ProductRow = sqlx::query_as(
            r#"
            INSERT INTO product (product_name, product_description, product_weight, product_params, product_barcode)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING product_id, product_name, product_description, product_weight, product_params, product_barcode
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.weight)
        .bind(&input.params)
        .bind(&input.barcode)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT product_id, product_name, product_description, product_weight, product_params, product_barcode
            FROM product
            ORDER BY product_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, product_id: Uuid, update: &ProductUpdate) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product SET
                product_name = COALESCE($2, product_name),
                product_description = COALESCE($3, product_description),
                product_weight = COALESCE($4, product_weight),
                product_params = COALESCE($5, product_params),
                product_barcode = COALESCE($6, product_barcode)
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.weight)
        .bind(&update.params)
        .bind(&update.barcode)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SalesLedger for PgStore {
    async fn record_sales(&self, records: &[SaleRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let warehouse_ids: Vec<Uuid> = records.iter().map(|r| r.warehouse_id).collect();
        let product_ids: Vec<Uuid> = records.iter().map(|r| r.product_id).collect();
        let counts: Vec<i32> = records.iter().map(|r| r.quantity).collect();
        let prices: Vec<Decimal> = records.iter().map(|r| r.total_price).collect();
        let sold_at: Vec<DateTime<Utc>> = records.iter().map(|r| r.sold_at).collect();

        sqlx::query(
            r#"
            INSERT INTO analytics (warehouse_id, product_id, product_count, product_price, sold_at)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::int4[], $4::numeric[], $5::timestamptz[])
            "#,
        )
        .bind(&warehouse_ids)
        .bind(&product_ids)
        .bind(&counts)
        .bind(&prices)
        .bind(&sold_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn warehouse_sales(&self, warehouse_id: Uuid) -> StoreResult<Vec<ProductSale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT a.product_id, p.product_name, a.product_count, a.product_price
            FROM analytics a
            JOIN product p USING (product_id)
            WHERE a.warehouse_id = $1
            ORDER BY a.sold_at, a.id
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductSale {
                product_id: r.product_id,
                product_name: r.product_name,
                quantity: r.product_count,
                total_price: r.product_price,
            })
            .collect())
    }

    async fn top_warehouses(&self, limit: i64) -> StoreResult<Vec<WarehouseRevenue>> {
        let rows: Vec<RevenueRow> = sqlx::query_as(
            r#"
            SELECT w.warehouse_id, w.warehouse_address,
                   COALESCE(SUM(a.product_price), 0) AS warehouse_total_sum
            FROM warehouse w
            LEFT JOIN analytics a USING (warehouse_id)
            GROUP BY w.warehouse_id, w.warehouse_address
            ORDER BY warehouse_total_sum DESC, w.warehouse_address
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| WarehouseRevenue {
                warehouse_id: r.warehouse_id,
                warehouse_address: r.warehouse_address,
                warehouse_total_sum: r.warehouse_total_sum,
            })
            .collect())
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
