//! Inventory operations: stock creation, count and discount changes, reads
//! and cart previews

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{
    price_cart, validate_cart, validate_discounts, validate_stock_quantity, validate_unit_price,
    CartLine, CartTotals, DiscountUpdate, NewStockEntry, Pagination, ProductAtWarehouse,
    ProductDetail, ProductsPage,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repository::{StockLedger, StoreError};

use super::roll_back;

/// Inventory service over the stock ledger
#[derive(Clone)]
pub struct InventoryService {
    ledger: Arc<dyn StockLedger>,
    default_page_limit: u32,
}

impl InventoryService {
    pub fn new(ledger: Arc<dyn StockLedger>, default_page_limit: u32) -> Self {
        Self {
            ledger,
            default_page_limit,
        }
    }

    /// Page size used when a listing request has none
    pub fn default_page_limit(&self) -> u32 {
        self.default_page_limit
    }

    /// Stock a product at a warehouse
    #[tracing::instrument(skip(self))]
    pub async fn create_inventory(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> AppResult<()> {
        validate_stock_quantity(quantity)?;
        validate_unit_price(unit_price)?;

        let entry = NewStockEntry {
            warehouse_id,
            product_id,
            quantity,
            unit_price,
        };

        self.ledger
            .create_entry(&entry)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => AppError::InventoryAlreadyExists,
                other => other.into(),
            })?;

        tracing::info!("Inventory created");
        Ok(())
    }

    /// Add `count` units to an existing entry
    #[tracing::instrument(skip(self))]
    pub async fn change_product_count(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        count: i32,
    ) -> AppResult<()> {
        validate_stock_quantity(count)?;

        self.ledger
            .increase_quantity(warehouse_id, product_id, count)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AppError::InventoryNotFound {
                    product_id,
                    in_batch: false,
                },
                other => other.into(),
            })
    }

    /// Apply a batch of discounts; any unstocked product aborts the whole batch
    #[tracing::instrument(skip(self, discounts), fields(count = discounts.len()))]
    pub async fn add_discount_to_products(
        &self,
        warehouse_id: Uuid,
        discounts: &[DiscountUpdate],
    ) -> AppResult<()> {
        validate_discounts(discounts)?;

        let mut tx = self.ledger.begin().await?;
        for discount in discounts {
            let applied = tx
                .set_discount(warehouse_id, discount.product_id, discount.discount_percent)
                .await;

            if let Err(err) = applied {
                roll_back(tx).await;
                return Err(match err {
                    StoreError::NotFound => AppError::InventoryNotFound {
                        product_id: discount.product_id,
                        in_batch: true,
                    },
                    other => other.into(),
                });
            }
        }
        tx.commit().await?;

        tracing::info!("Discounts applied");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product_from_warehouse(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<ProductDetail> {
        self.ledger
            .product_at_warehouse(warehouse_id, product_id)
            .await?
            .map(ProductDetail::from)
            .ok_or(AppError::ProductNotFound)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_products_at_warehouse(
        &self,
        pagination: Pagination,
        warehouse_id: Uuid,
    ) -> AppResult<ProductsPage> {
        let rows = self
            .ledger
            .products_at_warehouse(warehouse_id, pagination)
            .await?;

        Ok(ProductsPage {
            page: pagination.page,
            limit: pagination.limit,
            products: rows.into_iter().map(ProductAtWarehouse::from).collect(),
        })
    }

    /// Price a cart against current stock without changing anything.
    ///
    /// Each line is capped at the quantity the warehouse holds.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn calculate_cart(
        &self,
        warehouse_id: Uuid,
        lines: &[CartLine],
    ) -> AppResult<CartTotals> {
        validate_cart(lines)?;

        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let snapshots = self
            .ledger
            .fetch_prices_and_discounts(warehouse_id, &product_ids)
            .await?;

        let capped: Vec<CartLine> = lines
            .iter()
            .map(|line| match snapshots.get(&line.product_id) {
                Some(stock) => CartLine::new(line.product_id, line.quantity.min(stock.quantity)),
                None => *line,
            })
            .collect();

        Ok(price_cart(&capped, &snapshots)?)
    }
}
