//! Warehouse and product catalog

use std::sync::Arc;

use shared::{NewProduct, NewWarehouse, Product, ProductUpdate, Warehouse};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repository::{ProductCatalog, StoreError, WarehouseCatalog};

#[derive(Clone)]
pub struct WarehouseService {
    catalog: Arc<dyn WarehouseCatalog>,
}

impl WarehouseService {
    pub fn new(catalog: Arc<dyn WarehouseCatalog>) -> Self {
        Self { catalog }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_warehouse(&self, input: NewWarehouse) -> AppResult<Warehouse> {
        input.validate()?;

        let warehouse = self.catalog.create_warehouse(&input).await?;
        tracing::info!(warehouse_id = %warehouse.id, "Warehouse created");
        Ok(warehouse)
    }

    pub async fn list_warehouses(&self) -> AppResult<Vec<Warehouse>> {
        Ok(self.catalog.list_warehouses().await?)
    }
}

#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductService {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> AppResult<Product> {
        input.validate()?;

        let product = self.catalog.create_product(&input).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.catalog.list_products().await?)
    }

    /// Partial update; at least one field must be set
    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Err(AppError::validation("body", "no fields to update"));
        }
        update.validate()?;

        self.catalog
            .update_product(product_id, &update)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AppError::NotFound("Product".to_string()),
                other => other.into(),
            })
    }
}
