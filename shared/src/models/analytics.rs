//! Sales analytics models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PricedLine;

/// A sold cart line, appended to analytics after a purchase commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price charged for the whole line, after discount
    pub total_price: Decimal,
    pub sold_at: DateTime<Utc>,
}

impl SaleRecord {
    pub fn from_line(warehouse_id: Uuid, line: &PricedLine, sold_at: DateTime<Utc>) -> Self {
        Self {
            warehouse_id,
            product_id: line.product_id,
            quantity: line.quantity,
            total_price: line.discounted_price,
            sold_at,
        }
    }
}

/// A recorded sale joined with the product name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSale {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAnalytic {
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(rename = "total_product_count")]
    pub total_count: i64,
    #[serde(rename = "total_product_price")]
    pub total_price: Decimal,
}

/// Per-product sales report for one warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseAnalytics {
    pub warehouse_id: Uuid,
    pub products: Vec<ProductAnalytic>,
    pub total_sum: Decimal,
}

impl WarehouseAnalytics {
    /// Aggregate raw sales per product, keeping the order in which products first appear
    pub fn from_sales(warehouse_id: Uuid, sales: impl IntoIterator<Item = ProductSale>) -> Self {
        let mut products: Vec<ProductAnalytic> = Vec::new();
        let mut total_sum = Decimal::ZERO;

        for sale in sales {
            total_sum += sale.total_price;
            match products.iter_mut().find(|p| p.product_id == sale.product_id) {
                Some(existing) => {
                    existing.total_count += i64::from(sale.quantity);
                    existing.total_price += sale.total_price;
                }
                None => products.push(ProductAnalytic {
                    product_id: sale.product_id,
                    product_name: sale.product_name,
                    total_count: i64::from(sale.quantity),
                    total_price: sale.total_price,
                }),
            }
        }

        Self {
            warehouse_id,
            products,
            total_sum,
        }
    }
}

/// A warehouse ranked by total sales revenue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRevenue {
    pub warehouse_id: Uuid,
    pub warehouse_address: String,
    pub warehouse_total_sum: Decimal,
}
