//! Stock ledger models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::discounted_unit_price;

/// One row of the stock ledger: a product stocked at a warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    /// Units on hand, never negative
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Discount in whole percent (0-100)
    pub discount_percent: i32,
}

impl StockEntry {
    pub fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            quantity: self.quantity,
        }
    }
}

/// Input for creating a stock entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStockEntry {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    #[serde(rename = "product_count")]
    pub quantity: i32,
    #[serde(rename = "product_price")]
    pub unit_price: Decimal,
}

/// Price, discount and quantity of a product at a warehouse at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub unit_price: Decimal,
    pub discount_percent: i32,
    pub quantity: i32,
}

impl StockSnapshot {
    pub fn discounted_unit_price(&self) -> Decimal {
        discounted_unit_price(self.unit_price, self.discount_percent)
    }
}

/// A ledger row locked for update inside a purchase transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedStock {
    pub product_id: Uuid,
    pub snapshot: StockSnapshot,
}

/// Discount to apply to one product of a warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountUpdate {
    pub product_id: Uuid,
    #[serde(rename = "discount")]
    pub discount_percent: i32,
}

/// Product catalog data joined with its stock at one warehouse
#[derive(Debug, Clone, PartialEq)]
pub struct StockedProduct {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub params: Option<serde_json::Value>,
    pub barcode: String,
    pub snapshot: StockSnapshot,
}

/// Product detail at a warehouse, with the computed discounted unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_description: String,
    pub product_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_params: Option<serde_json::Value>,
    pub product_barcode: String,
    pub product_count: i32,
    pub product_price: Decimal,
    pub product_discount: i32,
    /// Unit price after discount
    #[serde(rename = "product_sale")]
    pub product_price_with_discount: Decimal,
}

impl From<StockedProduct> for ProductDetail {
    fn from(stocked: StockedProduct) -> Self {
        let product_price_with_discount = stocked.snapshot.discounted_unit_price();
        Self {
            product_id: stocked.product_id,
            product_name: stocked.name,
            product_description: stocked.description,
            product_weight: stocked.weight,
            product_params: stocked.params,
            product_barcode: stocked.barcode,
            product_count: stocked.snapshot.quantity,
            product_price: stocked.snapshot.unit_price,
            product_discount: stocked.snapshot.discount_percent,
            product_price_with_discount,
        }
    }
}

/// Short listing row of a product stocked at a warehouse
#[derive(Debug, Clone, PartialEq)]
pub struct StockedProductSummary {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub discount_percent: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAtWarehouse {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_discount_price: Decimal,
}

impl From<StockedProductSummary> for ProductAtWarehouse {
    fn from(summary: StockedProductSummary) -> Self {
        Self {
            product_id: summary.product_id,
            product_discount_price: discounted_unit_price(
                summary.unit_price,
                summary.discount_percent,
            ),
            product_name: summary.name,
            product_price: summary.unit_price,
        }
    }
}

/// One page of products at a warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsPage {
    pub page: u32,
    pub limit: u32,
    pub products: Vec<ProductAtWarehouse>,
}
