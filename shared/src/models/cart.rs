//! Cart and purchase models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A requested product and quantity, not yet priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    #[serde(rename = "product_count")]
    pub quantity: i32,
}

impl CartLine {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A cart line with its full and discounted totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: Uuid,
    #[serde(rename = "product_count")]
    pub quantity: i32,
    /// unit price x quantity
    #[serde(rename = "product_price")]
    pub full_price: Decimal,
    #[serde(rename = "product_price_with_discount")]
    pub discounted_price: Decimal,
}

/// Priced cart: returned by both the cart preview and a completed purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub products: Vec<PricedLine>,
    pub total_price: Decimal,
    pub total_price_with_discount: Decimal,
}

impl CartTotals {
    /// Sum the line totals; `None` when a sum leaves the `Decimal` range
    pub fn from_lines(products: Vec<PricedLine>) -> Option<Self> {
        let mut total_price = Decimal::ZERO;
        let mut total_price_with_discount = Decimal::ZERO;
        for line in &products {
            total_price = total_price.checked_add(line.full_price)?;
            total_price_with_discount =
                total_price_with_discount.checked_add(line.discounted_price)?;
        }

        Some(Self {
            products,
            total_price,
            total_price_with_discount,
        })
    }
}
