//! WebAssembly module for the Warehouse Inventory backend
//!
//! Provides client-side computation for:
//! - Cart previews from cached prices and discounts
//! - Discounted unit prices
//! - Cart validation before submitting a purchase

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::pricing::*;
pub use shared::validation::*;

/// Price a cart from cached stock snapshots.
///
/// `lines_json` is `[{"product_id": "...", "product_count": 2}]`, and
/// `snapshots_json` maps product IDs to
/// `{"unit_price": "10.00", "discount_percent": 5, "quantity": 40}`.
/// Returns the cart totals as JSON.
#[wasm_bindgen]
pub fn preview_cart(lines_json: &str, snapshots_json: &str) -> Result<String, JsValue> {
    let lines: Vec<CartLine> = serde_json::from_str(lines_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid cart JSON: {}", e)))?;
    let snapshots: HashMap<Uuid, StockSnapshot> = serde_json::from_str(snapshots_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshots JSON: {}", e)))?;

    let totals = price_cart(&lines, &snapshots).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Unit price after discount, as a decimal string
#[wasm_bindgen]
pub fn discounted_price(unit_price: &str, discount_percent: i32) -> Result<String, JsValue> {
    let price = Decimal::from_str(unit_price)
        .map_err(|e| JsValue::from_str(&format!("Invalid price: {}", e)))?;
    Ok(discounted_unit_price(price, discount_percent).to_string())
}

/// Check a cart before sending it; returns the validation message, if any
#[wasm_bindgen]
pub fn cart_error(lines_json: &str) -> Option<String> {
    match serde_json::from_str::<Vec<CartLine>>(lines_json) {
        Ok(lines) => validate_cart(&lines).err().map(|e| e.to_string()),
        Err(e) => Some(format!("Invalid cart JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price("100", 20).unwrap(), "80");
        assert_eq!(discounted_price("19.99", 0).unwrap(), "19.99");
    }

    #[test]
    fn test_preview_cart() {
        let id = Uuid::new_v4();
        let lines = format!(r#"[{{"product_id": "{id}", "product_count": 3}}]"#);
        let snapshots =
            format!(r#"{{"{id}": {{"unit_price": "100", "discount_percent": 10, "quantity": 7}}}}"#);

        let json = preview_cart(&lines, &snapshots).unwrap();
        let totals: CartTotals = serde_json::from_str(&json).unwrap();
        assert_eq!(totals.total_price, Decimal::from(300));
        assert_eq!(totals.total_price_with_discount, Decimal::from(270));
    }

    #[test]
    fn test_cart_error() {
        assert_eq!(cart_error("[]").as_deref(), Some("there are no products in cart"));
        let id = Uuid::new_v4();
        assert!(cart_error(&format!(r#"[{{"product_id": "{id}", "product_count": 1}}]"#)).is_none());
    }
}
