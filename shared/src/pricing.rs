//! Cart pricing
//!
//! Pure price math shared by the cart preview, the purchase flow and the
//! WASM client. Prices are exact decimals; nothing is rounded here.
//! Arithmetic is checked: a total outside the `Decimal` range is an error,
//! never a panic.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartLine, CartTotals, PricedLine, StockSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Products of the cart that have no stock entry at the warehouse
    #[error("{} product(s) are not stocked at this warehouse", .0.len())]
    MissingProducts(Vec<Uuid>),

    #[error("price of product {0} is too large to compute")]
    LineOverflow(Uuid),

    #[error("cart total is too large to compute")]
    TotalOverflow,
}

/// Unit price after applying a whole-percent discount
pub fn discounted_unit_price(unit_price: Decimal, discount_percent: i32) -> Decimal {
    if discount_percent == 0 {
        return unit_price;
    }
    let kept = Decimal::from(100 - discount_percent);
    match unit_price.checked_mul(kept) {
        Some(scaled) => scaled / Decimal::ONE_HUNDRED,
        // Scale down first; the result never exceeds the unit price
        None => unit_price / Decimal::ONE_HUNDRED * kept,
    }
}

pub fn price_line(line: &CartLine, snapshot: &StockSnapshot) -> Result<PricedLine, PricingError> {
    let quantity = Decimal::from(line.quantity);
    let overflow = || PricingError::LineOverflow(line.product_id);

    Ok(PricedLine {
        product_id: line.product_id,
        quantity: line.quantity,
        full_price: snapshot.unit_price.checked_mul(quantity).ok_or_else(overflow)?,
        discounted_price: snapshot
            .discounted_unit_price()
            .checked_mul(quantity)
            .ok_or_else(overflow)?,
    })
}

/// Price every line of a cart against the given snapshots.
///
/// Lines keep the order of the request. Fails with every product that has
/// no snapshot.
pub fn price_cart(
    lines: &[CartLine],
    snapshots: &HashMap<Uuid, StockSnapshot>,
) -> Result<CartTotals, PricingError> {
    let missing: Vec<Uuid> = lines
        .iter()
        .filter(|l| !snapshots.contains_key(&l.product_id))
        .map(|l| l.product_id)
        .collect();
    if !missing.is_empty() {
        return Err(PricingError::MissingProducts(missing));
    }

    let priced = lines
        .iter()
        .filter_map(|l| snapshots.get(&l.product_id).map(|s| price_line(l, s)))
        .collect::<Result<Vec<_>, _>>()?;

    CartTotals::from_lines(priced).ok_or(PricingError::TotalOverflow)
}
