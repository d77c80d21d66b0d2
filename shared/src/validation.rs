//! Validation utilities for the Warehouse Inventory backend
//!
//! These checks run before any storage access.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartLine, DiscountUpdate};

/// Maximum discount, in percent
pub const MAX_DISCOUNT_PERCENT: i32 = 100;

/// Largest accepted unit price. Any stock quantity times this price stays
/// well inside the `Decimal` range.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("there are no products in cart")]
    EmptyCart,

    #[error("product count must be greater than 0, got {quantity} for product {product_id}")]
    NonPositiveQuantity { product_id: Uuid, quantity: i32 },

    #[error("product ID {0} must be unique")]
    DuplicateProduct(Uuid),

    #[error("there are no discounts")]
    NoDiscounts,

    #[error("discount must be between 0 and 100, got {discount_percent} for product {product_id}")]
    DiscountOutOfRange { product_id: Uuid, discount_percent: i32 },

    #[error("invalid product count: {0}")]
    NegativeQuantity(i32),

    #[error("invalid product price: {0}")]
    NegativePrice(Decimal),

    #[error("product price must not exceed {}, got {}", MAX_UNIT_PRICE, .0)]
    PriceTooLarge(Decimal),
}

impl ValidationError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyCart
            | ValidationError::NonPositiveQuantity { .. }
            | ValidationError::DuplicateProduct(_) => "products",
            ValidationError::NoDiscounts | ValidationError::DiscountOutOfRange { .. } => {
                "discounts"
            }
            ValidationError::NegativeQuantity(_) => "product_count",
            ValidationError::NegativePrice(_) | ValidationError::PriceTooLarge(_) => {
                "product_price"
            }
        }
    }
}

// ============================================================================
// Cart Validations
// ============================================================================

/// Validate a cart: non-empty, positive quantities, unique products
pub fn validate_cart(lines: &[CartLine]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.product_id) {
            return Err(ValidationError::DuplicateProduct(line.product_id));
        }
        if line.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a discount batch: non-empty, each discount in [0, 100], unique products
pub fn validate_discounts(discounts: &[DiscountUpdate]) -> Result<(), ValidationError> {
    if discounts.is_empty() {
        return Err(ValidationError::NoDiscounts);
    }

    let mut seen = HashSet::with_capacity(discounts.len());
    for discount in discounts {
        if !seen.insert(discount.product_id) {
            return Err(ValidationError::DuplicateProduct(discount.product_id));
        }
        if !(0..=MAX_DISCOUNT_PERCENT).contains(&discount.discount_percent) {
            return Err(ValidationError::DiscountOutOfRange {
                product_id: discount.product_id,
                discount_percent: discount.discount_percent,
            });
        }
    }
    Ok(())
}

/// Stock quantities and count increments cannot be negative
pub fn validate_stock_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity(quantity));
    }
    Ok(())
}

pub fn validate_unit_price(price: Decimal) -> Result<(), ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice(price));
    }
    if price > Decimal::from(MAX_UNIT_PRICE) {
        return Err(ValidationError::PriceTooLarge(price));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_cart_valid() {
        let cart = [CartLine::new(Uuid::new_v4(), 1), CartLine::new(Uuid::new_v4(), 5)];
        assert!(validate_cart(&cart).is_ok());
    }

    #[test]
    fn test_validate_cart_empty() {
        assert_eq!(validate_cart(&[]), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_validate_cart_zero_and_negative_quantity() {
        let id = Uuid::new_v4();
        for quantity in [0, -1] {
            assert_eq!(
                validate_cart(&[CartLine::new(id, quantity)]),
                Err(ValidationError::NonPositiveQuantity {
                    product_id: id,
                    quantity
                })
            );
        }
    }

    #[test]
    fn test_validate_cart_duplicate_product() {
        let id = Uuid::new_v4();
        let err = validate_cart(&[CartLine::new(id, 1), CartLine::new(id, 2)]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateProduct(id));
        assert_eq!(err.field(), "products");
    }

    #[test]
    fn test_validate_discounts_bounds() {
        let id = Uuid::new_v4();
        for ok in [0, 50, 100] {
            let batch = [DiscountUpdate {
                product_id: id,
                discount_percent: ok,
            }];
            assert!(validate_discounts(&batch).is_ok());
        }
        for bad in [-1, 101] {
            let batch = [DiscountUpdate {
                product_id: id,
                discount_percent: bad,
            }];
            assert!(matches!(
                validate_discounts(&batch),
                Err(ValidationError::DiscountOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_validate_discounts_empty() {
        assert_eq!(validate_discounts(&[]), Err(ValidationError::NoDiscounts));
    }

    #[test]
    fn test_validate_quantity_and_price() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-3).is_err());
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec!(19.99)).is_ok());
        assert_eq!(
            validate_unit_price(dec!(-0.01)),
            Err(ValidationError::NegativePrice(dec!(-0.01)))
        );
    }

    #[test]
    fn test_validate_price_upper_bound() {
        let max = Decimal::from(MAX_UNIT_PRICE);
        assert!(validate_unit_price(max).is_ok());
        assert_eq!(
            validate_unit_price(max + dec!(0.01)),
            Err(ValidationError::PriceTooLarge(max + dec!(0.01)))
        );
        assert_eq!(ValidationError::PriceTooLarge(max).field(), "product_price");
    }
}
