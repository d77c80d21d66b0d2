//! Warehouse and product catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A physical warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewWarehouse {
    #[validate(length(min = 1, max = 512, message = "address cannot be empty"))]
    pub address: String,
}

/// A catalog product, independent of any warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Reference to the barcode image, stored as an opaque string
    pub barcode: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255, message = "name cannot be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "weight cannot be negative"))]
    pub weight: f64,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub barcode: String,
}

/// Partial product update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 255, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "weight cannot be negative"))]
    pub weight: Option<f64>,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub params: Option<serde_json::Value>,
    pub barcode: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.weight.is_none()
            && self.description.is_none()
            && self.params.is_none()
            && self.barcode.is_none()
    }
}
