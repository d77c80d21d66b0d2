//! Error handling for the Warehouse Inventory backend
//!
//! Every failure a handler can return is an [`AppError`]. Each variant belongs
//! to one [`ErrorKind`], which decides the HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{PricingError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

use crate::repository::StoreError;

/// Broad classification of application errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    ReferentialIntegrity,
    NotFound,
    InsufficientResource,
    InvalidInput,
    Transient,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Conflicts
    #[error("inventory already exists")]
    InventoryAlreadyExists,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Referential integrity
    #[error("warehouse or product does not exist: {0}")]
    ForeignKey(String),

    // Missing records
    #[error("inventory not found for product {product_id}")]
    InventoryNotFound {
        product_id: Uuid,
        /// Raised while applying a discount batch
        in_batch: bool,
    },

    #[error("product not found")]
    ProductNotFound,

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock shortages
    #[error("not enough product count for product {0}")]
    NotEnoughProductCount(Uuid),

    #[error("{} product(s) are not available at this warehouse", .0.len())]
    ProductsNotAtWarehouse(Vec<Uuid>),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Transient errors
    #[error("operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InventoryAlreadyExists | AppError::DuplicateEntry(_) => ErrorKind::Conflict,
            AppError::ForeignKey(_) => ErrorKind::ReferentialIntegrity,
            AppError::InventoryNotFound { .. } | AppError::ProductNotFound | AppError::NotFound(_) => {
                ErrorKind::NotFound
            }
            AppError::NotEnoughProductCount(_) | AppError::ProductsNotAtWarehouse(_) => {
                ErrorKind::InsufficientResource
            }
            AppError::Validation { .. } => ErrorKind::InvalidInput,
            AppError::Timeout | AppError::DatabaseError(_) => ErrorKind::Transient,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // A batch referencing a product the warehouse does not stock is a bad request
            AppError::InventoryNotFound { in_batch: true, .. } => StatusCode::BAD_REQUEST,
            _ => match self.kind() {
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::ReferentialIntegrity
                | ErrorKind::InsufficientResource
                | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Transient => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message, field) = match self {
            AppError::InventoryAlreadyExists => ("INVENTORY_ALREADY_EXISTS", self.to_string(), None),
            AppError::DuplicateEntry(constraint) => (
                "DUPLICATE_ENTRY",
                "A record with these values already exists".to_string(),
                Some(constraint.clone()),
            ),
            AppError::ForeignKey(_) => (
                "FOREIGN_KEY_VIOLATION",
                "Warehouse or product does not exist".to_string(),
                None,
            ),
            AppError::InventoryNotFound { product_id, .. } => (
                "INVENTORY_NOT_FOUND",
                self.to_string(),
                Some(product_id.to_string()),
            ),
            AppError::ProductNotFound => ("PRODUCT_NOT_FOUND", self.to_string(), None),
            AppError::NotFound(resource) => {
                ("NOT_FOUND", format!("{} not found", resource), None)
            }
            AppError::NotEnoughProductCount(product_id) => (
                "NOT_ENOUGH_PRODUCT_COUNT",
                self.to_string(),
                Some(product_id.to_string()),
            ),
            AppError::ProductsNotAtWarehouse(missing) => {
                let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
                (
                    "PRODUCTS_NOT_AT_WAREHOUSE",
                    format!("products not available at this warehouse: {}", ids.join(", ")),
                    None,
                )
            }
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()))
            }
            AppError::Timeout => ("TIMEOUT", "The operation timed out".to_string(), None),
            AppError::DatabaseError(_) => {
                ("DATABASE_ERROR", "A database error occurred".to_string(), None)
            }
        };

        ErrorDetail {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Record".to_string()),
            StoreError::UniqueViolation(constraint) => AppError::DuplicateEntry(constraint),
            StoreError::ForeignKeyViolation(constraint) => AppError::ForeignKey(constraint),
            StoreError::InsufficientQuantity(product_id) => {
                AppError::NotEnoughProductCount(product_id)
            }
            StoreError::QuantityOverflow => AppError::validation(
                "product_count",
                "product count would exceed the largest storable quantity",
            ),
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::MissingProducts(missing) => AppError::ProductsNotAtWarehouse(missing),
            overflow => AppError::validation("products", overflow.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.field(), err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(**field, message)
            }
            None => AppError::validation("body", errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_detail = self.detail();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!(code = %error_detail.code, "Error: {:?}", self);
        } else {
            tracing::debug!(code = %error_detail.code, "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
