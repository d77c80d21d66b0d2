//! Shared types and models for the Warehouse Inventory backend
//!
//! This crate contains the I/O-free part of the system: domain models shared
//! between the backend and the WASM client module, the cart pricing math and
//! input validation.

pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
