//! Domain models for the Warehouse Inventory backend

mod analytics;
mod cart;
mod catalog;
mod stock;

pub use analytics::*;
pub use cart::*;
pub use catalog::*;
pub use stock::*;
