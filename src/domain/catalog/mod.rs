//! Catalog
//!
//! Read-side collaborator: product and variant rows, including the stock
//! and status fields the line item resolver needs. Stock mutations live in
//! the repository and only run inside an order-creation or cancellation
//! transaction.

pub mod errors;
pub mod models;
pub mod reader;
pub(crate) mod repository;

pub use errors::CatalogError;
pub use reader::*;
