//! Settings
//!
//! The single tax-rate setting consumed by the totals calculator. The rate is
//! fetched once per logical operation and passed through as a value, so a
//! mid-checkout settings change cannot produce an inconsistent subtotal/tax
//! pair.

pub mod errors;
pub mod models;
pub mod reader;

pub use errors::SettingsError;
pub use models::TaxConfig;
pub use reader::*;
