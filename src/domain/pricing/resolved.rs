//! Resolved Line Items

use serde::Serialize;

use crate::domain::catalog::models::{CategoryUuid, ProductUuid, VariantUuid};

/// A cart line after resolution: validated, priced from the catalog, and
/// carrying the product facts the caller may want to render. Created fresh
/// on every calculation; never persisted standalone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLineItem {
    pub line_id: String,
    pub product_uuid: ProductUuid,
    pub variant_uuid: Option<VariantUuid>,
    pub category_uuid: Option<CategoryUuid>,
    /// Minor units, read from the catalog at resolution time.
    pub unit_price: u64,
    pub quantity: u32,
    /// `unit_price * quantity`, exact in minor units.
    pub line_total: u64,
    pub product: ProductSnapshot,
    pub variant: Option<VariantSnapshot>,
}

/// Product Snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub sku: String,
    pub thumbnail: Option<String>,
    pub stock_quantity: i64,
    pub in_stock: bool,
}

/// Variant Snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSnapshot {
    pub name: String,
    pub sku: Option<String>,
    pub options: serde_json::Value,
}
