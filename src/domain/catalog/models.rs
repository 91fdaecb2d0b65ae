//! Catalog Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Variant UUID
pub type VariantUuid = TypedUuid<ProductVariant>;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Category marker type. Categories are managed by the catalog CRUD
/// surface; the engine only ever sees their ids on products.
#[derive(Debug, Clone, Copy)]
pub struct Category;

/// Product Model
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub thumbnail: Option<String>,
    pub price: u64,
    pub category_uuid: Option<CategoryUuid>,
    pub stock_quantity: i64,
    pub allow_backorder: bool,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Product Status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Product Variant Model
#[derive(Debug, Clone)]
pub struct ProductVariant {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub sku: Option<String>,
    pub price: u64,
    pub stock_quantity: i64,
    pub options: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
