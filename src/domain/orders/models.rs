//! Order Models

use jiff::Timestamp;

use crate::{
    domain::{
        catalog::models::{ProductUuid, VariantUuid},
        orders::{snapshot::OrderTotalsSnapshot, status::OrderStatus},
        pricing::inputs::CartLineInput,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLineRecord>;

/// Order Record
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub status: OrderStatus,
    pub totals: OrderTotalsSnapshot,
    pub currency: String,
    pub items: Vec<OrderLineRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Line Record
#[derive(Debug, Clone)]
pub struct OrderLineRecord {
    pub uuid: OrderLineUuid,
    pub product_uuid: ProductUuid,
    pub variant_uuid: Option<VariantUuid>,
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<CartLineInput>,
    pub promo_code: Option<String>,
    pub shipping_amount: u64,
}

/// New Admin Order Data
///
/// Same as [`NewOrder`] plus a manual discount applied after the promo
/// discount and before tax, computed once at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<CartLineInput>,
    pub promo_code: Option<String>,
    pub shipping_amount: u64,
    pub manual_discount_amount: u64,
}
