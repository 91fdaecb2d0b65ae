//! Promotion Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::catalog::models::{CategoryUuid, ProductUuid},
    uuids::TypedUuid,
};

/// Promo Code UUID
pub type PromoCodeUuid = TypedUuid<PromoCode>;

/// Discount carried by a promo code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    PercentageOff { percentage: Decimal },
    AmountOff { amount: u64 },
}

impl Discount {
    #[must_use]
    pub const fn type_as_str(&self) -> &'static str {
        match self {
            Self::PercentageOff { .. } => "percentage_off",
            Self::AmountOff { .. } => "amount_off",
        }
    }
}

/// Promo Code Model
///
/// Read-only to the engine; the usage counter is incremented externally,
/// only after an order is successfully created.
#[derive(Debug, Clone)]
pub struct PromoCode {
    pub uuid: PromoCodeUuid,
    /// Stored upper-case; lookups normalize the same way.
    pub code: String,
    pub discount: Discount,
    pub minimum_order_amount: Option<u64>,
    pub maximum_discount_amount: Option<u64>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    /// Per-customer limits need a customer identity, which the engine does
    /// not have; enforcement belongs to the auth-owning caller.
    pub usage_limit_per_customer: Option<u32>,
    pub starts_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
    /// Empty means unrestricted.
    pub applies_to_products: Vec<ProductUuid>,
    pub applies_to_categories: Vec<CategoryUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Normalize a raw promo code for comparison and storage.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
