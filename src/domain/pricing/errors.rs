//! Pricing errors.

use thiserror::Error;

use crate::{
    domain::{
        catalog::{
            CatalogError,
            models::{ProductUuid, VariantUuid},
        },
        promotions::{PromotionsError, validator::PromoRejection},
        settings::SettingsError,
    },
    money::MoneyError,
};

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("line quantity must be greater than zero")]
    InvalidQuantity,

    #[error("product {product} is not available")]
    ProductNotAvailable { product: ProductUuid },

    #[error("variant {variant} is not available")]
    VariantNotAvailable { variant: VariantUuid },

    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    #[error("not enough stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: i64,
    },

    #[error("promo code {code} was rejected")]
    PromoRejected {
        code: String,
        #[source]
        reason: PromoRejection,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Promotions(#[from] PromotionsError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Arithmetic(#[from] MoneyError),

    #[error("failed to serialize frozen promo code")]
    Serialization(#[from] serde_json::Error),
}
