//! Cart Calculation

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    pricing::resolved::ResolvedLineItem,
    promotions::{
        models::{Discount, PromoCodeUuid},
        validator::PromoRejection,
    },
};

/// What happened to the promo code during a calculation.
///
/// A rejection only becomes a hard error at call sites that opt into strict
/// handling; the lenient path records it here instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PromoOutcome {
    /// No code was supplied.
    None,

    /// The code validated; its discount (possibly zero) is in effect.
    Applied {
        uuid: PromoCodeUuid,
        code: String,
        discount: Discount,
    },

    /// The code failed validation and was treated as absent.
    Ignored {
        code: String,
        reason: PromoRejection,
    },
}

/// A fully priced cart.
///
/// Ephemeral: recomputed on every request, never the system of record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartCalculation {
    pub items: Vec<ResolvedLineItem>,
    /// Sum of line quantities.
    pub item_count: u64,
    /// Minor units; exact sum of exact line totals.
    pub subtotal: u64,
    /// The effective rate used: zero when tax is disabled.
    pub tax_rate: Decimal,
    pub tax_amount: u64,
    pub shipping_amount: u64,
    pub discount_amount: u64,
    pub promo: PromoOutcome,
    /// Line ids the promo discount was computed over.
    pub eligible_line_ids: Vec<String>,
    pub total: u64,
    pub currency: String,
}
