//! Order totals snapshot.
//!
//! The durable record of what the customer was charged. Built exactly once,
//! at order-creation time, by copying a calculation verbatim; later catalog
//! or promo changes can never reach it.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    pricing::{
        calculation::{CartCalculation, PromoOutcome},
        errors::PricingError,
        totals,
    },
    promotions::models::{Discount, PromoCodeUuid},
    settings::models::TaxConfig,
};

/// Frozen monetary totals copied onto a persisted order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTotalsSnapshot {
    pub subtotal: u64,
    pub tax_rate: Decimal,
    pub tax_amount: u64,
    pub shipping_amount: u64,
    pub discount_amount: u64,
    pub total: u64,
    pub promo_code_uuid: Option<PromoCodeUuid>,
    /// The promo code as it was at purchase time, so the record survives
    /// later edits to the code itself.
    pub promo_code_snapshot: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct FrozenPromoCode<'a> {
    uuid: PromoCodeUuid,
    code: &'a str,
    discount: &'a Discount,
}

impl OrderTotalsSnapshot {
    /// Copy a calculation's monetary fields verbatim. No recomputation.
    ///
    /// # Errors
    ///
    /// Returns an error when the frozen promo code cannot be serialized.
    pub fn from_calculation(calculation: &CartCalculation) -> Result<Self, serde_json::Error> {
        let (promo_code_uuid, promo_code_snapshot) = match &calculation.promo {
            PromoOutcome::Applied {
                uuid,
                code,
                discount,
            } => (
                Some(*uuid),
                Some(serde_json::to_value(FrozenPromoCode {
                    uuid: *uuid,
                    code,
                    discount,
                })?),
            ),
            PromoOutcome::None | PromoOutcome::Ignored { .. } => (None, None),
        };

        Ok(Self {
            subtotal: calculation.subtotal,
            tax_rate: calculation.tax_rate,
            tax_amount: calculation.tax_amount,
            shipping_amount: calculation.shipping_amount,
            discount_amount: calculation.discount_amount,
            total: calculation.total,
            promo_code_uuid,
            promo_code_snapshot,
        })
    }

    /// Freeze a calculation with an extra manual discount, as used by
    /// admin-created orders. The manual amount is added after the promo
    /// discount and before tax; tax and total are recomputed once from the
    /// combined discount, then the result is frozen like any other snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when tax arithmetic overflows or the frozen promo
    /// code cannot be serialized.
    pub fn with_manual_discount(
        calculation: &CartCalculation,
        manual_discount_amount: u64,
    ) -> Result<Self, PricingError> {
        let mut snapshot = Self::from_calculation(calculation)?;

        let combined = calculation
            .discount_amount
            .saturating_add(manual_discount_amount)
            .min(calculation.subtotal);

        // The calculation's effective rate is the tax-config snapshot for
        // this operation; recomputing from it cannot drift.
        let tax = TaxConfig {
            enabled: true,
            rate: calculation.tax_rate,
        };

        let totals = totals::compute(
            calculation.subtotal,
            combined,
            &tax,
            calculation.shipping_amount,
        )?;

        snapshot.discount_amount = combined;
        snapshot.tax_amount = totals.tax_amount;
        snapshot.total = totals.total;

        Ok(snapshot)
    }
}
