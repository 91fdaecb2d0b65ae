//! Totals calculation.
//!
//! Discount-before-tax policy: tax is charged on the post-discount amount.

use crate::{
    domain::settings::models::TaxConfig,
    money::{MoneyError, percent_of_minor, sum_minor},
};

/// Final figures for a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub taxable_amount: u64,
    pub tax_amount: u64,
    pub total: u64,
}

/// Combine subtotal, discount, tax rate and shipping into a total.
///
/// # Errors
///
/// Returns a [`MoneyError`] when tax arithmetic overflows.
pub fn compute(
    subtotal: u64,
    discount_amount: u64,
    tax: &TaxConfig,
    shipping_amount: u64,
) -> Result<Totals, MoneyError> {
    let taxable_amount = subtotal.saturating_sub(discount_amount);
    let tax_amount = percent_of_minor(tax.effective_rate(), taxable_amount)?;
    let total = sum_minor([taxable_amount, tax_amount, shipping_amount])?;

    Ok(Totals {
        taxable_amount,
        tax_amount,
        total,
    })
}
