//! Monetary arithmetic
//!
//! All stored amounts are integer minor units (cents). Line totals and
//! subtotals are therefore exact; fractions only appear when a percentage
//! rate is applied, and those intermediates are computed in [`Decimal`] and
//! rounded half-up back to minor units. Summation happens before rounding,
//! never the other way around, so rounding error cannot accumulate across
//! lines.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors from minor-unit arithmetic.
#[derive(Debug, Error)]
pub enum MoneyError {
    /// Percentage calculation overflowed or was not representable.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor-unit addition overflowed.
    #[error("amount overflowed minor-unit range")]
    AmountOverflow,
}

/// Calculate `percent` of a minor-unit amount, rounded half-up.
///
/// `percent` is expressed in whole percentage points: `20` means 20%,
/// `7.5` means 7.5%.
///
/// # Errors
///
/// Returns [`MoneyError::PercentConversion`] when the calculation overflows
/// or produces a value outside the minor-unit range (e.g. a negative rate).
pub fn percent_of_minor(percent: Decimal, minor: u64) -> Result<u64, MoneyError> {
    let minor = Decimal::from_u64(minor).ok_or(MoneyError::PercentConversion)?;

    percent
        .checked_mul(minor)
        .ok_or(MoneyError::PercentConversion)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(MoneyError::PercentConversion)
}

/// Sum minor-unit amounts, failing on overflow instead of wrapping.
///
/// # Errors
///
/// Returns [`MoneyError::AmountOverflow`] when the running total exceeds
/// `u64::MAX`.
pub fn sum_minor<I: IntoIterator<Item = u64>>(amounts: I) -> Result<u64, MoneyError> {
    amounts
        .into_iter()
        .try_fold(0_u64, |acc, amount| acc.checked_add(amount))
        .ok_or(MoneyError::AmountOverflow)
}
