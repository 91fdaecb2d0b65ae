//! Promo code validation.
//!
//! Checks run in a fixed order and the first failing check wins, so callers
//! always see the most fundamental reason first (an inactive code reports
//! `Inactive` even when it has also expired).

use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::domain::promotions::models::PromoCode;

/// Why a promo code fails validation or has no effect on a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PromoRejection {
    #[error("promo code not found")]
    UnknownCode,

    #[error("promo code is not active")]
    Inactive,

    #[error("promo code is not active yet")]
    NotStarted,

    #[error("promo code has expired")]
    Expired,

    #[error("promo code usage limit has been reached")]
    UsageLimitReached,

    #[error("order subtotal is below the minimum of {minimum} minor units")]
    MinimumNotMet { minimum: u64 },

    #[error("promo code does not apply to any item in the cart")]
    NoEligibleItems,
}

/// Validate a fetched promo code against its temporal, usage and amount
/// constraints. Mutates nothing; the usage counter is only advanced after an
/// order is created.
///
/// # Errors
///
/// Returns the first failing [`PromoRejection`], in check order: active flag,
/// start, expiry, usage limit, minimum order amount.
pub fn validate(promo: &PromoCode, subtotal: u64, now: Timestamp) -> Result<(), PromoRejection> {
    if !promo.is_active {
        return Err(PromoRejection::Inactive);
    }

    if let Some(starts_at) = promo.starts_at {
        if now < starts_at {
            return Err(PromoRejection::NotStarted);
        }
    }

    if let Some(expires_at) = promo.expires_at {
        if now > expires_at {
            return Err(PromoRejection::Expired);
        }
    }

    if let Some(limit) = promo.usage_limit {
        if promo.usage_count >= limit {
            return Err(PromoRejection::UsageLimitReached);
        }
    }

    if let Some(minimum) = promo.minimum_order_amount {
        if subtotal < minimum {
            return Err(PromoRejection::MinimumNotMet { minimum });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::promotions::models::{Discount, PromoCodeUuid};

    use super::*;

    fn promo(now: Timestamp) -> PromoCode {
        PromoCode {
            uuid: PromoCodeUuid::new(),
            code: "SUMMER10".to_string(),
            discount: Discount::PercentageOff {
                percentage: Decimal::new(10, 0),
            },
            minimum_order_amount: None,
            maximum_discount_amount: None,
            usage_limit: None,
            usage_count: 0,
            usage_limit_per_customer: None,
            starts_at: None,
            expires_at: None,
            is_active: true,
            applies_to_products: Vec::new(),
            applies_to_categories: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn now() -> Result<Timestamp, jiff::Error> {
        Timestamp::from_second(1_750_000_000)
    }

    #[test]
    fn unconstrained_active_code_validates() -> TestResult {
        let now = now()?;

        assert_eq!(validate(&promo(now), 100, now), Ok(()));

        Ok(())
    }

    #[test]
    fn inactive_code_is_rejected() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.is_active = false;

        assert_eq!(validate(&promo, 100, now), Err(PromoRejection::Inactive));

        Ok(())
    }

    #[test]
    fn inactive_wins_over_expiry() -> TestResult {
        // Check order is fixed: the active flag is examined before dates.
        let now = now()?;
        let mut promo = promo(now);
        promo.is_active = false;
        promo.expires_at = Some(now.checked_sub(1.hour())?);

        assert_eq!(validate(&promo, 100, now), Err(PromoRejection::Inactive));

        Ok(())
    }

    #[test]
    fn code_before_start_is_rejected() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.starts_at = Some(now.checked_add(1.hour())?);

        assert_eq!(validate(&promo, 100, now), Err(PromoRejection::NotStarted));

        Ok(())
    }

    #[test]
    fn code_starting_exactly_now_validates() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.starts_at = Some(now);

        assert_eq!(validate(&promo, 100, now), Ok(()));

        Ok(())
    }

    #[test]
    fn expired_code_is_rejected() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.expires_at = Some(now.checked_sub(1.minute())?);

        assert_eq!(validate(&promo, 100, now), Err(PromoRejection::Expired));

        Ok(())
    }

    #[test]
    fn code_expiring_exactly_now_validates() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.expires_at = Some(now);

        assert_eq!(validate(&promo, 100, now), Ok(()));

        Ok(())
    }

    #[test]
    fn exhausted_usage_limit_is_rejected() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.usage_limit = Some(5);
        promo.usage_count = 5;

        assert_eq!(
            validate(&promo, 100, now),
            Err(PromoRejection::UsageLimitReached)
        );

        Ok(())
    }

    #[test]
    fn usage_below_limit_validates() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.usage_limit = Some(5);
        promo.usage_count = 4;

        assert_eq!(validate(&promo, 100, now), Ok(()));

        Ok(())
    }

    #[test]
    fn subtotal_below_minimum_is_rejected() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.minimum_order_amount = Some(5000);

        assert_eq!(
            validate(&promo, 4999, now),
            Err(PromoRejection::MinimumNotMet { minimum: 5000 })
        );

        Ok(())
    }

    #[test]
    fn subtotal_meeting_minimum_validates() -> TestResult {
        let now = now()?;
        let mut promo = promo(now);
        promo.minimum_order_amount = Some(5000);

        assert_eq!(validate(&promo, 5000, now), Ok(()));

        Ok(())
    }
}
