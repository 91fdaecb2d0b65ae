//! Discount eligibility.
//!
//! Determines which cart lines a validated promo code is scoped to and how
//! much discount it yields. An unrestricted code covers every line; a scoped
//! code covers a line when its product id or its category id is listed. Zero
//! eligible lines is not an error here; the calling site decides whether a
//! no-effect promo is acceptable.

use rustc_hash::FxHashSet;

use crate::{
    domain::{
        catalog::models::{CategoryUuid, ProductUuid},
        promotions::models::{Discount, PromoCode},
    },
    money::{MoneyError, percent_of_minor, sum_minor},
};

/// The per-line facts eligibility filtering needs.
#[derive(Debug, Clone)]
pub struct EligibleLine {
    pub line_id: String,
    pub product_uuid: ProductUuid,
    pub category_uuid: Option<CategoryUuid>,
    pub line_total: u64,
}

/// A promo code's computed effect on a set of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountApplication {
    pub discount_amount: u64,
    pub eligible_subtotal: u64,
    pub eligible_line_ids: Vec<String>,
}

impl DiscountApplication {
    const fn none() -> Self {
        Self {
            discount_amount: 0,
            eligible_subtotal: 0,
            eligible_line_ids: Vec::new(),
        }
    }
}

/// Compute the discount a promo code yields over the given lines.
///
/// The discount is never larger than the eligible subtotal, even after the
/// optional maximum-discount cap is applied.
///
/// # Errors
///
/// Returns a [`MoneyError`] when percentage arithmetic overflows.
pub fn applicable_discount(
    promo: &PromoCode,
    lines: &[EligibleLine],
) -> Result<DiscountApplication, MoneyError> {
    let products: FxHashSet<ProductUuid> = promo.applies_to_products.iter().copied().collect();
    let categories: FxHashSet<CategoryUuid> = promo.applies_to_categories.iter().copied().collect();

    let unrestricted = products.is_empty() && categories.is_empty();

    let eligible: Vec<&EligibleLine> = lines
        .iter()
        .filter(|line| {
            unrestricted
                || products.contains(&line.product_uuid)
                || line
                    .category_uuid
                    .is_some_and(|category| categories.contains(&category))
        })
        .collect();

    if eligible.is_empty() {
        return Ok(DiscountApplication::none());
    }

    let eligible_subtotal = sum_minor(eligible.iter().map(|line| line.line_total))?;

    let mut discount_amount = match &promo.discount {
        Discount::PercentageOff { percentage } => {
            percent_of_minor(*percentage, eligible_subtotal)?
        }
        Discount::AmountOff { amount } => (*amount).min(eligible_subtotal),
    };

    if let Some(cap) = promo.maximum_discount_amount {
        discount_amount = discount_amount.min(cap);
    }

    // Clamp last: a cap can never push the discount past what the eligible
    // lines are worth.
    discount_amount = discount_amount.min(eligible_subtotal);

    Ok(DiscountApplication {
        discount_amount,
        eligible_subtotal,
        eligible_line_ids: eligible
            .into_iter()
            .map(|line| line.line_id.clone())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::promotions::models::PromoCodeUuid;

    use super::*;

    fn promo(discount: Discount) -> PromoCode {
        PromoCode {
            uuid: PromoCodeUuid::new(),
            code: "TEST".to_string(),
            discount,
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
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            deleted_at: None,
        }
    }

    fn line(id: &str, total: u64) -> EligibleLine {
        EligibleLine {
            line_id: id.to_string(),
            product_uuid: ProductUuid::new(),
            category_uuid: None,
            line_total: total,
        }
    }

    #[test]
    fn unrestricted_promo_covers_all_lines() -> TestResult {
        let promo = promo(Discount::PercentageOff {
            percentage: Decimal::new(10, 0),
        });

        let lines = [line("a", 1000), line("b", 2000)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.eligible_subtotal, 3000);
        assert_eq!(application.discount_amount, 300);
        assert_eq!(application.eligible_line_ids, vec!["a", "b"]);

        Ok(())
    }

    #[test]
    fn product_scoped_promo_covers_listed_products_only() -> TestResult {
        let mut promo = promo(Discount::PercentageOff {
            percentage: Decimal::new(50, 0),
        });

        let covered = line("a", 1000);
        promo.applies_to_products = vec![covered.product_uuid];

        let lines = [covered, line("b", 9000)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.eligible_subtotal, 1000);
        assert_eq!(application.discount_amount, 500);
        assert_eq!(application.eligible_line_ids, vec!["a"]);

        Ok(())
    }

    #[test]
    fn category_scoped_promo_matches_by_category() -> TestResult {
        let category = CategoryUuid::new();

        let mut promo = promo(Discount::AmountOff { amount: 200 });
        promo.applies_to_categories = vec![category];

        let mut covered = line("a", 1500);
        covered.category_uuid = Some(category);

        let lines = [covered, line("b", 1500)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.eligible_subtotal, 1500);
        assert_eq!(application.discount_amount, 200);
        assert_eq!(application.eligible_line_ids, vec!["a"]);

        Ok(())
    }

    #[test]
    fn scoped_promo_with_no_matching_lines_yields_zero() -> TestResult {
        let mut promo = promo(Discount::PercentageOff {
            percentage: Decimal::new(20, 0),
        });
        promo.applies_to_categories = vec![CategoryUuid::new()];

        let lines = [line("a", 1000), line("b", 2000)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application, DiscountApplication::none());

        Ok(())
    }

    #[test]
    fn percentage_discount_is_capped_by_maximum() -> TestResult {
        // 20% of 200.00 is 40.00, capped at 30.00.
        let mut promo = promo(Discount::PercentageOff {
            percentage: Decimal::new(20, 0),
        });
        promo.maximum_discount_amount = Some(3000);

        let lines = [line("a", 20_000)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.discount_amount, 3000);

        Ok(())
    }

    #[test]
    fn fixed_discount_clamps_to_eligible_subtotal() -> TestResult {
        // A 50.00 fixed discount on 35.00 of eligible items never exceeds
        // what those items are worth.
        let promo = promo(Discount::AmountOff { amount: 5000 });

        let lines = [line("a", 3500)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.discount_amount, 3500);

        Ok(())
    }

    #[test]
    fn percentage_discount_rounds_half_up() -> TestResult {
        // 5% of 12.50 is 0.625: the midpoint lands on 63, not 62.
        let promo = promo(Discount::PercentageOff {
            percentage: Decimal::new(5, 0),
        });

        let lines = [line("a", 1250)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.discount_amount, 63);

        Ok(())
    }

    #[test]
    fn discount_never_exceeds_eligible_subtotal_despite_cap() -> TestResult {
        // Cap above the eligible subtotal: the final clamp still applies.
        let mut promo = promo(Discount::AmountOff { amount: 10_000 });
        promo.maximum_discount_amount = Some(8000);

        let lines = [line("a", 2500)];
        let application = applicable_discount(&promo, &lines)?;

        assert_eq!(application.discount_amount, 2500);

        Ok(())
    }
}
