//! Pricing service.
//!
//! The three call sites that must agree on the same arithmetic all go
//! through here: the live cart view and order creation use the lenient
//! promo policy (an invalid code degrades to "no discount"), while the
//! dedicated apply-promo endpoint is strict and surfaces the rejection.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;

use crate::{
    domain::{
        catalog::reader::CatalogReader,
        orders::snapshot::OrderTotalsSnapshot,
        pricing::{
            calculation::{CartCalculation, PromoOutcome},
            errors::PricingError,
            inputs::CartLineInput,
            resolver, totals,
        },
        promotions::{
            eligibility::{self, EligibleLine},
            models::normalize_code,
            store::PromoCodeStore,
            validator::{self, PromoRejection},
        },
        settings::reader::TaxSettingReader,
    },
    money,
};

/// How a call site treats a promo code that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromoPolicy {
    /// Record the rejection on the calculation and price without a discount.
    Lenient,

    /// Fail the whole call with the rejection reason.
    Strict,
}

#[derive(Clone)]
pub struct CartPricingService {
    catalog: Arc<dyn CatalogReader>,
    promo_codes: Arc<dyn PromoCodeStore>,
    tax_settings: Arc<dyn TaxSettingReader>,
    currency: String,
}

impl CartPricingService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        promo_codes: Arc<dyn PromoCodeStore>,
        tax_settings: Arc<dyn TaxSettingReader>,
    ) -> Self {
        Self {
            catalog,
            promo_codes,
            tax_settings,
            currency: "USD".to_string(),
        }
    }

    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    async fn price(
        &self,
        lines: &[CartLineInput],
        promo_code: Option<&str>,
        shipping_amount: u64,
        now: Timestamp,
        policy: PromoPolicy,
    ) -> Result<CartCalculation, PricingError> {
        let items = resolver::resolve(self.catalog.as_ref(), lines).await?;

        let subtotal = money::sum_minor(items.iter().map(|item| item.line_total))?;
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();

        let eligible_lines: Vec<EligibleLine> = items
            .iter()
            .map(|item| EligibleLine {
                line_id: item.line_id.clone(),
                product_uuid: item.product_uuid,
                category_uuid: item.category_uuid,
                line_total: item.line_total,
            })
            .collect();

        let (promo, eligible_line_ids, discount_amount) = self
            .promo_effect(promo_code, subtotal, &eligible_lines, now, policy)
            .await?;

        // One tax-config snapshot per logical operation; a settings change
        // mid-checkout cannot split the subtotal/tax pair.
        let tax = self.tax_settings.get_tax_config().await?;
        let totals = totals::compute(subtotal, discount_amount, &tax, shipping_amount)?;

        Ok(CartCalculation {
            items,
            item_count,
            subtotal,
            tax_rate: tax.effective_rate(),
            tax_amount: totals.tax_amount,
            shipping_amount,
            discount_amount,
            promo,
            eligible_line_ids,
            total: totals.total,
            currency: self.currency.clone(),
        })
    }

    async fn promo_effect(
        &self,
        promo_code: Option<&str>,
        subtotal: u64,
        eligible_lines: &[EligibleLine],
        now: Timestamp,
        policy: PromoPolicy,
    ) -> Result<(PromoOutcome, Vec<String>, u64), PricingError> {
        let Some(code) = promo_code else {
            return Ok((PromoOutcome::None, Vec::new(), 0));
        };

        let code = normalize_code(code);

        let Some(promo) = self.promo_codes.get_by_code(&code).await? else {
            return self.reject(code, PromoRejection::UnknownCode, policy);
        };

        if let Err(reason) = validator::validate(&promo, subtotal, now) {
            return self.reject(code, reason, policy);
        }

        let application = eligibility::applicable_discount(&promo, eligible_lines)?;

        if application.eligible_line_ids.is_empty() && policy == PromoPolicy::Strict {
            return self.reject(code, PromoRejection::NoEligibleItems, policy);
        }

        // A valid but out-of-scope promo stays "applied" with a zero
        // discount on the lenient path.
        Ok((
            PromoOutcome::Applied {
                uuid: promo.uuid,
                code: promo.code,
                discount: promo.discount,
            },
            application.eligible_line_ids,
            application.discount_amount,
        ))
    }

    fn reject(
        &self,
        code: String,
        reason: PromoRejection,
        policy: PromoPolicy,
    ) -> Result<(PromoOutcome, Vec<String>, u64), PricingError> {
        match policy {
            PromoPolicy::Strict => Err(PricingError::PromoRejected { code, reason }),
            PromoPolicy::Lenient => {
                debug!(promo_code = %code, %reason, "ignoring invalid promo code");

                Ok((PromoOutcome::Ignored { code, reason }, Vec::new(), 0))
            }
        }
    }
}

#[async_trait]
impl PricingService for CartPricingService {
    #[tracing::instrument(
        name = "pricing.service.calculate_cart",
        skip(self, lines),
        fields(line_count = lines.len(), has_promo = promo_code.is_some()),
        err
    )]
    async fn calculate_cart(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: Option<String>,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<CartCalculation, PricingError> {
        self.price(
            &lines,
            promo_code.as_deref(),
            shipping_amount,
            now,
            PromoPolicy::Lenient,
        )
        .await
    }

    #[tracing::instrument(
        name = "pricing.service.apply_promo",
        skip(self, lines),
        fields(line_count = lines.len(), promo_code = %promo_code),
        err
    )]
    async fn apply_promo(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: String,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<CartCalculation, PricingError> {
        self.price(
            &lines,
            Some(&promo_code),
            shipping_amount,
            now,
            PromoPolicy::Strict,
        )
        .await
    }

    #[tracing::instrument(
        name = "pricing.service.calculate_order_totals",
        skip(self, lines),
        fields(line_count = lines.len(), has_promo = promo_code.is_some()),
        err
    )]
    async fn calculate_order_totals(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: Option<String>,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<(CartCalculation, OrderTotalsSnapshot), PricingError> {
        let calculation = self
            .price(
                &lines,
                promo_code.as_deref(),
                shipping_amount,
                now,
                PromoPolicy::Lenient,
            )
            .await?;

        let snapshot = OrderTotalsSnapshot::from_calculation(&calculation)?;

        Ok((calculation, snapshot))
    }
}

#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Price a cart. Line failures are hard errors; an invalid promo code
    /// degrades to no discount and is recorded on the calculation.
    async fn calculate_cart(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: Option<String>,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<CartCalculation, PricingError>;

    /// Price a cart with a promo code the caller insists on: any rejection
    /// reason, including zero eligible items, fails the call.
    async fn apply_promo(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: String,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<CartCalculation, PricingError>;

    /// Price a cart and shape the result for persistence on an order.
    async fn calculate_order_totals(
        &self,
        lines: Vec<CartLineInput>,
        promo_code: Option<String>,
        shipping_amount: u64,
        now: Timestamp,
    ) -> Result<(CartCalculation, OrderTotalsSnapshot), PricingError>;
}
