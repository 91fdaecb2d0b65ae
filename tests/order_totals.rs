//! Tests for freezing calculations into order totals snapshots.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;

use tally::domain::{
    catalog::{
        models::{Product, ProductStatus, ProductUuid},
        reader::MockCatalogReader,
    },
    orders::snapshot::OrderTotalsSnapshot,
    pricing::{CartPricingService, inputs::CartLineInput, service::PricingService},
    promotions::{
        models::{Discount, PromoCode, PromoCodeUuid},
        store::MockPromoCodeStore,
    },
    settings::{models::TaxConfig, reader::MockTaxSettingReader},
};

fn now() -> Result<Timestamp, jiff::Error> {
    Timestamp::from_second(1_750_000_000)
}

fn product(name: &str, price: u64, stock: i64) -> Product {
    Product {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        sku: format!("SKU-{name}"),
        thumbnail: None,
        price,
        category_uuid: None,
        stock_quantity: stock,
        allow_backorder: false,
        status: ProductStatus::Active,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

fn line(product: &Product, quantity: u32) -> CartLineInput {
    CartLineInput {
        line_id: Some(format!("line-{}", product.sku)),
        product_uuid: product.uuid,
        variant_uuid: None,
        quantity,
    }
}

fn service_for(product: Product, promo: Option<PromoCode>) -> CartPricingService {
    let mut catalog = MockCatalogReader::new();
    catalog
        .expect_get_product()
        .returning(move |_| Ok(Some(product.clone())));

    let mut promos = MockPromoCodeStore::new();
    match promo {
        Some(promo) => {
            promos
                .expect_get_by_code()
                .returning(move |code| Ok((code == promo.code).then(|| promo.clone())));
        }
        None => {
            promos.expect_get_by_code().returning(|_| Ok(None));
        }
    }

    let mut tax = MockTaxSettingReader::new();
    tax.expect_get_tax_config().returning(|| {
        Ok(TaxConfig {
            enabled: true,
            rate: Decimal::new(10, 0),
        })
    });

    CartPricingService::new(Arc::new(catalog), Arc::new(promos), Arc::new(tax))
}

#[tokio::test]
async fn snapshot_mirrors_the_calculation_it_freezes() -> TestResult {
    let teapot = product("Teapot", 1999, 10);
    let lines = vec![line(&teapot, 3)];

    let service = service_for(teapot, None);

    let (calculation, snapshot) = service
        .calculate_order_totals(lines, None, 500, now()?)
        .await?;

    assert_eq!(snapshot.subtotal, calculation.subtotal);
    assert_eq!(snapshot.tax_rate, calculation.tax_rate);
    assert_eq!(snapshot.tax_amount, calculation.tax_amount);
    assert_eq!(snapshot.shipping_amount, calculation.shipping_amount);
    assert_eq!(snapshot.discount_amount, calculation.discount_amount);
    assert_eq!(snapshot.total, calculation.total);
    assert_eq!(snapshot.promo_code_uuid, None);

    Ok(())
}

#[tokio::test]
async fn snapshot_freezes_the_applied_promo_code() -> TestResult {
    let teapot = product("Teapot", 10_000, 10);
    let lines = vec![line(&teapot, 1)];

    let promo = PromoCode {
        uuid: PromoCodeUuid::new(),
        code: "TEN".to_string(),
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
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    };

    let promo_uuid = promo.uuid;
    let service = service_for(teapot, Some(promo));

    let (calculation, snapshot) = service
        .calculate_order_totals(lines, Some("TEN".to_string()), 0, now()?)
        .await?;

    assert_eq!(calculation.discount_amount, 1000);
    assert_eq!(snapshot.promo_code_uuid, Some(promo_uuid));

    let frozen = snapshot.promo_code_snapshot.ok_or("missing frozen promo")?;

    assert_eq!(frozen["code"], "TEN");
    assert_eq!(frozen["discount"]["type"], "percentage_off");

    Ok(())
}

#[tokio::test]
async fn ignored_promo_is_absent_from_the_snapshot() -> TestResult {
    let teapot = product("Teapot", 1999, 10);
    let lines = vec![line(&teapot, 1)];

    let service = service_for(teapot, None);

    let (_, snapshot) = service
        .calculate_order_totals(lines, Some("NOPE".to_string()), 0, now()?)
        .await?;

    assert_eq!(snapshot.promo_code_uuid, None);
    assert_eq!(snapshot.promo_code_snapshot, None);

    Ok(())
}

#[tokio::test]
async fn manual_discount_recomputes_tax_once_and_freezes() -> TestResult {
    let teapot = product("Teapot", 10_000, 10);
    let lines = vec![line(&teapot, 1)];

    let service = service_for(teapot, None);

    let (calculation, _) = service
        .calculate_order_totals(lines, None, 0, now()?)
        .await?;

    let snapshot = OrderTotalsSnapshot::with_manual_discount(&calculation, 2000)?;

    // 100.00 - 20.00 manual = 80.00 taxable, 8.00 tax at 10%.
    assert_eq!(snapshot.discount_amount, 2000);
    assert_eq!(snapshot.tax_amount, 800);
    assert_eq!(snapshot.total, 8800);

    Ok(())
}
