//! Line item resolution.
//!
//! Turns raw cart lines into priced, validated line items. All prices and
//! stock figures come from the catalog at call time; nothing from the input
//! is trusted beyond ids and quantities.

use uuid::Uuid;

use crate::{
    domain::{
        catalog::{
            models::{Product, ProductStatus, ProductVariant},
            reader::CatalogReader,
        },
        pricing::{
            errors::PricingError,
            inputs::CartLineInput,
            resolved::{ProductSnapshot, ResolvedLineItem, VariantSnapshot},
        },
    },
    money::MoneyError,
};

/// Resolve every input line or fail on the first unresolvable one.
///
/// # Errors
///
/// Returns the line-level failure: unknown/inactive product or variant, out
/// of stock, or insufficient stock without backorder permission.
pub async fn resolve(
    catalog: &dyn CatalogReader,
    lines: &[CartLineInput],
) -> Result<Vec<ResolvedLineItem>, PricingError> {
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        items.push(resolve_line(catalog, line).await?);
    }

    Ok(items)
}

async fn resolve_line(
    catalog: &dyn CatalogReader,
    line: &CartLineInput,
) -> Result<ResolvedLineItem, PricingError> {
    if line.quantity == 0 {
        return Err(PricingError::InvalidQuantity);
    }

    let product = catalog
        .get_product(line.product_uuid)
        .await?
        .filter(|product| product.status == ProductStatus::Active)
        .ok_or(PricingError::ProductNotAvailable {
            product: line.product_uuid,
        })?;

    let variant = match line.variant_uuid {
        Some(variant_uuid) => Some(
            catalog
                .get_variant(variant_uuid)
                .await?
                .filter(|variant| variant.is_active && variant.product_uuid == product.uuid)
                .ok_or(PricingError::VariantNotAvailable {
                    variant: variant_uuid,
                })?,
        ),
        None => None,
    };

    // The variant's price and stock take the product's place when present.
    let unit_price = variant.as_ref().map_or(product.price, |v| v.price);
    let effective_stock = variant
        .as_ref()
        .map_or(product.stock_quantity, |v| v.stock_quantity);

    let in_stock = effective_stock > 0 || product.allow_backorder;

    if !in_stock {
        return Err(PricingError::OutOfStock { name: product.name });
    }

    if i64::from(line.quantity) > effective_stock && !product.allow_backorder {
        return Err(PricingError::InsufficientStock {
            name: product.name,
            requested: line.quantity,
            available: effective_stock.max(0),
        });
    }

    let line_total = unit_price
        .checked_mul(u64::from(line.quantity))
        .ok_or(MoneyError::AmountOverflow)?;

    let line_id = line
        .line_id
        .clone()
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    Ok(ResolvedLineItem {
        line_id,
        product_uuid: product.uuid,
        variant_uuid: variant.as_ref().map(|v| v.uuid),
        category_uuid: product.category_uuid,
        unit_price,
        quantity: line.quantity,
        line_total,
        product: product_snapshot(&product, in_stock),
        variant: variant.map(variant_snapshot),
    })
}

fn product_snapshot(product: &Product, in_stock: bool) -> ProductSnapshot {
    ProductSnapshot {
        name: product.name.clone(),
        sku: product.sku.clone(),
        thumbnail: product.thumbnail.clone(),
        stock_quantity: product.stock_quantity,
        in_stock,
    }
}

fn variant_snapshot(variant: ProductVariant) -> VariantSnapshot {
    VariantSnapshot {
        name: variant.name,
        sku: variant.sku,
        options: variant.options,
    }
}
