//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::catalog::models::{
    CategoryUuid, Product, ProductStatus, ProductUuid, ProductVariant, VariantUuid,
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_VARIANT_SQL: &str = include_str!("sql/get_variant.sql");
const DECREMENT_PRODUCT_STOCK_SQL: &str = include_str!("sql/decrement_product_stock.sql");
const DECREMENT_VARIANT_STOCK_SQL: &str = include_str!("sql/decrement_variant_stock.sql");
const RESTORE_PRODUCT_STOCK_SQL: &str = include_str!("sql/restore_product_stock.sql");
const RESTORE_VARIANT_STOCK_SQL: &str = include_str!("sql/restore_variant_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<Option<ProductVariant>, sqlx::Error> {
        query_as::<Postgres, ProductVariant>(GET_VARIANT_SQL)
            .bind(variant.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Decrement stock, guarded so the row is only touched when enough stock
    /// remains or backorders are allowed. Returns the affected row count; zero
    /// means the guard rejected the decrement.
    pub(crate) async fn decrement_product_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DECREMENT_PRODUCT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn decrement_variant_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DECREMENT_VARIANT_STOCK_SQL)
            .bind(variant.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn restore_product_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RESTORE_PRODUCT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn restore_variant_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RESTORE_VARIANT_STOCK_SQL)
            .bind(variant.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status_str: String = row.try_get("status")?;

        let status = ProductStatus::parse(&status_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown product status {status_str:?}").into(),
        })?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            thumbnail: row.try_get("thumbnail")?,
            price: try_get_amount(row, "price")?,
            category_uuid: row
                .try_get::<Option<uuid::Uuid>, _>("category_uuid")?
                .map(CategoryUuid::from_uuid),
            stock_quantity: row.try_get("stock_quantity")?,
            allow_backorder: row.try_get("allow_backorder")?,
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductVariant {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: try_get_amount(row, "price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            options: row.try_get("options")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
