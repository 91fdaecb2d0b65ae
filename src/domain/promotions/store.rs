//! Promo code store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        catalog::{
            models::{CategoryUuid, ProductUuid},
            repository::try_get_amount,
        },
        promotions::{
            errors::PromotionsError,
            models::{Discount, PromoCode, PromoCodeUuid, normalize_code},
        },
    },
};

const GET_PROMO_CODE_SQL: &str = include_str!("sql/get_promo_code_by_code.sql");
const INCREMENT_PROMO_USAGE_SQL: &str = include_str!("sql/increment_promo_usage.sql");

#[derive(Debug, Clone)]
pub struct PgPromoCodeStore {
    db: Db,
    repository: PgPromoCodesRepository,
}

impl PgPromoCodeStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromoCodesRepository::new(),
        }
    }
}

#[async_trait]
impl PromoCodeStore for PgPromoCodeStore {
    async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>, PromotionsError> {
        let mut tx = self.db.begin().await?;

        let promo = self.repository.get_by_code(&mut tx, code).await?;

        tx.commit().await?;

        Ok(promo)
    }

    async fn increment_usage(&self, promo: PromoCodeUuid) -> Result<(), PromotionsError> {
        let mut tx = self.db.begin().await?;

        self.repository.increment_usage(&mut tx, promo).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PromoCodeStore: Send + Sync {
    /// Look up a promo code, case-insensitively. `None` when missing.
    async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>, PromotionsError>;

    /// Advance the usage counter. Called by order creation only, after the
    /// order has been persisted; never during calculation.
    async fn increment_usage(&self, promo: PromoCodeUuid) -> Result<(), PromotionsError>;
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromoCodesRepository;

impl PgPromoCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        query_as::<Postgres, PromoCode>(GET_PROMO_CODE_SQL)
            .bind(normalize_code(code))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo: PromoCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(INCREMENT_PROMO_USAGE_SQL)
            .bind(promo.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for PromoCode {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        // An unmapped discount type is a data-model mismatch, not something
        // to paper over.
        let discount = match discount_type.as_str() {
            "percentage_off" => Discount::PercentageOff {
                percentage: row.try_get::<Decimal, _>("percentage")?,
            },
            "amount_off" => Discount::AmountOff {
                amount: try_get_amount(row, "amount")?,
            },
            other => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "discount_type".to_string(),
                    source: format!("unknown discount type {other:?}").into(),
                });
            }
        };

        Ok(Self {
            uuid: PromoCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount,
            minimum_order_amount: try_get_optional_amount(row, "minimum_order_amount")?,
            maximum_discount_amount: try_get_optional_amount(row, "maximum_discount_amount")?,
            usage_limit: try_get_optional_count(row, "usage_limit")?,
            usage_count: try_get_count(row, "usage_count")?,
            usage_limit_per_customer: try_get_optional_count(row, "usage_limit_per_customer")?,
            starts_at: row
                .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                .map(SqlxTimestamp::to_jiff),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            is_active: row.try_get("is_active")?,
            applies_to_products: row
                .try_get::<Vec<Uuid>, _>("applies_to_products")?
                .into_iter()
                .map(ProductUuid::from_uuid)
                .collect(),
            applies_to_categories: row
                .try_get::<Vec<Uuid>, _>("applies_to_categories")?
                .into_iter()
                .map(CategoryUuid::from_uuid)
                .collect(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(col)?
        .map(|amount| {
            u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i32: i32 = row.try_get(col)?;

    u32::try_from(count_i32).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn try_get_optional_count(row: &PgRow, col: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(col)?
        .map(|count| {
            u32::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}
