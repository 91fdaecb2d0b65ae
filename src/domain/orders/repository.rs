//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    catalog::{
        models::{ProductUuid, VariantUuid},
        repository::try_get_amount,
    },
    orders::{
        models::{OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
        snapshot::OrderTotalsSnapshot,
        status::OrderStatus,
    },
    promotions::models::PromoCodeUuid,
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const SET_ORDER_STATUS_SQL: &str = include_str!("sql/set_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        totals: &OrderTotalsSnapshot,
        currency: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        let (created_at, updated_at): (SqlxTimestamp, SqlxTimestamp) = query_as(CREATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(amount_i64(totals.subtotal, "subtotal")?)
            .bind(totals.tax_rate)
            .bind(amount_i64(totals.tax_amount, "tax_amount")?)
            .bind(amount_i64(totals.shipping_amount, "shipping_amount")?)
            .bind(amount_i64(totals.discount_amount, "discount_amount")?)
            .bind(amount_i64(totals.total, "total")?)
            .bind(totals.promo_code_uuid.map(PromoCodeUuid::into_uuid))
            .bind(&totals.promo_code_snapshot)
            .bind(currency)
            .fetch_one(&mut **tx)
            .await?;

        Ok(OrderRecord {
            uuid: order,
            status,
            totals: totals.clone(),
            currency: currency.to_string(),
            items: Vec::new(),
            created_at: created_at.to_jiff(),
            updated_at: updated_at.to_jiff(),
        })
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: &OrderLineRecord,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(item.variant_uuid.map(VariantUuid::into_uuid))
            .bind(&item.name)
            .bind(&item.sku)
            .bind(i64::from(item.quantity))
            .bind(amount_i64(item.unit_price, "unit_price")?)
            .bind(amount_i64(item.line_total, "line_total")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLineRecord>, sqlx::Error> {
        query_as::<Postgres, OrderLineRecord>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status_str: String = row.try_get("status")?;

        let status = OrderStatus::parse(&status_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown order status {status_str:?}").into(),
        })?;

        let totals = OrderTotalsSnapshot {
            subtotal: try_get_amount(row, "subtotal")?,
            tax_rate: row.try_get::<Decimal, _>("tax_rate")?,
            tax_amount: try_get_amount(row, "tax_amount")?,
            shipping_amount: try_get_amount(row, "shipping_amount")?,
            discount_amount: try_get_amount(row, "discount_amount")?,
            total: try_get_amount(row, "total")?,
            promo_code_uuid: row
                .try_get::<Option<Uuid>, _>("promo_code_uuid")?
                .map(PromoCodeUuid::from_uuid),
            promo_code_snapshot: row.try_get("promo_code_snapshot")?,
        };

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            status,
            totals,
            currency: row.try_get("currency")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i64: i64 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            variant_uuid: row
                .try_get::<Option<Uuid>, _>("variant_uuid")?
                .map(VariantUuid::from_uuid),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            quantity,
            unit_price: try_get_amount(row, "unit_price")?,
            line_total: try_get_amount(row, "line_total")?,
        })
    }
}

fn amount_i64(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
