//! Orders service.
//!
//! Order creation wraps stock decrement, promo usage increment and the
//! snapshot insert in one transaction, so concurrent checkouts cannot
//! oversell scarce inventory or overshoot a usage-limited code: the stock
//! guard re-checks at write time and a conflict rolls everything back.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository,
        orders::{
            errors::OrdersError,
            models::{
                NewAdminOrder, NewOrder, OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid,
            },
            repository::PgOrdersRepository,
            snapshot::OrderTotalsSnapshot,
            status::OrderStatus,
        },
        pricing::{
            calculation::{CartCalculation, PromoOutcome},
            resolved::ResolvedLineItem,
            service::PricingService,
        },
        promotions::store::PgPromoCodesRepository,
    },
};

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    pricing: Arc<dyn PricingService>,
    orders: PgOrdersRepository,
    catalog: PgCatalogRepository,
    promo_codes: PgPromoCodesRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, pricing: Arc<dyn PricingService>) -> Self {
        Self {
            db,
            pricing,
            orders: PgOrdersRepository::new(),
            catalog: PgCatalogRepository::new(),
            promo_codes: PgPromoCodesRepository::new(),
        }
    }

    /// Persist a calculation as an order: insert the order row, claim stock
    /// for every line, record the lines, and advance the promo usage
    /// counter, all inside the caller's transaction.
    async fn persist_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        calculation: &CartCalculation,
        snapshot: &OrderTotalsSnapshot,
    ) -> Result<OrderRecord, OrdersError> {
        let mut record = self
            .orders
            .create_order(tx, order, OrderStatus::Pending, snapshot, &calculation.currency)
            .await?;

        for item in &calculation.items {
            self.claim_stock(tx, item).await?;

            let line = order_line(item);

            self.orders.create_order_item(tx, order, &line).await?;
            record.items.push(line);
        }

        if let PromoOutcome::Applied { uuid, .. } = &calculation.promo {
            self.promo_codes.increment_usage(tx, *uuid).await?;
        }

        Ok(record)
    }

    async fn claim_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: &ResolvedLineItem,
    ) -> Result<(), OrdersError> {
        let rows_affected = match item.variant_uuid {
            Some(variant) => {
                self.catalog
                    .decrement_variant_stock(tx, variant, item.quantity)
                    .await?
            }
            None => {
                self.catalog
                    .decrement_product_stock(tx, item.product_uuid, item.quantity)
                    .await?
            }
        };

        if rows_affected == 0 {
            return Err(OrdersError::StockConflict {
                name: item.product.name.clone(),
            });
        }

        Ok(())
    }

    async fn release_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[OrderLineRecord],
    ) -> Result<(), OrdersError> {
        for item in items {
            match item.variant_uuid {
                Some(variant) => {
                    self.catalog
                        .restore_variant_stock(tx, variant, item.quantity)
                        .await?;
                }
                None => {
                    self.catalog
                        .restore_product_stock(tx, item.product_uuid, item.quantity)
                        .await?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders
            .get_order(&mut tx, order)
            .await?
            .ok_or(OrdersError::NotFound)?;

        let items = self.orders.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        record.items = items;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(order_uuid = %order.uuid, line_count = order.lines.len()),
        err
    )]
    async fn create_order(
        &self,
        order: NewOrder,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersError> {
        let (calculation, snapshot) = self
            .pricing
            .calculate_order_totals(
                order.lines,
                order.promo_code,
                order.shipping_amount,
                now,
            )
            .await?;

        let mut tx = self.db.begin().await?;

        let record = self
            .persist_order(&mut tx, order.uuid, &calculation, &snapshot)
            .await?;

        tx.commit().await?;

        info!(order_uuid = %record.uuid, total = record.totals.total, "created order");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.create_admin_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            line_count = order.lines.len(),
            manual_discount = order.manual_discount_amount
        ),
        err
    )]
    async fn create_admin_order(
        &self,
        order: NewAdminOrder,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersError> {
        let calculation = self
            .pricing
            .calculate_cart(order.lines, order.promo_code, order.shipping_amount, now)
            .await?;

        let snapshot =
            OrderTotalsSnapshot::with_manual_discount(&calculation, order.manual_discount_amount)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .persist_order(&mut tx, order.uuid, &calculation, &snapshot)
            .await?;

        tx.commit().await?;

        info!(order_uuid = %record.uuid, total = record.totals.total, "created admin order");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.transition_status",
        skip(self),
        fields(order_uuid = %order, to = %to),
        err
    )]
    async fn transition_status(
        &self,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders
            .get_order(&mut tx, order)
            .await?
            .ok_or(OrdersError::NotFound)?;

        if !record.status.can_transition_to(to) {
            return Err(OrdersError::InvalidTransition {
                from: record.status,
                to,
            });
        }

        self.orders.set_status(&mut tx, order, to).await?;

        let items = self.orders.get_order_items(&mut tx, order).await?;

        // Cancellation gives the claimed stock back. The frozen totals
        // snapshot is not touched by any transition.
        if to == OrderStatus::Cancelled {
            self.release_stock(&mut tx, &items).await?;
        }

        tx.commit().await?;

        info!(order_uuid = %order, from = %record.status, %to, "order status changed");

        record.status = to;
        record.items = items;

        Ok(record)
    }
}

fn order_line(item: &ResolvedLineItem) -> OrderLineRecord {
    let sku = item
        .variant
        .as_ref()
        .and_then(|variant| variant.sku.clone())
        .unwrap_or_else(|| item.product.sku.clone());

    OrderLineRecord {
        uuid: OrderLineUuid::new(),
        product_uuid: item.product_uuid,
        variant_uuid: item.variant_uuid,
        name: item.product.name.clone(),
        sku,
        quantity: item.quantity,
        unit_price: item.unit_price,
        line_total: item.line_total,
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Retrieve a single order with its lines.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersError>;

    /// Price the lines and persist the result as a pending order,
    /// transactionally claiming stock and promo usage.
    async fn create_order(&self, order: NewOrder, now: Timestamp)
    -> Result<OrderRecord, OrdersError>;

    /// As [`OrdersService::create_order`], with an additional manual
    /// discount folded in before tax.
    async fn create_admin_order(
        &self,
        order: NewAdminOrder,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersError>;

    /// Move an order through the status machine. Cancellation restores
    /// stock; no transition recomputes the frozen totals.
    async fn transition_status(
        &self,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersError>;
}
