//! Re-roll order totals left stale by interrupted create/update sagas.
//!
//! Walks the active orders page by page, recomputes each total from the
//! stored active lines and rewrites the ones that drifted. Every rewrite drops
//! the order's cached entry and listings so the order service stops serving
//! the stale total.

#![allow(async_fn_in_trait)]

use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_domain::order::Order;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::view::ListView;
use shop_order::domain::repository::{OrderItemRepository, OrderRepository};
use shop_order::infra::db::{DbOrderItemRepository, DbOrderRepository};

/// The reads and the single write a reconciliation pass needs.
pub trait TotalStore {
    async fn active_orders(&self, ctx: &RequestContext, page: &PageRequest)
    -> anyhow::Result<Page<Order>>;

    async fn line_total(&self, ctx: &RequestContext, order_id: i32) -> anyhow::Result<i64>;

    async fn write_total(&self, ctx: &RequestContext, order: &Order, total: i64)
    -> anyhow::Result<()>;
}

pub struct DbTotals {
    pub orders: DbOrderRepository,
    pub items: DbOrderItemRepository,
}

impl TotalStore for DbTotals {
    async fn active_orders(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> anyhow::Result<Page<Order>> {
        Ok(self.orders.find_page(ctx, ListView::Active, page).await?)
    }

    async fn line_total(&self, ctx: &RequestContext, order_id: i32) -> anyhow::Result<i64> {
        Ok(self.items.sum_total(ctx, order_id).await?)
    }

    async fn write_total(
        &self,
        ctx: &RequestContext,
        order: &Order,
        total: i64,
    ) -> anyhow::Result<()> {
        self.orders
            .finalize(ctx, order.id, order.user_id, total)
            .await?;
        Ok(())
    }
}

/// One order whose stored total disagreed with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub order_id: i32,
    pub stored: i64,
    pub computed: i64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub scanned: usize,
    pub drifted: Vec<Drift>,
    pub fixed: usize,
}

pub async fn reconcile<S: TotalStore, C: CacheStore>(
    store: &S,
    cache: &EntityCache<C>,
    ctx: &RequestContext,
    page_size: i32,
    dry_run: bool,
) -> anyhow::Result<Report> {
    let mut report = Report::default();
    let mut page = PageRequest::new(1, page_size, "");
    loop {
        let batch = store.active_orders(ctx, &page).await?;
        if batch.items.is_empty() {
            break;
        }
        for order in &batch.items {
            report.scanned += 1;
            let computed = store.line_total(ctx, order.id).await?;
            if computed == order.total_price {
                continue;
            }
            tracing::info!(
                order_id = order.id,
                stored = order.total_price,
                computed,
                dry_run,
                "order total drifted"
            );
            report.drifted.push(Drift {
                order_id: order.id,
                stored: order.total_price,
                computed,
            });
            if !dry_run {
                store.write_total(ctx, order, computed).await?;
                cache.invalidate(ctx, CacheWrite::Update(order.id)).await;
                report.fixed += 1;
            }
        }
        page.page += 1;
    }
    Ok(report)
}
