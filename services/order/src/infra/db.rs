use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, SqlErr, sea_query::Expr,
};

use shop_core::context::RequestContext;
use shop_core::sea_ext::{SoftDelete, SoftDeleteScope, fetch_page};
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::view::ListView;
use shop_order_schema::{order_items, orders};

use crate::domain::repository::{OrderItemRepository, OrderRepository};
use crate::domain::types::NewOrderItem;
use crate::error::OrderServiceError;

const ORDER_LIFECYCLE: SoftDelete<orders::Column> = SoftDelete {
    id: orders::Column::Id,
    updated_at: orders::Column::UpdatedAt,
    deleted_at: orders::Column::DeletedAt,
};

const ITEM_LIFECYCLE: SoftDelete<order_items::Column> = SoftDelete {
    id: order_items::Column::Id,
    updated_at: order_items::Column::UpdatedAt,
    deleted_at: order_items::Column::DeletedAt,
};

/// Listing searches are foreign-key ids. Text that is not a number matches no
/// row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdSearch {
    Unfiltered,
    Id(i32),
    NoMatch,
}

fn id_search(page: &PageRequest) -> IdSearch {
    if !page.has_search() {
        return IdSearch::Unfiltered;
    }
    match page.search.trim().parse() {
        Ok(id) => IdSearch::Id(id),
        Err(_) => IdSearch::NoMatch,
    }
}

fn filter_by_search<E, C>(select: Select<E>, page: &PageRequest, column: C) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match id_search(page) {
        IdSearch::Unfiltered => select,
        IdSearch::Id(id) => select.filter(column.eq(id)),
        IdSearch::NoMatch => select.filter(Expr::value(false)),
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderServiceError> {
        let select = filter_by_search(
            orders::Entity::find().in_view(view, orders::Column::DeletedAt),
            page,
            orders::Column::UserId,
        );
        let rows = ctx
            .guard(fetch_page(select, &self.db, orders::Column::Id, page))
            .await?
            .with_context(|| format!("find {} orders page", view.as_str()))?;
        Ok(rows.map(order_from_model))
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        let model = ctx
            .guard(orders::Entity::find_by_id(id).one(&self.db))
            .await?
            .context("find order by id")?;
        Ok(model.map(order_from_model))
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Order, OrderServiceError> {
        let now = Utc::now();
        let insert = orders::ActiveModel {
            user_id: Set(user_id),
            total_price: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx.guard(insert).await?.context("create order")?;
        Ok(order_from_model(model))
    }

    async fn finalize(
        &self,
        ctx: &RequestContext,
        id: i32,
        user_id: i32,
        total_price: i64,
    ) -> Result<Option<Order>, OrderServiceError> {
        let update = orders::Entity::update_many()
            .col_expr(orders::Column::UserId, Expr::value(user_id))
            .col_expr(orders::Column::TotalPrice, Expr::value(total_price))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx.guard(update).await?.context("finalize order")?;
        Ok(rows.pop().map(order_from_model))
    }

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        let model = ctx
            .guard(ORDER_LIFECYCLE.trash::<orders::Entity, _>(&self.db, id))
            .await?
            .context("trash order")?;
        Ok(model.map(order_from_model))
    }

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        let model = ctx
            .guard(ORDER_LIFECYCLE.restore::<orders::Entity, _>(&self.db, id))
            .await?
            .context("restore order")?;
        Ok(model.map(order_from_model))
    }

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError> {
        // order_items rows go with it through ON DELETE CASCADE.
        let deleted = ctx
            .guard(ORDER_LIFECYCLE.delete_permanent::<orders::Entity, _>(&self.db, id))
            .await?
            .context("delete order permanently")?;
        Ok(deleted.is_some())
    }

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let affected = ctx
            .guard(ORDER_LIFECYCLE.restore_all::<orders::Entity, _>(&self.db))
            .await?
            .context("restore all orders")?;
        Ok(affected)
    }

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let affected = ctx
            .guard(ORDER_LIFECYCLE.delete_all_trashed::<orders::Entity, _>(&self.db))
            .await?
            .context("delete all trashed orders")?;
        Ok(affected)
    }
}

// ── Order item repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderItemRepository {
    pub db: DatabaseConnection,
}

impl OrderItemRepository for DbOrderItemRepository {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<OrderItem>, OrderServiceError> {
        let select = filter_by_search(
            order_items::Entity::find().in_view(view, order_items::Column::DeletedAt),
            page,
            order_items::Column::ProductId,
        );
        let rows = ctx
            .guard(fetch_page(select, &self.db, order_items::Column::Id, page))
            .await?
            .with_context(|| format!("find {} order items page", view.as_str()))?;
        Ok(rows.map(item_from_model))
    }

    async fn find_by_order(
        &self,
        ctx: &RequestContext,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, OrderServiceError> {
        let models = ctx
            .guard(
                order_items::Entity::find()
                    .filter(order_items::Column::OrderId.eq(order_id))
                    .filter(order_items::Column::DeletedAt.is_null())
                    .order_by_asc(order_items::Column::Id)
                    .all(&self.db),
            )
            .await?
            .context("find order items by order")?;
        Ok(models.into_iter().map(item_from_model).collect())
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        let model = ctx
            .guard(order_items::Entity::find_by_id(id).one(&self.db))
            .await?
            .context("find order item by id")?;
        Ok(model.map(item_from_model))
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        item: &NewOrderItem,
    ) -> Result<OrderItem, OrderServiceError> {
        let now = Utc::now();
        let insert = order_items::ActiveModel {
            order_id: Set(item.order_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price: Set(item.price),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx
            .guard(insert)
            .await?
            .map_err(|e| item_write_error(e, "create order item"))?;
        Ok(item_from_model(model))
    }

    async fn update_line(
        &self,
        ctx: &RequestContext,
        id: i32,
        product_id: i32,
        quantity: i32,
        price: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        let update = order_items::Entity::update_many()
            .col_expr(order_items::Column::ProductId, Expr::value(product_id))
            .col_expr(order_items::Column::Quantity, Expr::value(quantity))
            .col_expr(order_items::Column::Price, Expr::value(price))
            .col_expr(order_items::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order_items::Column::Id.eq(id))
            .filter(order_items::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx.guard(update).await?.context("update order item")?;
        Ok(rows.pop().map(item_from_model))
    }

    async fn sum_total(
        &self,
        ctx: &RequestContext,
        order_id: i32,
    ) -> Result<i64, OrderServiceError> {
        // SUM over BIGINT yields NUMERIC in Postgres; cast back for i64 decoding.
        let total = ctx
            .guard(
                order_items::Entity::find()
                    .select_only()
                    .column_as(
                        Expr::cust(
                            "CAST(COALESCE(SUM(CAST(quantity AS BIGINT) * price), 0) AS BIGINT)",
                        ),
                        "total",
                    )
                    .filter(order_items::Column::OrderId.eq(order_id))
                    .filter(order_items::Column::DeletedAt.is_null())
                    .into_tuple::<i64>()
                    .one(&self.db),
            )
            .await?
            .context("sum order total")?;
        Ok(total.unwrap_or(0))
    }

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        let model = ctx
            .guard(ITEM_LIFECYCLE.trash::<order_items::Entity, _>(&self.db, id))
            .await?
            .context("trash order item")?;
        Ok(model.map(item_from_model))
    }

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        let model = ctx
            .guard(ITEM_LIFECYCLE.restore::<order_items::Entity, _>(&self.db, id))
            .await?
            .context("restore order item")?;
        Ok(model.map(item_from_model))
    }

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError> {
        let deleted = ctx
            .guard(ITEM_LIFECYCLE.delete_permanent::<order_items::Entity, _>(&self.db, id))
            .await?
            .context("delete order item permanently")?;
        Ok(deleted.is_some())
    }

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let affected = ctx
            .guard(ITEM_LIFECYCLE.restore_all::<order_items::Entity, _>(&self.db))
            .await?
            .context("restore all order items")?;
        Ok(affected)
    }

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let affected = ctx
            .guard(ITEM_LIFECYCLE.delete_all_trashed::<order_items::Entity, _>(&self.db))
            .await?
            .context("delete all trashed order items")?;
        Ok(affected)
    }
}

fn item_write_error(err: DbErr, action: &'static str) -> OrderServiceError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => OrderServiceError::OrderNotFound,
        _ => anyhow::Error::new(err).context(action).into(),
    }
}

fn order_from_model(model: orders::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_price: model.total_price,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

fn item_from_model(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}
