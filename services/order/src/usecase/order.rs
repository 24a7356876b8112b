use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::view::ListView;

use crate::domain::repository::{OrderItemRepository, OrderRepository, ProductClient, UserClient};
use crate::domain::types::{CreateOrder, NewOrderItem, OrderLine, UpdateLine, UpdateOrder};
use crate::error::OrderServiceError;

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct OrderQueryUseCase<O: OrderRepository, C: CacheStore> {
    pub repo: O,
    pub cache: EntityCache<C>,
}

impl<O: OrderRepository, C: CacheStore> OrderQueryUseCase<O, C> {
    pub async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderServiceError> {
        let page = page.normalized();
        let method = match view {
            ListView::All => "FindAllOrders",
            ListView::Active => "FindActiveOrders",
            ListView::Trashed => "FindTrashedOrders",
        };
        let mut op = Operation::start(ctx, method);
        let key = self.cache.keys().list(view, &page);
        if let Some(hit) = self.cache.get::<Page<Order>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let result = match self.repo.find_page(ctx, view, &page).await {
            Ok(result) => result,
            Err(e) => return op.fail(e, "find_orders", OrderServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &result).await;
        Ok(result)
    }

    pub async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Order, OrderServiceError> {
        let mut op = Operation::start(ctx, "FindOrderById");
        let key = self.cache.keys().id(id);
        if let Some(hit) = self.cache.get::<Order>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let order = match self.repo.find_by_id(ctx, id).await {
            Ok(Some(order)) => order,
            Ok(None) => return op.reject(OrderServiceError::OrderNotFound, "find_order"),
            Err(e) => return op.fail(e, "find_order", OrderServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &order).await;
        Ok(order)
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Order writes, including the create/update saga across the user and
/// product services.
///
/// The saga runs each line to completion before starting the next and never
/// compensates: a failure leaves the lines written so far, and the stock
/// decrements that succeeded, in place. `order-reconciler` re-rolls totals
/// of orders left unfinalized.
pub struct OrderCommandUseCase<O, I, U, P, C>
where
    O: OrderRepository,
    I: OrderItemRepository,
    U: UserClient,
    P: ProductClient,
    C: CacheStore,
{
    pub orders: O,
    pub items: I,
    pub users: U,
    pub products: P,
    pub cache: EntityCache<C>,
    pub item_cache: EntityCache<C>,
}

impl<O, I, U, P, C> OrderCommandUseCase<O, I, U, P, C>
where
    O: OrderRepository,
    I: OrderItemRepository,
    U: UserClient,
    P: ProductClient,
    C: CacheStore,
{
    async fn ensure_user(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        user_id: i32,
        prefix: &str,
        canonical: OrderServiceError,
    ) -> Result<(), OrderServiceError> {
        match self.users.find_by_id(ctx, user_id).await {
            Ok(user) if user.deleted_at.is_none() => Ok(()),
            Ok(_) => op.reject(OrderServiceError::UserNotFound, prefix),
            Err(e) => op.fail_with(e, prefix, canonical, &[("user_id", &user_id)]),
        }
    }

    /// Active product with enough stock for `line`.
    async fn available_product(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        line: OrderLine,
    ) -> Result<Product, OrderServiceError> {
        let product = match self.products.find_by_id(ctx, line.product_id).await {
            Ok(product) if product.deleted_at.is_none() => product,
            Ok(_) => return op.reject(OrderServiceError::ProductNotFound, "find_product"),
            Err(e) => {
                return op.fail_with(
                    e,
                    "find_product",
                    OrderServiceError::UpstreamUnavailable("product"),
                    &[("product_id", &line.product_id)],
                );
            }
        };
        if !product.has_stock_for(line.quantity) {
            let err = OrderServiceError::InsufficientStock {
                name: product.name.clone(),
                requested: line.quantity,
                available: product.stock,
            };
            tracing::warn!(
                product_id = product.id,
                requested = line.quantity,
                available = product.stock,
                "insufficient stock"
            );
            return op.reject(err, "check_stock");
        }
        Ok(product)
    }

    async fn decrement_stock(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        product: &Product,
        quantity: i32,
    ) -> Result<(), OrderServiceError> {
        let remaining = product.stock - quantity;
        match self.products.update_stock(ctx, product.id, remaining).await {
            Ok(_) => Ok(()),
            Err(OrderServiceError::Cancelled) => {
                op.reject(OrderServiceError::Cancelled, "update_stock")
            }
            Err(e) => {
                tracing::warn!(
                    product_id = product.id,
                    stock = remaining,
                    error = %e,
                    "stock update failed, order item kept"
                );
                op.reject(OrderServiceError::StockUpdateFailed, "update_stock")
            }
        }
    }

    /// One new line: stock check, insert at the product's current price,
    /// then decrement stock.
    async fn place_line(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        order_id: i32,
        line: OrderLine,
    ) -> Result<OrderItem, OrderServiceError> {
        let product = self.available_product(ctx, op, line).await?;
        let new_item = NewOrderItem {
            order_id,
            product_id: product.id,
            quantity: line.quantity,
            price: product.price,
        };
        let item = match self.items.create(ctx, &new_item).await {
            Ok(item) => item,
            Err(e) => {
                return op.fail_with(
                    e,
                    "create_order_item",
                    OrderServiceError::CreateItemFailed,
                    &[("order_id", &order_id), ("product_id", &product.id)],
                );
            }
        };
        self.decrement_stock(ctx, op, &product, line.quantity).await?;
        Ok(item)
    }

    /// Existing line rewritten at the current price. Stock is not adjusted.
    async fn rewrite_line(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        order_id: i32,
        line: UpdateLine,
    ) -> Result<OrderItem, OrderServiceError> {
        match self.items.find_by_id(ctx, line.order_item_id).await {
            Ok(Some(item)) if item.order_id == order_id && item.deleted_at.is_none() => {}
            Ok(_) => return op.reject(OrderServiceError::OrderItemNotFound, "update_order_item"),
            Err(e) => return op.fail(e, "update_order_item", OrderServiceError::UpdateFailed),
        }
        let product = match self.products.find_by_id(ctx, line.product_id).await {
            Ok(product) if product.deleted_at.is_none() => product,
            Ok(_) => return op.reject(OrderServiceError::ProductNotFound, "find_product"),
            Err(e) => {
                return op.fail(
                    e,
                    "find_product",
                    OrderServiceError::UpstreamUnavailable("product"),
                );
            }
        };
        match self
            .items
            .update_line(ctx, line.order_item_id, product.id, line.quantity, product.price)
            .await
        {
            Ok(Some(item)) => Ok(item),
            Ok(None) => op.reject(OrderServiceError::OrderItemNotFound, "update_order_item"),
            Err(e) => op.fail(e, "update_order_item", OrderServiceError::UpdateFailed),
        }
    }

    /// Roll the total up from the stored active lines and write it.
    async fn finalize(
        &self,
        ctx: &RequestContext,
        op: &mut Operation,
        order_id: i32,
        user_id: i32,
    ) -> Result<Order, OrderServiceError> {
        let total = match self.items.sum_total(ctx, order_id).await {
            Ok(total) => total,
            Err(e) => {
                return op.fail_with(
                    e,
                    "finalize_order",
                    OrderServiceError::FinalizeFailed,
                    &[("order_id", &order_id)],
                );
            }
        };
        match self.orders.finalize(ctx, order_id, user_id, total).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => op.reject(OrderServiceError::OrderNotFound, "finalize_order"),
            Err(e) => op.fail_with(
                e,
                "finalize_order",
                OrderServiceError::FinalizeFailed,
                &[("order_id", &order_id), ("total_price", &total)],
            ),
        }
    }

    async fn invalidate_items(&self, ctx: &RequestContext, order_id: i32, write: CacheWrite) {
        self.item_cache
            .forget(ctx, &self.item_cache.keys().by_parent("order", order_id))
            .await;
        self.item_cache.invalidate(ctx, write).await;
    }

    /// Writes that may remove items of many orders.
    async fn invalidate_all_items(&self, ctx: &RequestContext, write: CacheWrite) {
        self.item_cache
            .forget_pattern(ctx, &self.item_cache.keys().parent_pattern("order"))
            .await;
        self.item_cache.invalidate(ctx, write).await;
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateOrder,
    ) -> Result<Order, OrderServiceError> {
        let mut op = Operation::start(ctx, "CreateOrder");
        if let Err(e) = input.validate() {
            return op.reject(e, "create_order");
        }
        self.ensure_user(
            ctx,
            &mut op,
            input.user_id,
            "create_order",
            OrderServiceError::CreateFailed,
        )
        .await?;

        let shell = match self.orders.create(ctx, input.user_id).await {
            Ok(order) => order,
            Err(e) => return op.fail(e, "create_order", OrderServiceError::CreateFailed),
        };
        tracing::debug!(order_id = shell.id, lines = input.items.len(), "order shell created");

        for line in &input.items {
            if let Err(e) = self.place_line(ctx, &mut op, shell.id, *line).await {
                // Lines already placed stay; the item views must see them.
                self.invalidate_items(ctx, shell.id, CacheWrite::Create).await;
                self.cache.invalidate(ctx, CacheWrite::Create).await;
                return Err(e);
            }
        }

        let order = self.finalize(ctx, &mut op, shell.id, input.user_id).await;
        self.invalidate_items(ctx, shell.id, CacheWrite::Create).await;
        self.cache.invalidate(ctx, CacheWrite::Create).await;
        order
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        input: UpdateOrder,
    ) -> Result<Order, OrderServiceError> {
        let mut op = Operation::start(ctx, "UpdateOrder");
        if let Err(e) = input.validate() {
            return op.reject(e, "update_order");
        }
        self.ensure_user(
            ctx,
            &mut op,
            input.user_id,
            "update_order",
            OrderServiceError::UpdateFailed,
        )
        .await?;
        match self.orders.find_by_id(ctx, input.order_id).await {
            Ok(Some(order)) if order.deleted_at.is_none() => {}
            Ok(_) => return op.reject(OrderServiceError::OrderNotFound, "update_order"),
            Err(e) => return op.fail(e, "update_order", OrderServiceError::UpdateFailed),
        }

        let mut outcome = Ok(());
        for line in &input.items {
            let step = if line.is_new() {
                self.place_line(ctx, &mut op, input.order_id, line.as_line())
                    .await
            } else {
                self.rewrite_line(ctx, &mut op, input.order_id, *line).await
            };
            if let Err(e) = step {
                outcome = Err(e);
                break;
            }
        }

        let result = match outcome {
            Ok(()) => {
                self.finalize(ctx, &mut op, input.order_id, input.user_id)
                    .await
            }
            Err(e) => Err(e),
        };
        self.invalidate_items(ctx, input.order_id, CacheWrite::Create)
            .await;
        self.cache
            .invalidate(ctx, CacheWrite::Update(input.order_id))
            .await;
        result
    }

    pub async fn trash(&self, ctx: &RequestContext, id: i32) -> Result<Order, OrderServiceError> {
        let mut op = Operation::start(ctx, "TrashOrder");
        let order = match self.orders.trash(ctx, id).await {
            Ok(Some(order)) => order,
            Ok(None) => return op.reject(OrderServiceError::OrderNotFound, "trash_order"),
            Err(e) => return op.fail(e, "trash_order", OrderServiceError::TrashFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Trash(id)).await;
        Ok(order)
    }

    pub async fn restore(&self, ctx: &RequestContext, id: i32) -> Result<Order, OrderServiceError> {
        let mut op = Operation::start(ctx, "RestoreOrder");
        let order = match self.orders.restore(ctx, id).await {
            Ok(Some(order)) => order,
            Ok(None) => return op.reject(OrderServiceError::OrderNotFound, "restore_order"),
            Err(e) => return op.fail(e, "restore_order", OrderServiceError::RestoreFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Restore(id)).await;
        Ok(order)
    }

    pub async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<(), OrderServiceError> {
        let mut op = Operation::start(ctx, "DeleteOrderPermanent");
        match self.orders.delete_permanent(ctx, id).await {
            Ok(true) => {}
            Ok(false) => return op.reject(OrderServiceError::OrderNotFound, "delete_order"),
            Err(e) => return op.fail(e, "delete_order", OrderServiceError::DeleteFailed),
        }
        self.cache
            .invalidate(ctx, CacheWrite::DeletePermanent(id))
            .await;
        self.invalidate_all_items(ctx, CacheWrite::DeleteAll).await;
        Ok(())
    }

    pub async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let mut op = Operation::start(ctx, "RestoreAllOrders");
        let affected = match self.orders.restore_all(ctx).await {
            Ok(affected) => affected,
            Err(e) => {
                return op.fail(e, "restore_all_orders", OrderServiceError::RestoreAllFailed);
            }
        };
        self.cache.invalidate(ctx, CacheWrite::RestoreAll).await;
        Ok(affected)
    }

    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let mut op = Operation::start(ctx, "DeleteAllOrders");
        let affected = match self.orders.delete_all_permanent(ctx).await {
            Ok(affected) => affected,
            Err(e) => return op.fail(e, "delete_all_orders", OrderServiceError::DeleteAllFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::DeleteAll).await;
        self.invalidate_all_items(ctx, CacheWrite::DeleteAll).await;
        Ok(affected)
    }
}
