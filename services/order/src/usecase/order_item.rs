use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::order::OrderItem;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::view::ListView;

use crate::domain::repository::OrderItemRepository;
use crate::error::OrderServiceError;

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct OrderItemQueryUseCase<I: OrderItemRepository, C: CacheStore> {
    pub repo: I,
    pub cache: EntityCache<C>,
}

impl<I: OrderItemRepository, C: CacheStore> OrderItemQueryUseCase<I, C> {
    pub async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: PageRequest,
    ) -> Result<Page<OrderItem>, OrderServiceError> {
        let page = page.normalized();
        let method = match view {
            ListView::All => "FindAllOrderItems",
            ListView::Active => "FindActiveOrderItems",
            ListView::Trashed => "FindTrashedOrderItems",
        };
        let mut op = Operation::start(ctx, method);
        let key = self.cache.keys().list(view, &page);
        if let Some(hit) = self.cache.get::<Page<OrderItem>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let result = match self.repo.find_page(ctx, view, &page).await {
            Ok(result) => result,
            Err(e) => return op.fail(e, "find_order_items", OrderServiceError::FindItemsFailed),
        };
        self.cache.set(ctx, &key, &result).await;
        Ok(result)
    }

    /// Active lines of one order. An unknown order yields an empty list.
    pub async fn find_by_order(
        &self,
        ctx: &RequestContext,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, OrderServiceError> {
        let mut op = Operation::start(ctx, "FindOrderItemByOrder");
        if order_id <= 0 {
            return op.reject(
                OrderServiceError::Validation("order id is required".into()),
                "find_order_items_by_order",
            );
        }
        let key = self.cache.keys().by_parent("order", order_id);
        if let Some(hit) = self.cache.get::<Vec<OrderItem>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let items = match self.repo.find_by_order(ctx, order_id).await {
            Ok(items) => items,
            Err(e) => {
                return op.fail(
                    e,
                    "find_order_items_by_order",
                    OrderServiceError::FindItemsFailed,
                );
            }
        };
        self.cache.set(ctx, &key, &items).await;
        Ok(items)
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Item lifecycle. Order totals are left as they were; re-finalizing is the
/// order update's job.
pub struct OrderItemCommandUseCase<I: OrderItemRepository, C: CacheStore> {
    pub repo: I,
    pub cache: EntityCache<C>,
}

impl<I: OrderItemRepository, C: CacheStore> OrderItemCommandUseCase<I, C> {
    async fn invalidate(&self, ctx: &RequestContext, write: CacheWrite, order_id: Option<i32>) {
        let keys = self.cache.keys();
        match order_id {
            Some(order_id) => self.cache.forget(ctx, &keys.by_parent("order", order_id)).await,
            None => self.cache.forget_pattern(ctx, &keys.parent_pattern("order")).await,
        }
        self.cache.invalidate(ctx, write).await;
    }

    pub async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<OrderItem, OrderServiceError> {
        let mut op = Operation::start(ctx, "TrashOrderItem");
        let item = match self.repo.trash(ctx, id).await {
            Ok(Some(item)) => item,
            Ok(None) => return op.reject(OrderServiceError::OrderItemNotFound, "trash_order_item"),
            Err(e) => return op.fail(e, "trash_order_item", OrderServiceError::TrashItemFailed),
        };
        self.invalidate(ctx, CacheWrite::Trash(id), Some(item.order_id))
            .await;
        Ok(item)
    }

    pub async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<OrderItem, OrderServiceError> {
        let mut op = Operation::start(ctx, "RestoreOrderItem");
        let item = match self.repo.restore(ctx, id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                return op.reject(OrderServiceError::OrderItemNotFound, "restore_order_item");
            }
            Err(e) => {
                return op.fail(e, "restore_order_item", OrderServiceError::RestoreItemFailed);
            }
        };
        self.invalidate(ctx, CacheWrite::Restore(id), Some(item.order_id))
            .await;
        Ok(item)
    }

    pub async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<(), OrderServiceError> {
        let mut op = Operation::start(ctx, "DeleteOrderItemPermanent");
        match self.repo.delete_permanent(ctx, id).await {
            Ok(true) => {}
            Ok(false) => {
                return op.reject(OrderServiceError::OrderItemNotFound, "delete_order_item");
            }
            Err(e) => return op.fail(e, "delete_order_item", OrderServiceError::DeleteItemFailed),
        }
        self.invalidate(ctx, CacheWrite::DeletePermanent(id), None)
            .await;
        Ok(())
    }

    pub async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let mut op = Operation::start(ctx, "RestoreAllOrderItems");
        let affected = match self.repo.restore_all(ctx).await {
            Ok(affected) => affected,
            Err(e) => {
                return op.fail(
                    e,
                    "restore_all_order_items",
                    OrderServiceError::RestoreAllItemsFailed,
                );
            }
        };
        self.invalidate(ctx, CacheWrite::RestoreAll, None).await;
        Ok(affected)
    }

    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        let mut op = Operation::start(ctx, "DeleteAllOrderItems");
        let affected = match self.repo.delete_all_permanent(ctx).await {
            Ok(affected) => affected,
            Err(e) => {
                return op.fail(
                    e,
                    "delete_all_order_items",
                    OrderServiceError::DeleteAllItemsFailed,
                );
            }
        };
        self.invalidate(ctx, CacheWrite::DeleteAll, None).await;
        Ok(affected)
    }
}
