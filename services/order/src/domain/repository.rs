#![allow(async_fn_in_trait)]

use shop_core::context::RequestContext;
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::user::User;
use shop_domain::view::ListView;

use crate::domain::types::NewOrderItem;
use crate::error::OrderServiceError;

/// Repository for order headers.
///
/// Single-row transitions return `None` when no row is in the source state.
pub trait OrderRepository: Send + Sync {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderServiceError>;

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError>;

    /// Inserts an empty header with a zero total.
    async fn create(&self, ctx: &RequestContext, user_id: i32)
    -> Result<Order, OrderServiceError>;

    /// Writes the owner and rolled-up total of an active order.
    async fn finalize(
        &self,
        ctx: &RequestContext,
        id: i32,
        user_id: i32,
        total_price: i64,
    ) -> Result<Option<Order>, OrderServiceError>;

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError>;

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError>;

    /// Also removes the order's items.
    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError>;

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError>;

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError>;
}

/// Repository for order lines.
pub trait OrderItemRepository: Send + Sync {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<OrderItem>, OrderServiceError>;

    /// Active items of one order, oldest first.
    async fn find_by_order(
        &self,
        ctx: &RequestContext,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, OrderServiceError>;

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError>;

    async fn create(
        &self,
        ctx: &RequestContext,
        item: &NewOrderItem,
    ) -> Result<OrderItem, OrderServiceError>;

    /// Rewrites an active line in place.
    async fn update_line(
        &self,
        ctx: &RequestContext,
        id: i32,
        product_id: i32,
        quantity: i32,
        price: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError>;

    /// `Σ quantity × price` over the order's active items.
    async fn sum_total(&self, ctx: &RequestContext, order_id: i32)
    -> Result<i64, OrderServiceError>;

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError>;

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError>;

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError>;

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError>;

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, OrderServiceError>;
}

/// User existence check against the user service.
pub trait UserClient: Send + Sync {
    /// `UserNotFound` when the service reports no such user.
    async fn find_by_id(&self, ctx: &RequestContext, id: i32) -> Result<User, OrderServiceError>;
}

/// The product service operations the order saga drives.
pub trait ProductClient: Send + Sync {
    /// `ProductNotFound` when the service reports no such product.
    async fn find_by_id(&self, ctx: &RequestContext, id: i32)
    -> Result<Product, OrderServiceError>;

    /// Absolute stock set.
    async fn update_stock(
        &self,
        ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Product, OrderServiceError>;
}
