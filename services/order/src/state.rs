use sea_orm::DatabaseConnection;

use shop_core::cache::{CacheKeys, EntityCache, RedisCache};

use crate::infra::db::{DbOrderItemRepository, DbOrderRepository};
use crate::infra::grpc::{GrpcProductClient, GrpcUserClient};
use crate::usecase::order::{OrderCommandUseCase, OrderQueryUseCase};
use crate::usecase::order_item::{OrderItemCommandUseCase, OrderItemQueryUseCase};

pub const ORDER_KEYS: CacheKeys = CacheKeys::new("orders");
pub const ORDER_ITEM_KEYS: CacheKeys = CacheKeys::new("order_items");

pub type OrderCommands = OrderCommandUseCase<
    DbOrderRepository,
    DbOrderItemRepository,
    GrpcUserClient,
    GrpcProductClient,
    RedisCache,
>;

/// Shared application state passed to every gRPC handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: RedisCache,
    pub users: GrpcUserClient,
    pub products: GrpcProductClient,
}

impl AppState {
    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn item_repo(&self) -> DbOrderItemRepository {
        DbOrderItemRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_cache(&self) -> EntityCache<RedisCache> {
        EntityCache::new(self.cache.clone(), ORDER_KEYS)
    }

    pub fn item_cache(&self) -> EntityCache<RedisCache> {
        EntityCache::new(self.cache.clone(), ORDER_ITEM_KEYS)
    }

    pub fn queries(&self) -> OrderQueryUseCase<DbOrderRepository, RedisCache> {
        OrderQueryUseCase {
            repo: self.order_repo(),
            cache: self.order_cache(),
        }
    }

    pub fn commands(&self) -> OrderCommands {
        OrderCommandUseCase {
            orders: self.order_repo(),
            items: self.item_repo(),
            users: self.users.clone(),
            products: self.products.clone(),
            cache: self.order_cache(),
            item_cache: self.item_cache(),
        }
    }

    pub fn item_queries(&self) -> OrderItemQueryUseCase<DbOrderItemRepository, RedisCache> {
        OrderItemQueryUseCase {
            repo: self.item_repo(),
            cache: self.item_cache(),
        }
    }

    pub fn item_commands(&self) -> OrderItemCommandUseCase<DbOrderItemRepository, RedisCache> {
        OrderItemCommandUseCase {
            repo: self.item_repo(),
            cache: self.item_cache(),
        }
    }
}
