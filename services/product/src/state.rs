use sea_orm::DatabaseConnection;

use shop_core::cache::{CacheKeys, EntityCache, RedisCache};

use crate::infra::db::DbProductRepository;
use crate::usecase::product::{ProductCommandUseCase, ProductQueryUseCase};

pub const PRODUCT_KEYS: CacheKeys = CacheKeys::new("products");

/// Shared application state passed to every gRPC handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: RedisCache,
}

impl AppState {
    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_cache(&self) -> EntityCache<RedisCache> {
        EntityCache::new(self.cache.clone(), PRODUCT_KEYS)
    }

    pub fn queries(&self) -> ProductQueryUseCase<DbProductRepository, RedisCache> {
        ProductQueryUseCase {
            repo: self.product_repo(),
            cache: self.product_cache(),
        }
    }

    pub fn commands(&self) -> ProductCommandUseCase<DbProductRepository, RedisCache> {
        ProductCommandUseCase {
            repo: self.product_repo(),
            cache: self.product_cache(),
        }
    }
}
