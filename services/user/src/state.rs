use sea_orm::DatabaseConnection;

use shop_core::cache::{CacheKeys, EntityCache, RedisCache};

use crate::infra::db::DbUserRepository;
use crate::infra::grpc::GrpcRoleClient;
use crate::infra::password::Argon2Hasher;
use crate::usecase::user::{UserCommandUseCase, UserQueryUseCase};

pub const USER_KEYS: CacheKeys = CacheKeys::new("users");

/// Shared application state passed to every gRPC handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: RedisCache,
    pub roles: GrpcRoleClient,
    pub default_role: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_cache(&self) -> EntityCache<RedisCache> {
        EntityCache::new(self.cache.clone(), USER_KEYS)
    }

    pub fn queries(&self) -> UserQueryUseCase<DbUserRepository, RedisCache> {
        UserQueryUseCase {
            repo: self.user_repo(),
            cache: self.user_cache(),
        }
    }

    pub fn commands(
        &self,
    ) -> UserCommandUseCase<DbUserRepository, Argon2Hasher, GrpcRoleClient, RedisCache> {
        UserCommandUseCase {
            repo: self.user_repo(),
            hasher: Argon2Hasher,
            roles: self.roles.clone(),
            cache: self.user_cache(),
            default_role: self.default_role.clone(),
        }
    }
}
