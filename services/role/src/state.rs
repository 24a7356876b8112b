use sea_orm::DatabaseConnection;

use shop_core::cache::{CacheKeys, EntityCache, RedisCache};

use crate::infra::db::{DbRoleRepository, DbUserRoleRepository};
use crate::usecase::role::{RoleCommandUseCase, RoleQueryUseCase};
use crate::usecase::user_role::UserRoleUseCase;

pub const ROLE_KEYS: CacheKeys = CacheKeys::new("roles");

/// Shared application state passed to every gRPC handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: RedisCache,
}

impl AppState {
    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_role_repo(&self) -> DbUserRoleRepository {
        DbUserRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_cache(&self) -> EntityCache<RedisCache> {
        EntityCache::new(self.cache.clone(), ROLE_KEYS)
    }

    pub fn queries(&self) -> RoleQueryUseCase<DbRoleRepository, RedisCache> {
        RoleQueryUseCase {
            repo: self.role_repo(),
            cache: self.role_cache(),
        }
    }

    pub fn commands(&self) -> RoleCommandUseCase<DbRoleRepository, RedisCache> {
        RoleCommandUseCase {
            repo: self.role_repo(),
            cache: self.role_cache(),
        }
    }

    pub fn user_roles(
        &self,
    ) -> UserRoleUseCase<DbRoleRepository, DbUserRoleRepository, RedisCache> {
        UserRoleUseCase {
            roles: self.role_repo(),
            user_roles: self.user_role_repo(),
            cache: self.role_cache(),
        }
    }
}
