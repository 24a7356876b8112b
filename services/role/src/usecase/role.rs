use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::role::Role;
use shop_domain::view::ListView;

use crate::domain::repository::RoleRepository;
use crate::domain::types::validate_role_name;
use crate::error::RoleServiceError;

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct RoleQueryUseCase<R: RoleRepository, C: CacheStore> {
    pub repo: R,
    pub cache: EntityCache<C>,
}

impl<R: RoleRepository, C: CacheStore> RoleQueryUseCase<R, C> {
    pub async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: PageRequest,
    ) -> Result<Page<Role>, RoleServiceError> {
        let page = page.normalized();
        let method = match view {
            ListView::All => "FindAllRoles",
            ListView::Active => "FindActiveRoles",
            ListView::Trashed => "FindTrashedRoles",
        };
        let mut op = Operation::start(ctx, method);
        let key = self.cache.keys().list(view, &page);
        if let Some(hit) = self.cache.get::<Page<Role>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let result = match self.repo.find_page(ctx, view, &page).await {
            Ok(result) => result,
            Err(e) => return op.fail(e, "find_roles", RoleServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &result).await;
        Ok(result)
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: i32) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "FindRoleById");
        let key = self.cache.keys().id(id);
        if let Some(hit) = self.cache.get::<Role>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let role = match self.repo.find_by_id(ctx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "find_role"),
            Err(e) => return op.fail(e, "find_role", RoleServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &role).await;
        Ok(role)
    }

    pub async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "FindRoleByName");
        let key = self.cache.keys().name(name);
        if let Some(hit) = self.cache.get::<Role>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let role = match self.repo.find_by_name(ctx, name).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "find_role_by_name"),
            Err(e) => return op.fail(e, "find_role_by_name", RoleServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &role).await;
        Ok(role)
    }

    pub async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Vec<Role>, RoleServiceError> {
        let mut op = Operation::start(ctx, "FindRolesByUserId");
        let key = self.cache.keys().by_parent("user", user_id);
        if let Some(hit) = self.cache.get::<Vec<Role>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let roles = match self.repo.find_by_user_id(ctx, user_id).await {
            Ok(roles) => roles,
            Err(e) => return op.fail(e, "find_roles_by_user", RoleServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &roles).await;
        Ok(roles)
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub struct RoleCommandUseCase<R: RoleRepository, C: CacheStore> {
    pub repo: R,
    pub cache: EntityCache<C>,
}

impl<R: RoleRepository, C: CacheStore> RoleCommandUseCase<R, C> {
    /// Role state changes alter every user's role list.
    async fn invalidate(&self, ctx: &RequestContext, write: CacheWrite, name: Option<&str>) {
        if let Some(name) = name {
            self.cache.forget(ctx, &self.cache.keys().name(name)).await;
        }
        self.cache
            .forget_pattern(ctx, &self.cache.keys().parent_pattern("user"))
            .await;
        self.cache.invalidate(ctx, write).await;
    }

    pub async fn create(&self, ctx: &RequestContext, name: &str) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "CreateRole");
        let name = name.trim();
        if let Err(e) = validate_role_name(name) {
            return op.reject(e, "create_role");
        }
        match self.repo.find_by_name(ctx, name).await {
            Ok(None) => {}
            Ok(Some(_)) => return op.reject(RoleServiceError::NameTaken, "create_role"),
            Err(e) => return op.fail(e, "create_role", RoleServiceError::CreateFailed),
        }

        let role = match self.repo.create(ctx, name).await {
            Ok(role) => role,
            Err(e) => return op.fail(e, "create_role", RoleServiceError::CreateFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Create).await;
        Ok(role)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i32,
        name: &str,
    ) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "UpdateRole");
        let name = name.trim();
        if let Err(e) = validate_role_name(name) {
            return op.reject(e, "update_role");
        }
        let existing = match self.repo.find_by_id(ctx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "update_role"),
            Err(e) => return op.fail(e, "update_role", RoleServiceError::UpdateFailed),
        };
        if existing.name != name {
            match self.repo.find_by_name(ctx, name).await {
                Ok(Some(other)) if other.id != id => {
                    return op.reject(RoleServiceError::NameTaken, "update_role");
                }
                Ok(_) => {}
                Err(e) => return op.fail(e, "update_role", RoleServiceError::UpdateFailed),
            }
        }

        let role = match self.repo.update(ctx, id, name).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "update_role"),
            Err(e) => return op.fail(e, "update_role", RoleServiceError::UpdateFailed),
        };
        self.invalidate(ctx, CacheWrite::Update(id), Some(&existing.name))
            .await;
        Ok(role)
    }

    pub async fn trash(&self, ctx: &RequestContext, id: i32) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "TrashRole");
        let role = match self.repo.trash(ctx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "trash_role"),
            Err(e) => return op.fail(e, "trash_role", RoleServiceError::TrashFailed),
        };
        self.invalidate(ctx, CacheWrite::Trash(id), Some(&role.name))
            .await;
        Ok(role)
    }

    pub async fn restore(&self, ctx: &RequestContext, id: i32) -> Result<Role, RoleServiceError> {
        let mut op = Operation::start(ctx, "RestoreRole");
        let role = match self.repo.restore(ctx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "restore_role"),
            Err(e) => return op.fail(e, "restore_role", RoleServiceError::RestoreFailed),
        };
        self.invalidate(ctx, CacheWrite::Restore(id), None).await;
        Ok(role)
    }

    pub async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<(), RoleServiceError> {
        let mut op = Operation::start(ctx, "DeleteRolePermanent");
        let role = match self.repo.delete_permanent(ctx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => return op.reject(RoleServiceError::RoleNotFound, "delete_role"),
            Err(e) => return op.fail(e, "delete_role", RoleServiceError::DeleteFailed),
        };
        self.invalidate(ctx, CacheWrite::DeletePermanent(id), Some(&role.name))
            .await;
        Ok(())
    }

    pub async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        let mut op = Operation::start(ctx, "RestoreAllRoles");
        let affected = match self.repo.restore_all(ctx).await {
            Ok(affected) => affected,
            Err(e) => return op.fail(e, "restore_all_roles", RoleServiceError::RestoreAllFailed),
        };
        self.invalidate(ctx, CacheWrite::RestoreAll, None).await;
        Ok(affected)
    }

    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        let mut op = Operation::start(ctx, "DeleteAllRoles");
        let affected = match self.repo.delete_all_permanent(ctx).await {
            Ok(affected) => affected,
            Err(e) => return op.fail(e, "delete_all_roles", RoleServiceError::DeleteAllFailed),
        };
        self.invalidate(ctx, CacheWrite::DeleteAll, None).await;
        Ok(affected)
    }
}
