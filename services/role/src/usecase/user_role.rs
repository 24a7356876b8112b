use shop_core::cache::{CacheStore, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::role::UserRole;

use crate::domain::repository::{RoleRepository, UserRoleRepository};
use crate::domain::types::validate_assignment;
use crate::error::RoleServiceError;

/// Assign, re-point and remove user roles. The target role must be active.
pub struct UserRoleUseCase<R: RoleRepository, U: UserRoleRepository, C: CacheStore> {
    pub roles: R,
    pub user_roles: U,
    pub cache: EntityCache<C>,
}

impl<R, U, C> UserRoleUseCase<R, U, C>
where
    R: RoleRepository,
    U: UserRoleRepository,
    C: CacheStore,
{
    async fn ensure_active_role(
        &self,
        ctx: &RequestContext,
        role_id: i32,
    ) -> Result<(), RoleServiceError> {
        match self.roles.find_by_id(ctx, role_id).await? {
            Some(role) if role.deleted_at.is_none() => Ok(()),
            _ => Err(RoleServiceError::RoleNotFound),
        }
    }

    async fn forget_user(&self, ctx: &RequestContext, user_id: i32) {
        self.cache
            .forget(ctx, &self.cache.keys().by_parent("user", user_id))
            .await;
    }

    pub async fn assign(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<UserRole, RoleServiceError> {
        let mut op = Operation::start(ctx, "AssignRole");
        if let Err(e) = validate_assignment(user_id, role_id) {
            return op.reject(e, "assign_role");
        }
        if let Err(e) = self.ensure_active_role(ctx, role_id).await {
            return op.fail(e, "assign_role", RoleServiceError::AssignFailed);
        }

        let assignment = match self.user_roles.assign(ctx, user_id, role_id).await {
            Ok(assignment) => assignment,
            Err(e) => {
                return op.fail_with(
                    e,
                    "assign_role",
                    RoleServiceError::AssignFailed,
                    &[("user_id", &user_id), ("role_id", &role_id)],
                );
            }
        };
        self.forget_user(ctx, user_id).await;
        Ok(assignment)
    }

    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<UserRole, RoleServiceError> {
        let mut op = Operation::start(ctx, "UpdateUserRole");
        if let Err(e) = validate_assignment(user_id, role_id) {
            return op.reject(e, "update_user_role");
        }
        if let Err(e) = self.ensure_active_role(ctx, role_id).await {
            return op.fail(e, "update_user_role", RoleServiceError::UpdateUserRoleFailed);
        }

        let assignment = match self.user_roles.update_role(ctx, user_id, role_id).await {
            Ok(Some(assignment)) => assignment,
            Ok(None) => {
                return op.reject(RoleServiceError::UserRoleNotFound, "update_user_role");
            }
            Err(e) => {
                return op.fail(e, "update_user_role", RoleServiceError::UpdateUserRoleFailed);
            }
        };
        self.forget_user(ctx, user_id).await;
        Ok(assignment)
    }

    pub async fn remove(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<(), RoleServiceError> {
        let mut op = Operation::start(ctx, "RemoveRole");
        if let Err(e) = validate_assignment(user_id, role_id) {
            return op.reject(e, "remove_role");
        }

        match self.user_roles.remove(ctx, user_id, role_id).await {
            Ok(true) => {}
            Ok(false) => return op.reject(RoleServiceError::UserRoleNotFound, "remove_role"),
            Err(e) => return op.fail(e, "remove_role", RoleServiceError::RemoveFailed),
        }
        self.forget_user(ctx, user_id).await;
        Ok(())
    }
}
