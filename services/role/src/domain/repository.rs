#![allow(async_fn_in_trait)]

use shop_core::context::RequestContext;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::role::{Role, UserRole};
use shop_domain::view::ListView;

use crate::error::RoleServiceError;

/// Repository for roles.
pub trait RoleRepository: Send + Sync {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Role>, RoleServiceError>;

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError>;

    /// Active rows only.
    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError>;

    /// Active roles assigned to the user, oldest first.
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Vec<Role>, RoleServiceError>;

    async fn create(&self, ctx: &RequestContext, name: &str) -> Result<Role, RoleServiceError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        id: i32,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError>;

    async fn trash(&self, ctx: &RequestContext, id: i32)
    -> Result<Option<Role>, RoleServiceError>;

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError>;

    /// The removed row, `None` when it did not exist.
    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError>;

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError>;

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError>;
}

/// Repository for user ↔ role assignments.
pub trait UserRoleRepository: Send + Sync {
    /// `AlreadyAssigned` when the pair exists.
    async fn assign(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<UserRole, RoleServiceError>;

    /// Re-point the user's assignment to `role_id`. `None` when the user has none.
    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<Option<UserRole>, RoleServiceError>;

    /// `false` when the pair did not exist.
    async fn remove(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<bool, RoleServiceError>;
}
