#![allow(async_fn_in_trait)]

use shop_core::context::RequestContext;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::user::{User, UserWithPassword};
use shop_domain::view::ListView;

use crate::domain::types::{NewUser, UserChanges};
use crate::error::UserServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<User>, UserServiceError>;

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError>;

    /// Active rows only.
    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, UserServiceError>;

    /// Active, verified rows only, with the stored hash.
    async fn find_verified_with_password(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<UserWithPassword>, UserServiceError>;

    async fn find_by_verification_code(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<Option<User>, UserServiceError>;

    async fn create(&self, ctx: &RequestContext, input: &NewUser)
    -> Result<User, UserServiceError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserServiceError>;

    async fn update_verified(
        &self,
        ctx: &RequestContext,
        id: i32,
        is_verified: bool,
    ) -> Result<Option<User>, UserServiceError>;

    async fn trash(&self, ctx: &RequestContext, id: i32)
    -> Result<Option<User>, UserServiceError>;

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError>;

    /// The removed row, `None` when it did not exist.
    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError>;

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, UserServiceError>;

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, UserServiceError>;
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
}

/// The slice of the role service that account creation needs.
pub trait RoleClient: Send + Sync {
    /// Id of the active role called `name`.
    async fn find_role_id(&self, ctx: &RequestContext, name: &str)
    -> Result<i32, UserServiceError>;

    async fn assign_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<(), UserServiceError>;
}
