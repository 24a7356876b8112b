use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::user::{User, UserWithPassword};
use shop_domain::view::ListView;

use crate::domain::repository::{PasswordHasher, RoleClient, UserRepository};
use crate::domain::types::{CreateUser, NewUser, UpdateUser, UserChanges, generate_verification_code};
use crate::error::UserServiceError;

fn list_method(view: ListView) -> &'static str {
    match view {
        ListView::All => "FindAllUsers",
        ListView::Active => "FindActiveUsers",
        ListView::Trashed => "FindTrashedUsers",
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct UserQueryUseCase<R: UserRepository, C: CacheStore> {
    pub repo: R,
    pub cache: EntityCache<C>,
}

impl<R: UserRepository, C: CacheStore> UserQueryUseCase<R, C> {
    pub async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: PageRequest,
    ) -> Result<Page<User>, UserServiceError> {
        let page = page.normalized();
        let mut op = Operation::start(ctx, list_method(view));
        let key = self.cache.keys().list(view, &page);
        if let Some(hit) = self.cache.get::<Page<User>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let result = match self.repo.find_page(ctx, view, &page).await {
            Ok(result) => result,
            Err(e) => return op.fail(e, "find_users", UserServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &result).await;
        Ok(result)
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: i32) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "FindUserById");
        let key = self.cache.keys().id(id);
        if let Some(hit) = self.cache.get::<User>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let user = match self.repo.find_by_id(ctx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "find_user"),
            Err(e) => return op.fail(e, "find_user", UserServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &user).await;
        Ok(user)
    }

    pub async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "FindUserByEmail");
        let email = normalize_email(email);
        let key = self.cache.keys().email(&email);
        if let Some(hit) = self.cache.get::<User>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let user = match self.repo.find_by_email(ctx, &email).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "find_user_by_email"),
            Err(e) => return op.fail(e, "find_user_by_email", UserServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &user).await;
        Ok(user)
    }

    /// Verified account with its password hash. Never cached.
    pub async fn find_by_email_and_verify(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<UserWithPassword, UserServiceError> {
        let mut op = Operation::start(ctx, "FindUserByEmailAndVerify");
        let email = normalize_email(email);
        match self.repo.find_verified_with_password(ctx, &email).await {
            Ok(Some(found)) => Ok(found),
            Ok(None) => op.reject(UserServiceError::UserNotFound, "find_verified_user"),
            Err(e) => op.fail(e, "find_verified_user", UserServiceError::FindFailed),
        }
    }

    pub async fn find_by_verification_code(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "FindUserByVerificationCode");
        let code = code.trim();
        if code.is_empty() {
            return op.reject(
                UserServiceError::Validation("verification code is required".into()),
                "find_user_by_code",
            );
        }
        match self.repo.find_by_verification_code(ctx, code).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => op.reject(UserServiceError::UserNotFound, "find_user_by_code"),
            Err(e) => op.fail(e, "find_user_by_code", UserServiceError::FindFailed),
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub struct UserCommandUseCase<R, H, K, C>
where
    R: UserRepository,
    H: PasswordHasher,
    K: RoleClient,
    C: CacheStore,
{
    pub repo: R,
    pub hasher: H,
    pub roles: K,
    pub cache: EntityCache<C>,
    /// Role name every new account receives.
    pub default_role: String,
}

impl<R, H, K, C> UserCommandUseCase<R, H, K, C>
where
    R: UserRepository,
    H: PasswordHasher,
    K: RoleClient,
    C: CacheStore,
{
    async fn forget_emails(&self, ctx: &RequestContext, emails: &[&str]) {
        for email in emails {
            self.cache.forget(ctx, &self.cache.keys().email(email)).await;
        }
    }

    async fn assign_default_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<(), UserServiceError> {
        let role_id = self.roles.find_role_id(ctx, &self.default_role).await?;
        self.roles.assign_role(ctx, user_id, role_id).await
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUser,
    ) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "CreateUser");
        if let Err(e) = input.validate() {
            return op.reject(e, "create_user");
        }
        let email = normalize_email(&input.email);
        match self.repo.find_by_email(ctx, &email).await {
            Ok(None) => {}
            Ok(Some(_)) => return op.reject(UserServiceError::EmailTaken, "create_user"),
            Err(e) => return op.fail(e, "create_user", UserServiceError::CreateFailed),
        }

        let password_hash = match self.hasher.hash(&input.password) {
            Ok(hash) => hash,
            Err(e) => return op.fail(e.into(), "hash_password", UserServiceError::HashFailed),
        };
        let new_user = NewUser {
            firstname: input.firstname.trim().to_owned(),
            lastname: input.lastname.trim().to_owned(),
            email,
            password_hash,
            verification_code: generate_verification_code(),
        };
        let user = match self.repo.create(ctx, &new_user).await {
            Ok(user) => user,
            Err(e) => return op.fail(e, "create_user", UserServiceError::CreateFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Create).await;

        // The account stays if the role call fails; the caller sees the role error.
        if let Err(e) = self.assign_default_role(ctx, user.id).await {
            return op.fail_with(
                e,
                "assign_default_role",
                UserServiceError::CreateFailed,
                &[("user_id", &user.id), ("role", &self.default_role)],
            );
        }
        Ok(user)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        input: UpdateUser,
    ) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "UpdateUser");
        if let Err(e) = input.validate() {
            return op.reject(e, "update_user");
        }
        let existing = match self.repo.find_by_id(ctx, input.id).await {
            Ok(Some(user)) if user.deleted_at.is_none() => user,
            Ok(_) => return op.reject(UserServiceError::UserNotFound, "update_user"),
            Err(e) => return op.fail(e, "update_user", UserServiceError::UpdateFailed),
        };
        let email = normalize_email(&input.email);
        if email != existing.email {
            match self.repo.find_by_email(ctx, &email).await {
                Ok(Some(other)) if other.id != input.id => {
                    return op.reject(UserServiceError::EmailTaken, "update_user");
                }
                Ok(_) => {}
                Err(e) => return op.fail(e, "update_user", UserServiceError::UpdateFailed),
            }
        }

        let password_hash = if input.changes_password() {
            match self.hasher.hash(&input.password) {
                Ok(hash) => Some(hash),
                Err(e) => return op.fail(e.into(), "hash_password", UserServiceError::HashFailed),
            }
        } else {
            None
        };
        let changes = UserChanges {
            id: input.id,
            firstname: input.firstname.trim().to_owned(),
            lastname: input.lastname.trim().to_owned(),
            email,
            password_hash,
        };
        let user = match self.repo.update(ctx, &changes).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "update_user"),
            Err(e) => return op.fail(e, "update_user", UserServiceError::UpdateFailed),
        };
        self.forget_emails(ctx, &[existing.email.as_str(), user.email.as_str()]).await;
        self.cache.invalidate(ctx, CacheWrite::Update(user.id)).await;
        Ok(user)
    }

    pub async fn update_is_verified(
        &self,
        ctx: &RequestContext,
        id: i32,
        is_verified: bool,
    ) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "UpdateUserIsVerified");
        let user = match self.repo.update_verified(ctx, id, is_verified).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "update_user_verified"),
            Err(e) => {
                return op.fail(e, "update_user_verified", UserServiceError::UpdateVerifiedFailed);
            }
        };
        self.forget_emails(ctx, &[user.email.as_str()]).await;
        self.cache.invalidate(ctx, CacheWrite::Update(id)).await;
        Ok(user)
    }

    pub async fn trash(&self, ctx: &RequestContext, id: i32) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "TrashUser");
        let user = match self.repo.trash(ctx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "trash_user"),
            Err(e) => return op.fail(e, "trash_user", UserServiceError::TrashFailed),
        };
        self.forget_emails(ctx, &[user.email.as_str()]).await;
        self.cache.invalidate(ctx, CacheWrite::Trash(id)).await;
        Ok(user)
    }

    pub async fn restore(&self, ctx: &RequestContext, id: i32) -> Result<User, UserServiceError> {
        let mut op = Operation::start(ctx, "RestoreUser");
        let user = match self.repo.restore(ctx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "restore_user"),
            Err(e) => return op.fail(e, "restore_user", UserServiceError::RestoreFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Restore(id)).await;
        Ok(user)
    }

    pub async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<(), UserServiceError> {
        let mut op = Operation::start(ctx, "DeleteUserPermanent");
        let user = match self.repo.delete_permanent(ctx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => return op.reject(UserServiceError::UserNotFound, "delete_user"),
            Err(e) => return op.fail(e, "delete_user", UserServiceError::DeleteFailed),
        };
        self.forget_emails(ctx, &[user.email.as_str()]).await;
        self.cache.invalidate(ctx, CacheWrite::DeletePermanent(id)).await;
        Ok(())
    }

    pub async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, UserServiceError> {
        let mut op = Operation::start(ctx, "RestoreAllUsers");
        let affected = match self.repo.restore_all(ctx).await {
            Ok(affected) => affected,
            Err(e) => return op.fail(e, "restore_all_users", UserServiceError::RestoreAllFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::RestoreAll).await;
        Ok(affected)
    }

    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, UserServiceError> {
        let mut op = Operation::start(ctx, "DeleteAllUsers");
        let affected = match self.repo.delete_all_permanent(ctx).await {
            Ok(affected) => affected,
            Err(e) => return op.fail(e, "delete_all_users", UserServiceError::DeleteAllFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::DeleteAll).await;
        Ok(affected)
    }
}
