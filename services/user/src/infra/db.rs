use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, SqlErr, sea_query::Expr,
};

use shop_core::context::RequestContext;
use shop_core::sea_ext::{SoftDelete, SoftDeleteScope, fetch_page};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::user::{User, UserWithPassword};
use shop_domain::view::ListView;
use shop_user_schema::users;

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, UserChanges};
use crate::error::UserServiceError;

const LIFECYCLE: SoftDelete<users::Column> = SoftDelete {
    id: users::Column::Id,
    updated_at: users::Column::UpdatedAt,
    deleted_at: users::Column::DeletedAt,
};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    async fn find_active(
        &self,
        ctx: &RequestContext,
        filter: Condition,
        action: &'static str,
    ) -> Result<Option<users::Model>, UserServiceError> {
        let model = ctx
            .guard(
                users::Entity::find()
                    .filter(filter)
                    .filter(users::Column::DeletedAt.is_null())
                    .one(&self.db),
            )
            .await?
            .context(action)?;
        Ok(model)
    }
}

impl UserRepository for DbUserRepository {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<User>, UserServiceError> {
        let mut select = users::Entity::find().in_view(view, users::Column::DeletedAt);
        if page.has_search() {
            select = select.filter(
                Condition::any()
                    .add(users::Column::Firstname.contains(&page.search))
                    .add(users::Column::Lastname.contains(&page.search))
                    .add(users::Column::Email.contains(&page.search)),
            );
        }
        let rows = ctx
            .guard(fetch_page(select, &self.db, users::Column::Id, page))
            .await?
            .with_context(|| format!("find {} users page", view.as_str()))?;
        Ok(rows.map(user_from_model))
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError> {
        let model = ctx
            .guard(users::Entity::find_by_id(id).one(&self.db))
            .await?
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let filter = Condition::all().add(users::Column::Email.eq(email));
        let model = self.find_active(ctx, filter, "find user by email").await?;
        Ok(model.map(user_from_model))
    }

    async fn find_verified_with_password(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<UserWithPassword>, UserServiceError> {
        let filter = Condition::all()
            .add(users::Column::Email.eq(email))
            .add(users::Column::IsVerified.eq(true));
        let model = self
            .find_active(ctx, filter, "find verified user by email")
            .await?;
        Ok(model.map(|model| {
            let password_hash = model.password.clone();
            UserWithPassword {
                user: user_from_model(model),
                password_hash,
            }
        }))
    }

    async fn find_by_verification_code(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let filter = Condition::all().add(users::Column::VerificationCode.eq(code));
        let model = self
            .find_active(ctx, filter, "find user by verification code")
            .await?;
        Ok(model.map(user_from_model))
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        input: &NewUser,
    ) -> Result<User, UserServiceError> {
        let now = Utc::now();
        let insert = users::ActiveModel {
            firstname: Set(input.firstname.clone()),
            lastname: Set(input.lastname.clone()),
            email: Set(input.email.clone()),
            password: Set(input.password_hash.clone()),
            verification_code: Set(input.verification_code.clone()),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx
            .guard(insert)
            .await?
            .map_err(|e| write_error(e, "create user"))?;
        Ok(user_from_model(model))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserServiceError> {
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::Firstname, Expr::value(changes.firstname.clone()))
            .col_expr(users::Column::Lastname, Expr::value(changes.lastname.clone()))
            .col_expr(users::Column::Email, Expr::value(changes.email.clone()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(hash) = &changes.password_hash {
            update = update.col_expr(users::Column::Password, Expr::value(hash.clone()));
        }
        let update = update
            .filter(users::Column::Id.eq(changes.id))
            .filter(users::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx
            .guard(update)
            .await?
            .map_err(|e| write_error(e, "update user"))?;
        Ok(rows.pop().map(user_from_model))
    }

    async fn update_verified(
        &self,
        ctx: &RequestContext,
        id: i32,
        is_verified: bool,
    ) -> Result<Option<User>, UserServiceError> {
        let update = users::Entity::update_many()
            .col_expr(users::Column::IsVerified, Expr::value(is_verified))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx
            .guard(update)
            .await?
            .context("update user verification")?;
        Ok(rows.pop().map(user_from_model))
    }

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError> {
        let model = ctx
            .guard(LIFECYCLE.trash::<users::Entity, _>(&self.db, id))
            .await?
            .context("trash user")?;
        Ok(model.map(user_from_model))
    }

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError> {
        let model = ctx
            .guard(LIFECYCLE.restore::<users::Entity, _>(&self.db, id))
            .await?
            .map_err(|e| write_error(e, "restore user"))?;
        Ok(model.map(user_from_model))
    }

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<User>, UserServiceError> {
        let model = ctx
            .guard(LIFECYCLE.delete_permanent::<users::Entity, _>(&self.db, id))
            .await?
            .context("delete user permanently")?;
        Ok(model.map(user_from_model))
    }

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, UserServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.restore_all::<users::Entity, _>(&self.db))
            .await?
            .map_err(|e| write_error(e, "restore all users"))?;
        Ok(affected)
    }

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, UserServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.delete_all_trashed::<users::Entity, _>(&self.db))
            .await?
            .context("delete all trashed users")?;
        Ok(affected)
    }
}

fn write_error(err: DbErr, action: &'static str) -> UserServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UserServiceError::EmailTaken,
        _ => anyhow::Error::new(err).context(action).into(),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        firstname: model.firstname,
        lastname: model.lastname,
        email: model.email,
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}
