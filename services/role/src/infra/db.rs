use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr, sea_query::Expr,
};

use shop_core::context::RequestContext;
use shop_core::sea_ext::{SoftDelete, SoftDeleteScope, fetch_page};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::role::{Role, UserRole};
use shop_domain::view::ListView;
use shop_role_schema::{roles, user_roles};

use crate::domain::repository::{RoleRepository, UserRoleRepository};
use crate::error::RoleServiceError;

const LIFECYCLE: SoftDelete<roles::Column> = SoftDelete {
    id: roles::Column::Id,
    updated_at: roles::Column::UpdatedAt,
    deleted_at: roles::Column::DeletedAt,
};

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Role>, RoleServiceError> {
        let mut select = roles::Entity::find().in_view(view, roles::Column::DeletedAt);
        if page.has_search() {
            select = select.filter(roles::Column::Name.contains(&page.search));
        }
        let rows = ctx
            .guard(fetch_page(select, &self.db, roles::Column::Id, page))
            .await?
            .with_context(|| format!("find {} roles page", view.as_str()))?;
        Ok(rows.map(role_from_model))
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        let model = ctx
            .guard(roles::Entity::find_by_id(id).one(&self.db))
            .await?
            .context("find role by id")?;
        Ok(model.map(role_from_model))
    }

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError> {
        let model = ctx
            .guard(
                roles::Entity::find()
                    .filter(roles::Column::Name.eq(name))
                    .filter(roles::Column::DeletedAt.is_null())
                    .one(&self.db),
            )
            .await?
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }

    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Vec<Role>, RoleServiceError> {
        let models = ctx
            .guard(
                roles::Entity::find()
                    .join(JoinType::InnerJoin, roles::Relation::UserRoles.def())
                    .filter(user_roles::Column::UserId.eq(user_id))
                    .filter(roles::Column::DeletedAt.is_null())
                    .order_by_asc(user_roles::Column::Id)
                    .all(&self.db),
            )
            .await?
            .context("find roles by user id")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn create(&self, ctx: &RequestContext, name: &str) -> Result<Role, RoleServiceError> {
        let now = Utc::now();
        let insert = roles::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx
            .guard(insert)
            .await?
            .map_err(|e| role_write_error(e, "create role"))?;
        Ok(role_from_model(model))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: i32,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError> {
        let update = roles::Entity::update_many()
            .col_expr(roles::Column::Name, Expr::value(name.to_owned()))
            .col_expr(roles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(roles::Column::Id.eq(id))
            .filter(roles::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx
            .guard(update)
            .await?
            .map_err(|e| role_write_error(e, "update role"))?;
        Ok(rows.pop().map(role_from_model))
    }

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        let model = ctx
            .guard(LIFECYCLE.trash::<roles::Entity, _>(&self.db, id))
            .await?
            .context("trash role")?;
        Ok(model.map(role_from_model))
    }

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        let model = ctx
            .guard(LIFECYCLE.restore::<roles::Entity, _>(&self.db, id))
            .await?
            .map_err(|e| role_write_error(e, "restore role"))?;
        Ok(model.map(role_from_model))
    }

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        let model = ctx
            .guard(LIFECYCLE.delete_permanent::<roles::Entity, _>(&self.db, id))
            .await?
            .context("delete role permanently")?;
        Ok(model.map(role_from_model))
    }

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.restore_all::<roles::Entity, _>(&self.db))
            .await?
            .map_err(|e| role_write_error(e, "restore all roles"))?;
        Ok(affected)
    }

    async fn delete_all_permanent(&self, ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.delete_all_trashed::<roles::Entity, _>(&self.db))
            .await?
            .context("delete all trashed roles")?;
        Ok(affected)
    }
}

// ── User role repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRoleRepository {
    pub db: DatabaseConnection,
}

impl UserRoleRepository for DbUserRoleRepository {
    async fn assign(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<UserRole, RoleServiceError> {
        let now = Utc::now();
        let insert = user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx
            .guard(insert)
            .await?
            .map_err(|e| assignment_write_error(e, "assign role"))?;
        Ok(user_role_from_model(model))
    }

    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<Option<UserRole>, RoleServiceError> {
        let update = user_roles::Entity::update_many()
            .col_expr(user_roles::Column::RoleId, Expr::value(role_id))
            .col_expr(user_roles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec_with_returning(&self.db);
        let rows = ctx
            .guard(update)
            .await?
            .map_err(|e| assignment_write_error(e, "update user role"))?;
        Ok(rows.into_iter().next().map(user_role_from_model))
    }

    async fn remove(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<bool, RoleServiceError> {
        let delete = user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(user_roles::Column::RoleId.eq(role_id))
            .exec(&self.db);
        let res = ctx.guard(delete).await?.context("remove user role")?;
        Ok(res.rows_affected > 0)
    }
}

fn role_write_error(err: DbErr, action: &'static str) -> RoleServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RoleServiceError::NameTaken,
        _ => anyhow::Error::new(err).context(action).into(),
    }
}

fn assignment_write_error(err: DbErr, action: &'static str) -> RoleServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RoleServiceError::AlreadyAssigned,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => RoleServiceError::RoleNotFound,
        _ => anyhow::Error::new(err).context(action).into(),
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

fn user_role_from_model(model: user_roles::Model) -> UserRole {
    UserRole {
        id: model.id,
        user_id: model.user_id,
        role_id: model.role_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
