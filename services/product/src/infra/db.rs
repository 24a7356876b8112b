use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr, sea_query::Expr,
};

use shop_core::context::RequestContext;
use shop_core::sea_ext::{SoftDelete, SoftDeleteScope, fetch_page};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::view::ListView;
use shop_product_schema::products;

use crate::domain::repository::ProductRepository;
use crate::domain::types::{CreateProduct, UpdateProduct};
use crate::error::ProductServiceError;

const LIFECYCLE: SoftDelete<products::Column> = SoftDelete {
    id: products::Column::Id,
    updated_at: products::Column::UpdatedAt,
    deleted_at: products::Column::DeletedAt,
};

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl ProductRepository for DbProductRepository {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductServiceError> {
        let mut select = products::Entity::find().in_view(view, products::Column::DeletedAt);
        if page.has_search() {
            select = select.filter(products::Column::Name.contains(&page.search));
        }
        let rows = ctx
            .guard(fetch_page(select, &self.db, products::Column::Id, page))
            .await?
            .with_context(|| format!("find {} products page", view.as_str()))?;
        Ok(rows.map(product_from_model))
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        let model = ctx
            .guard(products::Entity::find_by_id(id).one(&self.db))
            .await?
            .context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Product>, ProductServiceError> {
        let model = ctx
            .guard(
                products::Entity::find()
                    .filter(products::Column::Name.eq(name))
                    .filter(products::Column::DeletedAt.is_null())
                    .one(&self.db),
            )
            .await?
            .context("find product by name")?;
        Ok(model.map(product_from_model))
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        input: &CreateProduct,
    ) -> Result<Product, ProductServiceError> {
        let now = Utc::now();
        let insert = products::ActiveModel {
            name: Set(input.name.clone()),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db);
        let model = ctx
            .guard(insert)
            .await?
            .map_err(|e| write_error(e, "create product"))?;
        Ok(product_from_model(model))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, ProductServiceError> {
        let update = products::Entity::update_many()
            .col_expr(products::Column::Name, Expr::value(input.name.clone()))
            .col_expr(products::Column::Price, Expr::value(input.price))
            .col_expr(products::Column::Stock, Expr::value(input.stock))
            .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(products::Column::Id.eq(input.id))
            .filter(products::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx
            .guard(update)
            .await?
            .map_err(|e| write_error(e, "update product"))?;
        Ok(rows.pop().map(product_from_model))
    }

    async fn update_stock(
        &self,
        ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        let update = products::Entity::update_many()
            .col_expr(products::Column::Stock, Expr::value(stock))
            .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db);
        let mut rows = ctx
            .guard(update)
            .await?
            .context("update product stock")?;
        Ok(rows.pop().map(product_from_model))
    }

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        let model = ctx
            .guard(LIFECYCLE.trash::<products::Entity, _>(&self.db, id))
            .await?
            .context("trash product")?;
        Ok(model.map(product_from_model))
    }

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        // Restoring can collide with an active product that took the name meanwhile.
        let model = ctx
            .guard(LIFECYCLE.restore::<products::Entity, _>(&self.db, id))
            .await?
            .map_err(|e| write_error(e, "restore product"))?;
        Ok(model.map(product_from_model))
    }

    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        let model = ctx
            .guard(LIFECYCLE.delete_permanent::<products::Entity, _>(&self.db, id))
            .await?
            .context("delete product permanently")?;
        Ok(model.map(product_from_model))
    }

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, ProductServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.restore_all::<products::Entity, _>(&self.db))
            .await?
            .map_err(|e| write_error(e, "restore all products"))?;
        Ok(affected)
    }

    async fn delete_all_permanent(
        &self,
        ctx: &RequestContext,
    ) -> Result<u64, ProductServiceError> {
        let affected = ctx
            .guard(LIFECYCLE.delete_all_trashed::<products::Entity, _>(&self.db))
            .await?
            .context("delete all trashed products")?;
        Ok(affected)
    }
}

fn write_error(err: DbErr, action: &'static str) -> ProductServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ProductServiceError::NameTaken,
        _ => anyhow::Error::new(err).context(action).into(),
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        stock: model.stock,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}
