//! sea-orm helpers for soft-deletable tables: view scoping, paginated
//! listing with a windowed total, and the lifecycle transitions.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QueryResult, QuerySelect, Select, sea_query::Expr,
};

use shop_domain::pagination::{Page, PageRequest};
use shop_domain::view::ListView;

const TOTAL_COUNT: &str = "total_count";

pub trait SoftDeleteScope: Sized {
    /// Restrict to the rows of a listing view.
    fn in_view<C: ColumnTrait>(self, view: ListView, deleted_at: C) -> Self;
}

impl<E: EntityTrait> SoftDeleteScope for Select<E> {
    fn in_view<C: ColumnTrait>(self, view: ListView, deleted_at: C) -> Self {
        match view {
            ListView::All => self,
            ListView::Active => self.filter(deleted_at.is_null()),
            ListView::Trashed => self.filter(deleted_at.is_not_null()),
        }
    }
}

/// A model row plus the `COUNT(*) OVER()` projection.
pub struct Counted<M> {
    pub model: M,
    pub total_count: i64,
}

impl<M: FromQueryResult> FromQueryResult for Counted<M> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            model: M::from_query_result(res, pre)?,
            total_count: res.try_get(pre, TOTAL_COUNT)?,
        })
    }
}

/// Fetch one page ordered by primary key descending.
///
/// The total is read from the window projection of the first row. A page
/// past the end has no rows to read it from, so a separate `COUNT` is issued
/// for that case.
pub async fn fetch_page<E, C>(
    select: Select<E>,
    db: &C,
    id: E::Column,
    page: &PageRequest,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let rows = select
        .clone()
        .column_as(Expr::cust("COUNT(*) OVER()"), TOTAL_COUNT)
        .order_by_desc(id)
        .offset(page.offset())
        .limit(page.limit())
        .into_model::<Counted<E::Model>>()
        .all(db)
        .await?;

    let total_records = match rows.first() {
        Some(row) => row.total_count.max(0) as u64,
        None if page.page > 1 => select.count(db).await?,
        None => 0,
    };

    Ok(Page {
        items: rows.into_iter().map(|row| row.model).collect(),
        total_records,
    })
}

// ── Lifecycle transitions ────────────────────────────────────────────────────

/// The columns every soft-deletable table carries.
#[derive(Debug, Clone, Copy)]
pub struct SoftDelete<C> {
    pub id: C,
    pub updated_at: C,
    pub deleted_at: C,
}

impl<C: ColumnTrait> SoftDelete<C> {
    /// Active → Trashed. `None` when no active row has this id.
    pub async fn trash<E, D>(&self, db: &D, id: i32) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        self.transition::<E, D>(db, id, Some(Utc::now())).await
    }

    /// Trashed → Active. `None` when no trashed row has this id.
    pub async fn restore<E, D>(&self, db: &D, id: i32) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        self.transition::<E, D>(db, id, None).await
    }

    async fn transition<E, D>(
        &self,
        db: &D,
        id: i32,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        let from = match deleted_at {
            Some(_) => self.deleted_at.is_null(),
            None => self.deleted_at.is_not_null(),
        };
        let mut rows = E::update_many()
            .col_expr(self.deleted_at, Expr::value(deleted_at))
            .col_expr(self.updated_at, Expr::value(Utc::now()))
            .filter(self.id.eq(id))
            .filter(from)
            .exec_with_returning(db)
            .await?;
        Ok(rows.pop())
    }

    /// Remove the row whatever its state and hand it back. `None` when it did
    /// not exist.
    pub async fn delete_permanent<E, D>(&self, db: &D, id: i32) -> Result<Option<E::Model>, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        let mut rows = E::delete_many()
            .filter(self.id.eq(id))
            .exec_with_returning(db)
            .await?;
        Ok(rows.pop())
    }

    /// Trashed → Active for every trashed row.
    pub async fn restore_all<E, D>(&self, db: &D) -> Result<u64, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        let res = E::update_many()
            .col_expr(self.deleted_at, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(self.updated_at, Expr::value(Utc::now()))
            .filter(self.deleted_at.is_not_null())
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    /// Permanently remove every trashed row. Active rows are untouched.
    pub async fn delete_all_trashed<E, D>(&self, db: &D) -> Result<u64, DbErr>
    where
        E: EntityTrait<Column = C>,
        D: ConnectionTrait,
    {
        let res = E::delete_many()
            .filter(self.deleted_at.is_not_null())
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
