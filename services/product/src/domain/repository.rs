#![allow(async_fn_in_trait)]

use shop_core::context::RequestContext;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::view::ListView;

use crate::domain::types::{CreateProduct, UpdateProduct};
use crate::error::ProductServiceError;

/// Repository for catalogue products.
///
/// Single-row transitions return `None` when no row is in the source state;
/// the use case turns that into `ProductNotFound`.
pub trait ProductRepository: Send + Sync {
    async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductServiceError>;

    /// Any non-gone row, active or trashed.
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError>;

    /// Active rows only.
    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Product>, ProductServiceError>;

    async fn create(
        &self,
        ctx: &RequestContext,
        input: &CreateProduct,
    ) -> Result<Product, ProductServiceError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, ProductServiceError>;

    /// Absolute set. Callers guarantee `stock >= 0`.
    async fn update_stock(
        &self,
        ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Option<Product>, ProductServiceError>;

    async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError>;

    async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError>;

    /// The removed row, `None` when it did not exist.
    async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError>;

    async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, ProductServiceError>;

    async fn delete_all_permanent(&self, ctx: &RequestContext)
    -> Result<u64, ProductServiceError>;
}
