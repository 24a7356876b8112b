use shop_core::cache::{CacheStore, CacheWrite, EntityCache};
use shop_core::context::RequestContext;
use shop_core::error_handler::Operation;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::view::ListView;

use crate::domain::repository::ProductRepository;
use crate::domain::types::{CreateProduct, UpdateProduct};
use crate::error::ProductServiceError;

fn list_method(view: ListView) -> &'static str {
    match view {
        ListView::All => "FindAllProducts",
        ListView::Active => "FindActiveProducts",
        ListView::Trashed => "FindTrashedProducts",
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct ProductQueryUseCase<R: ProductRepository, C: CacheStore> {
    pub repo: R,
    pub cache: EntityCache<C>,
}

impl<R: ProductRepository, C: CacheStore> ProductQueryUseCase<R, C> {
    pub async fn find_page(
        &self,
        ctx: &RequestContext,
        view: ListView,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductServiceError> {
        let page = page.normalized();
        let mut op = Operation::start(ctx, list_method(view));
        let key = self.cache.keys().list(view, &page);
        if let Some(hit) = self.cache.get::<Page<Product>>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let result = match self.repo.find_page(ctx, view, &page).await {
            Ok(result) => result,
            Err(e) => return op.fail(e, "find_products", ProductServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &result).await;
        Ok(result)
    }

    pub async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "FindProductById");
        let key = self.cache.keys().id(id);
        if let Some(hit) = self.cache.get::<Product>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let product = match self.repo.find_by_id(ctx, id).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "find_product"),
            Err(e) => return op.fail(e, "find_product", ProductServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &product).await;
        Ok(product)
    }

    pub async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "FindProductByName");
        let key = self.cache.keys().name(name);
        if let Some(hit) = self.cache.get::<Product>(ctx, &key).await {
            op.cache_hit(&key);
            return Ok(hit);
        }

        let product = match self.repo.find_by_name(ctx, name).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return op.reject(ProductServiceError::ProductNotFound, "find_product_by_name");
            }
            Err(e) => return op.fail(e, "find_product_by_name", ProductServiceError::FindFailed),
        };
        self.cache.set(ctx, &key, &product).await;
        Ok(product)
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub struct ProductCommandUseCase<R: ProductRepository, C: CacheStore> {
    pub repo: R,
    pub cache: EntityCache<C>,
}

impl<R: ProductRepository, C: CacheStore> ProductCommandUseCase<R, C> {
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateProduct,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "CreateProduct");
        if let Err(e) = input.validate() {
            return op.reject(e, "create_product");
        }
        match self.repo.find_by_name(ctx, &input.name).await {
            Ok(None) => {}
            Ok(Some(_)) => return op.reject(ProductServiceError::NameTaken, "create_product"),
            Err(e) => return op.fail(e, "create_product", ProductServiceError::CreateFailed),
        }

        let product = match self.repo.create(ctx, &input).await {
            Ok(product) => product,
            Err(e) => return op.fail(e, "create_product", ProductServiceError::CreateFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Create).await;
        Ok(product)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        input: UpdateProduct,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "UpdateProduct");
        if let Err(e) = input.validate() {
            return op.reject(e, "update_product");
        }
        let existing = match self.repo.find_by_id(ctx, input.id).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "update_product"),
            Err(e) => return op.fail(e, "update_product", ProductServiceError::UpdateFailed),
        };
        if existing.name != input.name {
            match self.repo.find_by_name(ctx, &input.name).await {
                Ok(Some(other)) if other.id != input.id => {
                    return op.reject(ProductServiceError::NameTaken, "update_product");
                }
                Ok(_) => {}
                Err(e) => return op.fail(e, "update_product", ProductServiceError::UpdateFailed),
            }
        }

        let product = match self.repo.update(ctx, &input).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "update_product"),
            Err(e) => return op.fail(e, "update_product", ProductServiceError::UpdateFailed),
        };
        self.cache
            .forget(ctx, &self.cache.keys().name(&existing.name))
            .await;
        self.cache.invalidate(ctx, CacheWrite::Update(product.id)).await;
        Ok(product)
    }

    /// Set the absolute stock level. Used by the order saga after its own
    /// availability check.
    pub async fn update_stock(
        &self,
        ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "UpdateProductCountStock");
        if stock < 0 {
            return op.reject(ProductServiceError::NegativeStock, "update_product_stock");
        }

        let product = match self.repo.update_stock(ctx, id, stock).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return op.reject(ProductServiceError::ProductNotFound, "update_product_stock");
            }
            Err(e) => {
                return op.fail_with(
                    e,
                    "update_product_stock",
                    ProductServiceError::UpdateStockFailed,
                    &[("product_id", &id), ("stock", &stock)],
                );
            }
        };
        self.cache
            .forget(ctx, &self.cache.keys().name(&product.name))
            .await;
        self.cache.invalidate(ctx, CacheWrite::UpdateStock(id)).await;
        Ok(product)
    }

    pub async fn trash(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "TrashProduct");
        let product = match self.repo.trash(ctx, id).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "trash_product"),
            Err(e) => return op.fail(e, "trash_product", ProductServiceError::TrashFailed),
        };
        self.cache
            .forget(ctx, &self.cache.keys().name(&product.name))
            .await;
        self.cache.invalidate(ctx, CacheWrite::Trash(id)).await;
        Ok(product)
    }

    pub async fn restore(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Product, ProductServiceError> {
        let mut op = Operation::start(ctx, "RestoreProduct");
        let product = match self.repo.restore(ctx, id).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "restore_product"),
            Err(e) => return op.fail(e, "restore_product", ProductServiceError::RestoreFailed),
        };
        self.cache.invalidate(ctx, CacheWrite::Restore(id)).await;
        Ok(product)
    }

    pub async fn delete_permanent(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<(), ProductServiceError> {
        let mut op = Operation::start(ctx, "DeleteProductPermanent");
        let product = match self.repo.delete_permanent(ctx, id).await {
            Ok(Some(product)) => product,
            Ok(None) => return op.reject(ProductServiceError::ProductNotFound, "delete_product"),
            Err(e) => return op.fail(e, "delete_product", ProductServiceError::DeleteFailed),
        };
        self.cache
            .forget(ctx, &self.cache.keys().name(&product.name))
            .await;
        self.cache.invalidate(ctx, CacheWrite::DeletePermanent(id)).await;
        Ok(())
    }

    pub async fn restore_all(&self, ctx: &RequestContext) -> Result<u64, ProductServiceError> {
        let mut op = Operation::start(ctx, "RestoreAllProducts");
        let affected = match self.repo.restore_all(ctx).await {
            Ok(affected) => affected,
            Err(e) => {
                return op.fail(e, "restore_all_products", ProductServiceError::RestoreAllFailed);
            }
        };
        self.cache.invalidate(ctx, CacheWrite::RestoreAll).await;
        Ok(affected)
    }

    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, ProductServiceError> {
        let mut op = Operation::start(ctx, "DeleteAllProducts");
        let affected = match self.repo.delete_all_permanent(ctx).await {
            Ok(affected) => affected,
            Err(e) => {
                return op.fail(e, "delete_all_products", ProductServiceError::DeleteAllFailed);
            }
        };
        self.cache.invalidate(ctx, CacheWrite::DeleteAll).await;
        Ok(affected)
    }
}
