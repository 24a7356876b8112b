use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use shop_core::cache::EntityCache;
use shop_core::context::RequestContext;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::view::ListView;
use shop_product::domain::repository::ProductRepository;
use shop_product::domain::types::{CreateProduct, UpdateProduct};
use shop_product::error::ProductServiceError;
use shop_product::state::PRODUCT_KEYS;
use shop_product::usecase::product::{ProductCommandUseCase, ProductQueryUseCase};
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;
use shop_testing::store::{next_id, paginate, transition};

// ── MockProductRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockProductRepo {
    pub products: Arc<Mutex<Vec<Product>>>,
    pub reads: Arc<AtomicUsize>,
    pub fail_writes: Arc<AtomicBool>,
}

impl MockProductRepo {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products)),
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: i32) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn check_write(&self) -> Result<(), ProductServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(anyhow::anyhow!("connection reset by peer").into())
        } else {
            Ok(())
        }
    }
}

impl ProductRepository for MockProductRepo {
    async fn find_page(
        &self,
        _ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().unwrap();
        Ok(paginate(&products, view, page, |p| p.name.contains(&page.search)))
    }

    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    async fn find_by_name(
        &self,
        _ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name && p.deleted_at.is_none())
            .cloned())
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        input: &CreateProduct,
    ) -> Result<Product, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        let product = fixture::product(next_id(&products), &input.name, input.price, input.stock);
        products.push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        Ok(products
            .iter_mut()
            .find(|p| p.id == input.id && p.deleted_at.is_none())
            .map(|p| {
                p.name = input.name.clone();
                p.price = input.price;
                p.stock = input.stock;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn update_stock(
        &self,
        _ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        Ok(products
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .map(|p| {
                p.stock = stock;
                p.clone()
            }))
    }

    async fn trash(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.products.lock().unwrap(), id, true))
    }

    async fn restore(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.products.lock().unwrap(), id, false))
    }

    async fn delete_permanent(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Product>, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        let pos = products.iter().position(|p| p.id == id);
        Ok(pos.map(|pos| products.remove(pos)))
    }

    async fn restore_all(&self, _ctx: &RequestContext) -> Result<u64, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        let mut affected = 0;
        for p in products.iter_mut().filter(|p| p.deleted_at.is_some()) {
            p.deleted_at = None;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_all_permanent(
        &self,
        _ctx: &RequestContext,
    ) -> Result<u64, ProductServiceError> {
        self.check_write()?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.deleted_at.is_none());
        Ok((before - products.len()) as u64)
    }
}

// ── Builders ─────────────────────────────────────────────────────────────────

pub fn ctx() -> RequestContext {
    RequestContext::new().with_trace_id("test-trace")
}

pub fn queries(
    repo: &MockProductRepo,
    cache: &InMemoryCache,
) -> ProductQueryUseCase<MockProductRepo, InMemoryCache> {
    ProductQueryUseCase {
        repo: repo.clone(),
        cache: EntityCache::new(cache.clone(), PRODUCT_KEYS),
    }
}

pub fn commands(
    repo: &MockProductRepo,
    cache: &InMemoryCache,
) -> ProductCommandUseCase<MockProductRepo, InMemoryCache> {
    ProductCommandUseCase {
        repo: repo.clone(),
        cache: EntityCache::new(cache.clone(), PRODUCT_KEYS),
    }
}

pub fn first_page() -> PageRequest {
    PageRequest::new(1, 10, "")
}
