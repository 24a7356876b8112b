use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use shop_core::cache::EntityCache;
use shop_core::context::RequestContext;
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::product::Product;
use shop_domain::user::User;
use shop_domain::view::ListView;
use shop_order::domain::repository::{
    OrderItemRepository, OrderRepository, ProductClient, UserClient,
};
use shop_order::domain::types::NewOrderItem;
use shop_order::error::OrderServiceError;
use shop_order::state::{ORDER_ITEM_KEYS, ORDER_KEYS};
use shop_order::usecase::order::{OrderCommandUseCase, OrderQueryUseCase};
use shop_order::usecase::order_item::{OrderItemCommandUseCase, OrderItemQueryUseCase};
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;
use shop_testing::store::{next_id, paginate, transition};

// ── MockOrderStore ───────────────────────────────────────────────────────────

/// Orders and their items in one store, so permanent order deletes can
/// cascade the way the foreign key does.
#[derive(Clone, Default)]
pub struct MockOrderStore {
    pub orders: Arc<Mutex<Vec<Order>>>,
    pub items: Arc<Mutex<Vec<OrderItem>>>,
    pub reads: Arc<AtomicUsize>,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_finalize: Arc<AtomicBool>,
}

impl MockOrderStore {
    pub fn new(orders: Vec<Order>, items: Vec<OrderItem>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
            items: Arc::new(Mutex::new(items)),
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_finalize(&self) {
        self.fail_finalize.store(true, Ordering::SeqCst);
    }

    pub fn order(&self, id: i32) -> Option<Order> {
        self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn item(&self, id: i32) -> Option<OrderItem> {
        self.items.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }

    pub fn items_of(&self, order_id: i32) -> Vec<OrderItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn check_write(&self) -> Result<(), OrderServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(anyhow::anyhow!("connection reset by peer").into())
        } else {
            Ok(())
        }
    }
}

impl OrderRepository for MockOrderStore {
    async fn find_page(
        &self,
        _ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let orders = self.orders.lock().unwrap();
        Ok(paginate(&orders, view, page, |o| {
            o.user_id.to_string() == page.search
        }))
    }

    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.order(id))
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Order, OrderServiceError> {
        self.check_write()?;
        let mut orders = self.orders.lock().unwrap();
        let order = fixture::order(next_id(&orders), user_id, 0);
        orders.push(order.clone());
        Ok(order)
    }

    async fn finalize(
        &self,
        _ctx: &RequestContext,
        id: i32,
        user_id: i32,
        total_price: i64,
    ) -> Result<Option<Order>, OrderServiceError> {
        if self.fail_finalize.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("statement timeout").into());
        }
        self.check_write()?;
        let mut orders = self.orders.lock().unwrap();
        Ok(orders
            .iter_mut()
            .find(|o| o.id == id && o.deleted_at.is_none())
            .map(|o| {
                o.user_id = user_id;
                o.total_price = total_price;
                o.updated_at = Utc::now();
                o.clone()
            }))
    }

    async fn trash(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.orders.lock().unwrap(), id, true))
    }

    async fn restore(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Order>, OrderServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.orders.lock().unwrap(), id, false))
    }

    async fn delete_permanent(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError> {
        self.check_write()?;
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        let deleted = orders.len() < before;
        if deleted {
            self.items.lock().unwrap().retain(|i| i.order_id != id);
        }
        Ok(deleted)
    }

    async fn restore_all(&self, _ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        self.check_write()?;
        let mut orders = self.orders.lock().unwrap();
        let mut affected = 0;
        for o in orders.iter_mut().filter(|o| o.deleted_at.is_some()) {
            o.deleted_at = None;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_all_permanent(&self, _ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        self.check_write()?;
        let mut orders = self.orders.lock().unwrap();
        let gone: Vec<i32> = orders
            .iter()
            .filter(|o| o.deleted_at.is_some())
            .map(|o| o.id)
            .collect();
        orders.retain(|o| o.deleted_at.is_none());
        self.items
            .lock()
            .unwrap()
            .retain(|i| !gone.contains(&i.order_id));
        Ok(gone.len() as u64)
    }
}

impl OrderItemRepository for MockOrderStore {
    async fn find_page(
        &self,
        _ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<OrderItem>, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().unwrap();
        Ok(paginate(&items, view, page, |i| {
            i.product_id.to_string() == page.search
        }))
    }

    async fn find_by_order(
        &self,
        _ctx: &RequestContext,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items_of(order_id)
            .into_iter()
            .filter(|i| i.deleted_at.is_none())
            .collect())
    }

    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.item(id))
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        item: &NewOrderItem,
    ) -> Result<OrderItem, OrderServiceError> {
        self.check_write()?;
        let mut items = self.items.lock().unwrap();
        let row = fixture::order_item(
            next_id(&items),
            item.order_id,
            item.product_id,
            item.quantity,
            item.price,
        );
        items.push(row.clone());
        Ok(row)
    }

    async fn update_line(
        &self,
        _ctx: &RequestContext,
        id: i32,
        product_id: i32,
        quantity: i32,
        price: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        self.check_write()?;
        let mut items = self.items.lock().unwrap();
        Ok(items
            .iter_mut()
            .find(|i| i.id == id && i.deleted_at.is_none())
            .map(|i| {
                i.product_id = product_id;
                i.quantity = quantity;
                i.price = price;
                i.clone()
            }))
    }

    async fn sum_total(
        &self,
        _ctx: &RequestContext,
        order_id: i32,
    ) -> Result<i64, OrderServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items_of(order_id)
            .iter()
            .filter(|i| i.deleted_at.is_none())
            .map(OrderItem::line_total)
            .sum())
    }

    async fn trash(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.items.lock().unwrap(), id, true))
    }

    async fn restore(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<OrderItem>, OrderServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.items.lock().unwrap(), id, false))
    }

    async fn delete_permanent(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<bool, OrderServiceError> {
        self.check_write()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn restore_all(&self, _ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        self.check_write()?;
        let mut items = self.items.lock().unwrap();
        let mut affected = 0;
        for i in items.iter_mut().filter(|i| i.deleted_at.is_some()) {
            i.deleted_at = None;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_all_permanent(&self, _ctx: &RequestContext) -> Result<u64, OrderServiceError> {
        self.check_write()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.deleted_at.is_none());
        Ok((before - items.len()) as u64)
    }
}

// ── Upstream fakes ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserClient {
    pub users: Arc<Mutex<Vec<User>>>,
    pub down: Arc<AtomicBool>,
}

impl MockUserClient {
    pub fn with_users(ids: &[i32]) -> Self {
        let users = ids
            .iter()
            .map(|&id| fixture::user(id, &format!("user{id}@example.com")))
            .collect();
        Self {
            users: Arc::new(Mutex::new(users)),
            ..Default::default()
        }
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

impl UserClient for MockUserClient {
    async fn find_by_id(&self, ctx: &RequestContext, id: i32) -> Result<User, OrderServiceError> {
        if ctx.is_expired() {
            return Err(OrderServiceError::Cancelled);
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(OrderServiceError::UpstreamUnavailable("user"));
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(OrderServiceError::UserNotFound)
    }
}

/// Product service stand-in. Records every stock write it accepts.
#[derive(Clone, Default)]
pub struct MockProductClient {
    pub products: Arc<Mutex<Vec<Product>>>,
    pub stock_writes: Arc<Mutex<Vec<(i32, i32)>>>,
    pub down: Arc<AtomicBool>,
    pub reject_stock: Arc<AtomicBool>,
    pub cancel_stock: Arc<AtomicBool>,
}

impl MockProductClient {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products)),
            ..Default::default()
        }
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn reject_stock_updates(&self) {
        self.reject_stock.store(true, Ordering::SeqCst);
    }

    /// Stock writes behave as if the caller's deadline ran out mid-call.
    pub fn cancel_stock_updates(&self) {
        self.cancel_stock.store(true, Ordering::SeqCst);
    }

    pub fn stock(&self, id: i32) -> i32 {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
            .unwrap()
    }

    pub fn set_price(&self, id: i32, price: i32) {
        if let Some(p) = self.products.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.price = price;
        }
    }

    pub fn stock_writes(&self) -> Vec<(i32, i32)> {
        self.stock_writes.lock().unwrap().clone()
    }

    fn check_up(&self) -> Result<(), OrderServiceError> {
        if self.down.load(Ordering::SeqCst) {
            Err(OrderServiceError::UpstreamUnavailable("product"))
        } else {
            Ok(())
        }
    }
}

impl ProductClient for MockProductClient {
    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Product, OrderServiceError> {
        self.check_up()?;
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(OrderServiceError::ProductNotFound)
    }

    async fn update_stock(
        &self,
        _ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Product, OrderServiceError> {
        self.check_up()?;
        if self.cancel_stock.load(Ordering::SeqCst) {
            return Err(OrderServiceError::Cancelled);
        }
        if self.reject_stock.load(Ordering::SeqCst) {
            return Err(OrderServiceError::UpstreamUnavailable("product"));
        }
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(OrderServiceError::ProductNotFound)?;
        product.stock = stock;
        self.stock_writes.lock().unwrap().push((id, stock));
        Ok(product.clone())
    }
}

// ── Builders ─────────────────────────────────────────────────────────────────

pub type Commands =
    OrderCommandUseCase<MockOrderStore, MockOrderStore, MockUserClient, MockProductClient, InMemoryCache>;

pub fn ctx() -> RequestContext {
    RequestContext::new().with_trace_id("test-trace")
}

pub fn queries(
    store: &MockOrderStore,
    cache: &InMemoryCache,
) -> OrderQueryUseCase<MockOrderStore, InMemoryCache> {
    OrderQueryUseCase {
        repo: store.clone(),
        cache: EntityCache::new(cache.clone(), ORDER_KEYS),
    }
}

pub fn commands(
    store: &MockOrderStore,
    users: &MockUserClient,
    products: &MockProductClient,
    cache: &InMemoryCache,
) -> Commands {
    OrderCommandUseCase {
        orders: store.clone(),
        items: store.clone(),
        users: users.clone(),
        products: products.clone(),
        cache: EntityCache::new(cache.clone(), ORDER_KEYS),
        item_cache: EntityCache::new(cache.clone(), ORDER_ITEM_KEYS),
    }
}

pub fn item_queries(
    store: &MockOrderStore,
    cache: &InMemoryCache,
) -> OrderItemQueryUseCase<MockOrderStore, InMemoryCache> {
    OrderItemQueryUseCase {
        repo: store.clone(),
        cache: EntityCache::new(cache.clone(), ORDER_ITEM_KEYS),
    }
}

pub fn item_commands(
    store: &MockOrderStore,
    cache: &InMemoryCache,
) -> OrderItemCommandUseCase<MockOrderStore, InMemoryCache> {
    OrderItemCommandUseCase {
        repo: store.clone(),
        cache: EntityCache::new(cache.clone(), ORDER_ITEM_KEYS),
    }
}

pub fn first_page() -> PageRequest {
    PageRequest::new(1, 10, "")
}
