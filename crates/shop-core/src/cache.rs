//! Read-through / write-invalidate cache protocol.
//!
//! Keys per entity family:
//! - `{entity}:{all|active|trashed}:page:{p}:pageSize:{s}:search:{q}`
//! - `{entity}:id:{id}`, `{entity}:name:{name}`, `{entity}:email:{email}`
//!
//! Payloads are JSON. Store and serde failures are logged and treated as a
//! miss; the cache never fails a request.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shop_domain::pagination::PageRequest;
use shop_domain::view::ListView;

use crate::context::RequestContext;

/// TTL applied to every cache entry.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const SCAN_BATCH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache pool: {0}")]
    Pool(String),
    #[error("cache command: {0}")]
    Command(String),
}

/// Raw key/value store the services cache through.
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    /// Delete every key matching a glob pattern. Returns the number removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}

// ── Redis store ──────────────────────────────────────────────────────────────

/// Redis-backed store. Without a pool every read misses and every write is a no-op.
#[derive(Clone, Default)]
pub struct RedisCache {
    pub pool: Option<Pool>,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn conn(&self) -> Result<Option<deadpool_redis::Connection>, CacheError> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map(Some)
                .map_err(|e| CacheError::Pool(e.to_string())),
            None => Ok(None),
        }
    }
}

impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let Some(mut conn) = self.conn().await? else {
            return Ok(None);
        };
        conn.get(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let Some(mut conn) = self.conn().await? else {
            return Ok(());
        };
        let (): () = conn
            .set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let Some(mut conn) = self.conn().await? else {
            return Ok(());
        };
        let _: u64 = conn
            .del(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let Some(mut conn) = self.conn().await? else {
            return Ok(0);
        };
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Command(e.to_string()))?;
            if !keys.is_empty() {
                let deleted: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))?;
                removed += deleted;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(removed)
    }
}

// ── Key scheme ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKeys {
    entity: &'static str,
}

impl CacheKeys {
    pub const fn new(entity: &'static str) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn list(&self, view: ListView, page: &PageRequest) -> String {
        format!(
            "{}:{}:page:{}:pageSize:{}:search:{}",
            self.entity,
            view.as_str(),
            page.page,
            page.page_size,
            page.search
        )
    }

    pub fn id(&self, id: i32) -> String {
        format!("{}:id:{id}", self.entity)
    }

    pub fn name(&self, name: &str) -> String {
        format!("{}:name:{name}", self.entity)
    }

    pub fn email(&self, email: &str) -> String {
        format!("{}:email:{email}", self.entity)
    }

    /// Secondary lookup by a parent id, e.g. `order_items:order:{id}` or `roles:user:{id}`.
    pub fn by_parent(&self, parent: &str, id: i32) -> String {
        format!("{}:{parent}:{id}", self.entity)
    }

    pub fn parent_pattern(&self, parent: &str) -> String {
        format!("{}:{parent}:*", self.entity)
    }

    pub fn view_pattern(&self, view: ListView) -> String {
        format!("{}:{}:*", self.entity, view.as_str())
    }
}

/// A successful write, naming what the cache must forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Create,
    Update(i32),
    UpdateStock(i32),
    Trash(i32),
    Restore(i32),
    DeletePermanent(i32),
    RestoreAll,
    DeleteAll,
}

impl CacheWrite {
    /// The id key dropped by this write, if any.
    pub fn id(self) -> Option<i32> {
        match self {
            Self::Create | Self::RestoreAll | Self::DeleteAll => None,
            Self::Update(id)
            | Self::UpdateStock(id)
            | Self::Trash(id)
            | Self::Restore(id)
            | Self::DeletePermanent(id) => Some(id),
        }
    }

    /// Listing views this write may change.
    pub fn views(self) -> &'static [ListView] {
        match self {
            Self::Create | Self::Update(_) | Self::UpdateStock(_) => {
                &[ListView::All, ListView::Active]
            }
            Self::Trash(_)
            | Self::Restore(_)
            | Self::DeletePermanent(_)
            | Self::RestoreAll
            | Self::DeleteAll => &[ListView::All, ListView::Active, ListView::Trashed],
        }
    }
}

// ── Typed helper ─────────────────────────────────────────────────────────────

/// JSON read-through and pattern invalidation for one entity family.
#[derive(Clone)]
pub struct EntityCache<C> {
    store: C,
    keys: CacheKeys,
    ttl: Duration,
}

impl<C: CacheStore> EntityCache<C> {
    pub fn new(store: C, keys: CacheKeys) -> Self {
        Self {
            store,
            keys,
            ttl: CACHE_TTL,
        }
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(&self, ctx: &RequestContext, key: &str) -> Option<T> {
        let raw = match ctx.guard(self.store.get(key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
            Err(_) => return None,
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache payload undecodable, treating as miss");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, ctx: &RequestContext, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache payload unencodable, skipping write");
                return;
            }
        };
        if let Ok(Err(e)) = ctx.guard(self.store.set_ex(key, raw, self.ttl)).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn forget(&self, ctx: &RequestContext, key: &str) {
        if let Ok(Err(e)) = ctx.guard(self.store.delete(key)).await {
            tracing::warn!(key, error = %e, "cache delete failed");
        }
    }

    pub async fn forget_pattern(&self, ctx: &RequestContext, pattern: &str) {
        match ctx.guard(self.store.delete_pattern(pattern)).await {
            Ok(Ok(removed)) => tracing::debug!(pattern, removed, "cache invalidated"),
            Ok(Err(e)) => tracing::warn!(pattern, error = %e, "cache invalidation failed"),
            Err(_) => tracing::warn!(pattern, "cache invalidation cut short by deadline"),
        }
    }

    /// Drop the id key and every listing family the write may affect.
    pub async fn invalidate(&self, ctx: &RequestContext, write: CacheWrite) {
        if let Some(id) = write.id() {
            self.forget(ctx, &self.keys.id(id)).await;
        }
        for view in write.views() {
            self.forget_pattern(ctx, &self.keys.view_pattern(*view)).await;
        }
    }
}
