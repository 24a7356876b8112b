//! Environment helpers behind each service's `{Service}Config::from_env()`.
//!
//! Keys are suffixed with the entity they belong to, e.g. `GRPC_ORDER_PORT`,
//! `REDIS_HOST_PRODUCT`. A local `.env` file is honoured when present.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context as _, bail};
use deadpool_redis::{PoolConfig, Timeouts};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::cache::RedisCache;

/// Bound on dialing or waiting for a Redis connection. A cache that cannot
/// answer within it is treated as a miss.
pub const REDIS_TIMEOUT: Duration = Duration::from_secs(2);

pub const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Load `.env` from the working directory, if any.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

pub fn required(key: &str) -> anyhow::Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{key} must be set"),
    }
}

/// Parse `key`, falling back to `default` when unset or unparsable.
pub fn var_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `true` for `1`, `true`, `yes` (any case).
pub fn flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// `GRPC_{ENTITY}_ADDR`, normalised to a URI tonic can dial.
pub fn grpc_addr(entity: &str) -> Option<String> {
    let raw = std::env::var(format!("GRPC_{}_ADDR", entity.to_ascii_uppercase())).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(raw.to_owned())
    } else {
        Some(format!("http://{raw}"))
    }
}

/// gRPC and probe ports for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePorts {
    pub grpc: u16,
    pub http: u16,
}

impl ServicePorts {
    pub fn from_env(entity: &str, default_grpc: u16, default_http: u16) -> Self {
        let upper = entity.to_ascii_uppercase();
        Self {
            grpc: var_or(&format!("GRPC_{upper}_PORT"), default_grpc),
            http: var_or(&format!("HTTP_{upper}_PORT"), default_http),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl RedisSettings {
    /// `None` when `REDIS_HOST_{ENTITY}` is unset; the service then runs uncached.
    pub fn from_env(entity: &str) -> Option<Self> {
        let upper = entity.to_ascii_uppercase();
        let host = std::env::var(format!("REDIS_HOST_{upper}")).ok()?;
        if host.trim().is_empty() {
            return None;
        }
        Some(Self {
            host: host.trim().to_owned(),
            port: var_or(&format!("REDIS_PORT_{upper}"), 6379),
            password: std::env::var(format!("REDIS_PASSWORD_{upper}"))
                .ok()
                .filter(|p| !p.is_empty()),
            db: var_or(&format!("REDIS_DB_{upper}"), 0),
        })
    }

    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{password}@{}:{}/{}",
                self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    pub fn connect(&self) -> anyhow::Result<RedisCache> {
        let mut config = deadpool_redis::Config::from_url(self.url());
        config.pool = Some(redis_pool_config());
        let pool = config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .context("create Redis pool")?;
        Ok(RedisCache::new(pool))
    }
}

fn redis_pool_config() -> PoolConfig {
    PoolConfig {
        timeouts: Timeouts {
            wait: Some(REDIS_TIMEOUT),
            create: Some(REDIS_TIMEOUT),
            recycle: Some(REDIS_TIMEOUT),
        },
        ..PoolConfig::default()
    }
}

fn db_options(url: &str) -> ConnectOptions {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .connect_timeout(DB_CONNECT_TIMEOUT)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT);
    options
}

/// Open the Postgres pool with bounded connect and acquire waits.
pub async fn connect_database(url: &str) -> anyhow::Result<DatabaseConnection> {
    Database::connect(db_options(url))
        .await
        .context("failed to connect to database")
}

/// Build the cache for `entity`, or a disabled one when Redis is not configured.
pub fn cache_from_env(entity: &str) -> anyhow::Result<RedisCache> {
    match RedisSettings::from_env(entity) {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, db = settings.db, "cache enabled");
            settings.connect()
        }
        None => {
            tracing::warn!(entity, "REDIS_HOST_{} not set, running without cache", entity.to_ascii_uppercase());
            Ok(RedisCache::disabled())
        }
    }
}
