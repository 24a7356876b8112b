use shop_core::config::{ServicePorts, required};

/// Product service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ProductConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// `GRPC_PRODUCT_PORT` (default 50054) and `HTTP_PRODUCT_PORT` (default 8084).
    pub ports: ServicePorts,
}

impl ProductConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            ports: ServicePorts::from_env("product", 50054, 8084),
        })
    }
}
