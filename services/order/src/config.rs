use shop_core::config::{ServicePorts, grpc_addr, required};

/// Order service configuration loaded from environment variables.
#[derive(Debug)]
pub struct OrderConfig {
    pub database_url: String,
    /// `GRPC_ORDER_PORT` (default 50053) and `HTTP_ORDER_PORT` (default 8083).
    pub ports: ServicePorts,
    /// `GRPC_USER_ADDR`. Unset makes every user check fail as unavailable.
    pub user_addr: Option<String>,
    /// `GRPC_PRODUCT_ADDR`.
    pub product_addr: Option<String>,
}

impl OrderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            ports: ServicePorts::from_env("order", 50053, 8083),
            user_addr: grpc_addr("user"),
            product_addr: grpc_addr("product"),
        })
    }
}
