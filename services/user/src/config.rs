use shop_core::config::{ServicePorts, grpc_addr, required};

use crate::domain::types::DEFAULT_USER_ROLE;

/// User service configuration loaded from environment variables.
#[derive(Debug)]
pub struct UserConfig {
    pub database_url: String,
    /// `GRPC_USER_PORT` (default 50051) and `HTTP_USER_PORT` (default 8081).
    pub ports: ServicePorts,
    /// `GRPC_ROLE_ADDR`. Unset disables the role client.
    pub role_addr: Option<String>,
    /// `DEFAULT_USER_ROLE`, assigned to every new account.
    pub default_role: String,
}

impl UserConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_role = std::env::var("DEFAULT_USER_ROLE")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ROLE.to_owned());
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            ports: ServicePorts::from_env("user", 50051, 8081),
            role_addr: grpc_addr("role"),
            default_role,
        })
    }
}
