use shop_core::config::{ServicePorts, flag, required};

/// Role service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RoleConfig {
    pub database_url: String,
    /// `GRPC_ROLE_PORT` (default 50052) and `HTTP_ROLE_PORT` (default 8082).
    pub ports: ServicePorts,
    /// `DB_SEEDER`: create the default roles on startup.
    pub seed: bool,
}

impl RoleConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            ports: ServicePorts::from_env("role", 50052, 8082),
            seed: flag("DB_SEEDER"),
        })
    }
}
