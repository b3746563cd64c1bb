//! Server settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `mirror.{toml,yaml,json}` in the working directory, then `MIRROR_*`
//! environment variables (`MIRROR_BIND_ADDRESS`, `MIRROR_STORE`, ...).

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_SEED_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub store: StoreBackend,
    pub database_path: String,
    pub seed_base_url: String,
    /// Users kept from the head of the seed listing on each reload
    pub user_limit: usize,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        info!("Loading configuration...");
        let builder = Self::defaults()?
            .add_source(config::File::with_name("mirror").required(false))
            .add_source(config::Environment::with_prefix("MIRROR"));

        Self::from_builder(builder)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("store", "sqlite")?
            .set_default("database_path", "data/mirror.db")?
            .set_default("seed_base_url", DEFAULT_SEED_BASE_URL)?
            .set_default("user_limit", 10)?)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_builder(ServerConfig::defaults().unwrap()).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.seed_base_url, DEFAULT_SEED_BASE_URL);
        assert_eq!(config.user_limit, 10);
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let builder = ServerConfig::defaults()
            .unwrap()
            .set_override("store", "memory")
            .unwrap()
            .set_override("user_limit", 3)
            .unwrap();
        let config = ServerConfig::from_builder(builder).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.user_limit, 3);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let builder = ServerConfig::defaults()
            .unwrap()
            .set_override("store", "mongodb")
            .unwrap();
        assert!(ServerConfig::from_builder(builder).is_err());
    }
}
