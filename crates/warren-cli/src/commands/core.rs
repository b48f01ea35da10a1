//! Shared command utilities

use anyhow::{Context, Result};
use warren_core::config::{DATABASE_ENV, HOST_ENV, POOL_MAX_ENV, PORT_ENV};
use warren_core::{Config, Database};

/// Command-line values that take precedence over the environment
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub db: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub pool_max: Option<u32>,
}

/// Load configuration from `.env` and the environment, applying flag overrides
pub fn load_config(overrides: ConfigOverrides) -> Result<Config> {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(db) = overrides.db {
        pairs.push((DATABASE_ENV, db));
    }
    if let Some(host) = overrides.host {
        pairs.push((HOST_ENV, host));
    }
    if let Some(port) = overrides.port {
        pairs.push((PORT_ENV, port.to_string()));
    }
    if let Some(pool_max) = overrides.pool_max {
        pairs.push((POOL_MAX_ENV, pool_max.to_string()));
    }

    Config::from_env_with_overrides(pairs).context("Failed to load configuration")
}

/// Open the pooled store described by a config
pub fn open_db(config: &Config) -> Result<Database> {
    Database::connect(config)
        .with_context(|| format!("Failed to open database at {}", config.database_path))
}
