//! Runtime configuration loaded from the environment
//!
//! A `.env` file in the working directory is read first, if present.
//! Values already set in the process environment take precedence.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{Error, Result};

/// Environment variable naming the store location (preferred)
pub const DATABASE_ENV: &str = "WARREN_DATABASE";
/// Fallback store location variable
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const POOL_MAX_ENV: &str = "WARREN_POOL_MAX";
pub const POOL_MIN_IDLE_ENV: &str = "WARREN_POOL_MIN_IDLE";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_POOL_MAX: u32 = 10;
pub const DEFAULT_POOL_MIN_IDLE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite store
    pub database_path: String,
    pub host: String,
    pub port: u16,
    /// Upper bound on pooled connections, fixed for the process lifetime
    pub pool_max_size: u32,
    pub pool_min_idle: u32,
    /// Open connections with SQLITE_OPEN_READ_ONLY
    pub read_only: bool,
}

impl Config {
    /// Load from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_overrides(std::iter::empty::<(&str, String)>())
    }

    /// Load from `.env` and the process environment, then apply explicit
    /// overrides (e.g. command-line flags) on top
    pub fn from_env_with_overrides<'a, I>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        if let Err(e) = dotenv_outcome(dotenvy::dotenv()) {
            warn!(error = %e, "Ignoring unreadable .env file");
        }
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        vars.extend(overrides.into_iter().map(|(k, v)| (k.to_string(), v)));
        Self::from_vars(&vars)
    }

    /// Build a config from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let raw_db = lookup(DATABASE_ENV)
            .or_else(|| lookup(DATABASE_URL_ENV))
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} (or {}) environment variable is required",
                    DATABASE_ENV, DATABASE_URL_ENV
                ))
            })?;

        let port = match lookup(PORT_ENV) {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid {}: {}", PORT_ENV, p)))?,
            None => DEFAULT_PORT,
        };

        let pool_max_size = parse_count(lookup(POOL_MAX_ENV), POOL_MAX_ENV, DEFAULT_POOL_MAX)?;
        let pool_min_idle =
            parse_count(lookup(POOL_MIN_IDLE_ENV), POOL_MIN_IDLE_ENV, DEFAULT_POOL_MIN_IDLE)?;

        Ok(Self {
            database_path: database_path_from_url(raw_db),
            host: lookup(HOST_ENV).unwrap_or(DEFAULT_HOST).to_string(),
            port,
            pool_max_size,
            pool_min_idle: pool_min_idle.min(pool_max_size),
            read_only: true,
        })
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A missing `.env` file is normal; anything else is worth reporting
fn dotenv_outcome<T>(result: dotenvy::Result<T>) -> std::result::Result<(), dotenvy::Error> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

fn parse_count(raw: Option<&str>, key: &str, default: u32) -> Result<u32> {
    match raw {
        None => Ok(default),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Error::Config(format!(
                "Invalid {}: {} (expected a positive integer)",
                key, v
            ))),
        },
    }
}

/// Strip a `sqlite://` or `sqlite:` scheme so URL-style values work as paths
fn database_path_from_url(raw: &str) -> String {
    raw.strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&vars(&[(DATABASE_ENV, "/data/warren.db")])).unwrap();
        assert_eq!(config.database_path, "/data/warren.db");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.pool_max_size, 10);
        assert_eq!(config.pool_min_idle, 2);
        assert!(config.read_only);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_database_is_required() {
        let err = Config::from_vars(&vars(&[(HOST_ENV, "127.0.0.1")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(DATABASE_ENV));
    }

    #[test]
    fn test_blank_database_is_missing() {
        assert!(Config::from_vars(&vars(&[(DATABASE_ENV, "  ")])).is_err());
    }

    #[test]
    fn test_database_url_fallback_and_scheme() {
        let config =
            Config::from_vars(&vars(&[(DATABASE_URL_ENV, "sqlite:///var/lib/warren.db")])).unwrap();
        assert_eq!(config.database_path, "/var/lib/warren.db");

        let config = Config::from_vars(&vars(&[
            (DATABASE_ENV, "primary.db"),
            (DATABASE_URL_ENV, "sqlite:secondary.db"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, "primary.db");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(&vars(&[
            (DATABASE_ENV, "w.db"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9100"),
            (POOL_MAX_ENV, "4"),
            (POOL_MIN_IDLE_ENV, "8"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert_eq!(config.pool_max_size, 4);
        // min idle never exceeds the pool bound
        assert_eq!(config.pool_min_idle, 4);
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let config = Config::from_env_with_overrides([
            (DATABASE_ENV, "/tmp/override.db".to_string()),
            (PORT_ENV, "9200".to_string()),
        ])
        .unwrap();
        assert_eq!(config.database_path, "/tmp/override.db");
        assert_eq!(config.port, 9200);
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(dotenv_outcome(result).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this is not valid\n").unwrap();
        let err = dotenv_outcome(dotenvy::from_path(&path)).unwrap_err();
        assert!(!err.not_found());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(Config::from_vars(&vars(&[(DATABASE_ENV, "w.db"), (PORT_ENV, "http")])).is_err());
        assert!(Config::from_vars(&vars(&[(DATABASE_ENV, "w.db"), (POOL_MAX_ENV, "0")])).is_err());
        assert!(Config::from_vars(&vars(&[(DATABASE_ENV, "w.db"), (POOL_MAX_ENV, "-3")])).is_err());
    }
}
