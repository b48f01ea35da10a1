//! Error types for Warren

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Row mapping error: {0}")]
    RowMapping(String),
}

impl Error {
    /// Whether this error was caused by the caller's arguments rather than
    /// by the store or the mapping layer
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidRange(_) | Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
