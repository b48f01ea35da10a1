//! Warren Core Library
//!
//! Read-only personal finance queries for the Warren MCP server:
//! - Time range resolution in the fixed Asia/Jakarta zone
//! - Pooled, parameterized access to the transaction store
//! - The four finance tools and their response envelope
//! - Environment configuration

pub mod config;
pub mod db;
pub mod error;
pub mod time_range;
pub mod tools;

/// Test utilities: mock store gateway and SQLite view fixture
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use db::{Database, Row, StoreGateway};
pub use error::{Error, Result};
pub use time_range::{resolve, resolve_at, ResolvedInterval, TimeRange};
pub use tools::{call_tool, tool_names, ErrorCode, ErrorEnvelope, ToolResponse};
