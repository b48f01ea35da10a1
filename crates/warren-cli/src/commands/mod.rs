//! CLI command implementations
//!
//! - `core` - shared utilities (config loading, opening the store)
//! - `query` - run a single tool locally
//! - `ranges` - print resolved time-range boundaries
//! - `serve` - MCP server command

pub mod core;
pub mod query;
pub mod ranges;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use query::*;
pub use ranges::*;
pub use serve::*;
