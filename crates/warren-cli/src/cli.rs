//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

/// Warren - read-only personal finance tools over MCP
#[derive(Parser)]
#[command(name = "warren")]
#[command(about = "Personal finance query tools over MCP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides WARREN_DATABASE / DATABASE_URL)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server
    Serve {
        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum pooled database connections (overrides WARREN_POOL_MAX)
        #[arg(long)]
        pool_max: Option<u32>,
    },

    /// Run one tool locally and print its JSON response
    Query {
        /// Qualified tool name, e.g. finance.get_spend_summary
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Show the resolved interval for every range name
    Ranges,
}
