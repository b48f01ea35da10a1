//! Warren CLI - read-only personal finance tools over MCP
//!
//! Usage:
//!   warren serve --port 8000                  Start the MCP server
//!   warren query finance.get_spend_summary \
//!       --args '{"range":"this_week"}'        Run one tool locally
//!   warren ranges                             Show resolved range boundaries

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            pool_max,
        } => commands::cmd_serve(&cli.db, host, port, pool_max).await,
        Commands::Query { tool, args } => commands::cmd_query(&cli.db, &tool, &args).await,
        Commands::Ranges => commands::cmd_ranges(),
    }
}
