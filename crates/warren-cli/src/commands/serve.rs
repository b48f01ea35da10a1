//! Serve command

use std::sync::Arc;

use anyhow::Result;

use super::{load_config, open_db, ConfigOverrides};

pub async fn cmd_serve(
    db: &Option<String>,
    host: Option<String>,
    port: Option<u16>,
    pool_max: Option<u32>,
) -> Result<()> {
    let config = load_config(ConfigOverrides {
        db: db.clone(),
        host,
        port,
        pool_max,
    })?;
    let database = open_db(&config)?;

    println!("🚀 Starting Warren Finance MCP server...");
    println!("   Database: {}", database.path());
    println!(
        "   Pool: {} connections ({} idle minimum)",
        database.max_connections(),
        config.pool_min_idle
    );
    println!("   MCP endpoint: http://{}/mcp", config.bind_addr());
    if !config.read_only {
        println!("   ⚠️  Store opened read-write");
    }
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    warren_server::start_mcp_server(Arc::new(database), &config.host, config.port).await
}
