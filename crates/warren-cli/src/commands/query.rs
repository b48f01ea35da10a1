//! Query command: run one tool without the HTTP layer

use anyhow::{Context, Result};
use tracing::debug;
use warren_core::{call_tool, StoreGateway};

use super::{load_config, open_db, ConfigOverrides};

pub async fn cmd_query(db: &Option<String>, tool: &str, args: &str) -> Result<()> {
    let config = load_config(ConfigOverrides {
        db: db.clone(),
        ..Default::default()
    })?;
    let database = open_db(&config)?;

    let response = run_query(&database, tool, args).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Parse the argument JSON and dispatch to the named tool
///
/// Tool failures come back inside the response; only malformed JSON
/// on the command line is an error here.
pub async fn run_query(
    store: &dyn StoreGateway,
    tool: &str,
    args: &str,
) -> Result<serde_json::Value> {
    let args: serde_json::Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;
    debug!(tool, "Running tool from the command line");
    Ok(call_tool(store, tool, args).await)
}
