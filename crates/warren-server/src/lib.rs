//! Warren Web Server
//!
//! Axum host for the Warren MCP endpoint.
//!
//! Routes:
//! - `/mcp` - MCP over streamable HTTP, stateless (each request stands alone)
//! - `/health` - liveness probe
//!
//! Concurrency is bounded by the store's connection pool; there are no
//! request timeouts or additional backpressure layers.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use warren_core::db::StoreGateway;

pub mod mcp;


pub use mcp::WarrenMcpServer;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router around a store
pub fn create_router(store: Arc<dyn StoreGateway>) -> Router {
    use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
    use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};

    let service = StreamableHttpService::new(
        move || Ok(WarrenMcpServer::new(Arc::clone(&store))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http())
}

/// Serve the MCP endpoint until Ctrl+C
pub async fn start_mcp_server(
    store: Arc<dyn StoreGateway>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    info!("Starting MCP server at http://{}:{}/mcp", host, port);

    let router = create_router(store);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("MCP server ready at http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            // Wait for shutdown signal
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down MCP server");
        })
        .await?;

    Ok(())
}
