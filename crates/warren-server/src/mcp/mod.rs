//! MCP (Model Context Protocol) Server for Warren
//!
//! Exposes the finance tools to LLMs. All tools are read-only.
//!
//! # Available Tools
//!
//! - `finance.get_spend_summary` - Total spend and transaction count for a range
//! - `finance.get_spend_by_category` - Spend per category for a range
//! - `finance.get_spend_by_merchant` - Top merchants for a range
//! - `finance.get_recent_transactions` - Latest transactions
//!
//! Every tool answers with a single JSON text item. A failed call is still a
//! successful protocol response; the payload carries
//! `{"error": {"code", "message"}}` instead of the result record.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};

use warren_core::db::StoreGateway;
use warren_core::tools::{
    self, RecentTransactionsParams, SpendByCategoryParams, SpendByMerchantParams,
    SpendSummaryParams,
};

pub const SERVER_NAME: &str = "Warren Finance";

pub const SERVER_INSTRUCTIONS: &str =
    "Personal finance agent. Use tools to query spending data. Never generate SQL.";

/// Warren MCP Server state
#[derive(Clone)]
pub struct WarrenMcpServer {
    /// Shared pool-backed store; no other state is shared between calls
    store: Arc<dyn StoreGateway>,
    /// Tool router for MCP operations
    tool_router: ToolRouter<Self>,
}

impl WarrenMcpServer {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Names of the registered tools, as advertised to clients
    pub fn registered_tools(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }
}

/// Wrap a tool's JSON payload as the single text item of a tool result
fn to_call_result(payload: serde_json::Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(payload.to_string())])
}

#[tool_handler]
impl ServerHandler for WarrenMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some(SERVER_NAME.to_string()),
                website_url: None,
                icons: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

#[tool_router]
impl WarrenMcpServer {
    #[tool(
        name = "finance.get_spend_summary",
        description = "Get total spend and transaction count for a time range. Ranges: today, yesterday, this_week, last_week, this_month."
    )]
    pub(crate) async fn get_spend_summary(
        &self,
        Parameters(params): Parameters<SpendSummaryParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = tools::get_spend_summary(self.store.as_ref(), params).await;
        Ok(to_call_result(response.into_json()))
    }

    #[tool(
        name = "finance.get_spend_by_category",
        description = "Get spend breakdown per category for a time range, largest first. Ranges: today, this_week, this_month."
    )]
    pub(crate) async fn get_spend_by_category(
        &self,
        Parameters(params): Parameters<SpendByCategoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = tools::get_spend_by_category(self.store.as_ref(), params).await;
        Ok(to_call_result(response.into_json()))
    }

    #[tool(
        name = "finance.get_spend_by_merchant",
        description = "Get top merchants by spend for a time range. Ranges: today, this_week, this_month. Optional limit (default 5)."
    )]
    pub(crate) async fn get_spend_by_merchant(
        &self,
        Parameters(params): Parameters<SpendByMerchantParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = tools::get_spend_by_merchant(self.store.as_ref(), params).await;
        Ok(to_call_result(response.into_json()))
    }

    #[tool(
        name = "finance.get_recent_transactions",
        description = "Get the latest transactions, newest first. Optional limit (default 5)."
    )]
    pub(crate) async fn get_recent_transactions(
        &self,
        Parameters(params): Parameters<RecentTransactionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = tools::get_recent_transactions(self.store.as_ref(), params).await;
        Ok(to_call_result(response.into_json()))
    }
}
