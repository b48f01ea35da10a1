//! Finance query tools
//!
//! Four read-only tools, each registered under a qualified name:
//!
//! - `finance.get_spend_summary` - total spend and count for a range
//! - `finance.get_spend_by_category` - per-category breakdown for a range
//! - `finance.get_spend_by_merchant` - top merchants for a range
//! - `finance.get_recent_transactions` - latest transactions
//!
//! Every tool follows the same shape: validate the arguments, resolve the
//! range, issue one parameterized query through the [`StoreGateway`], and
//! map the rows into an output record. Failures never escape as faults;
//! they come back as an [`ErrorEnvelope`] inside the response.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use rusqlite::types::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::db::StoreGateway;
use crate::error::{Error, Result};
use crate::time_range::{now_in_zone, ResolvedInterval, TimeRange};

mod recent_transactions;
mod spend_by_category;
mod spend_by_merchant;
mod spend_summary;

pub use recent_transactions::*;
pub use spend_by_category::*;
pub use spend_by_merchant::*;
pub use spend_summary::*;

pub const SPEND_SUMMARY_TOOL: &str = "finance.get_spend_summary";
pub const SPEND_BY_CATEGORY_TOOL: &str = "finance.get_spend_by_category";
pub const SPEND_BY_MERCHANT_TOOL: &str = "finance.get_spend_by_merchant";
pub const RECENT_TRANSACTIONS_TOOL: &str = "finance.get_recent_transactions";

/// Default number of rows for the limited tools
pub const DEFAULT_LIMIT: i64 = 5;

/// Qualified names of every registered tool
pub fn tool_names() -> [&'static str; 4] {
    [
        SPEND_SUMMARY_TOOL,
        SPEND_BY_CATEGORY_TOOL,
        SPEND_BY_MERCHANT_TOOL,
        RECENT_TRANSACTIONS_TOOL,
    ]
}

// =============================================================================
// Response envelope
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
}

/// `{ "error": { "code": ..., "message": ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ToolError,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ToolError {
                code,
                message: message.into(),
            },
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Classify an error raised while serving `tool`
    ///
    /// Caller mistakes keep their own message. Everything else is reported
    /// as "Failed to fetch <subject>: <cause>".
    pub fn from_error(tool: &str, subject: &str, err: &Error) -> Self {
        if err.is_invalid_input() {
            warn!(tool, error = %err, "Rejected tool input");
            Self::invalid_input(err.to_string())
        } else {
            error!(tool, error = %err, "Tool failed");
            Self::internal(format!("Failed to fetch {}: {}", subject, err))
        }
    }
}

/// Either a tool's output record or an error envelope
///
/// Serializes untagged, so callers see the bare record on success and
/// `{ "error": ... }` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse<T> {
    Success(T),
    Failure(ErrorEnvelope),
}

impl<T: Serialize> ToolResponse<T> {
    pub(crate) fn from_result(tool: &str, subject: &str, result: Result<T>) -> Self {
        match result {
            Ok(output) => ToolResponse::Success(output),
            Err(e) => ToolResponse::Failure(ErrorEnvelope::from_error(tool, subject, &e)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            ToolResponse::Success(output) => Some(output),
            ToolResponse::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolError> {
        match self {
            ToolResponse::Success(_) => None,
            ToolResponse::Failure(envelope) => Some(&envelope.error),
        }
    }

    /// Render as JSON, falling back to an internal error envelope if the
    /// output cannot be serialized
    pub fn into_json(self) -> serde_json::Value {
        serde_json::to_value(&self).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize tool response");
            serde_json::json!({
                "error": {
                    "code": ErrorCode::InternalError,
                    "message": format!("Failed to serialize response: {}", e),
                }
            })
        })
    }
}

// =============================================================================
// Shared validation and mapping helpers
// =============================================================================

/// Parse a range name and check it is one the tool accepts
pub(crate) fn parse_range(raw: &str, accepted: &[TimeRange]) -> Result<TimeRange> {
    let range = raw.parse::<TimeRange>()?;
    if accepted.contains(&range) {
        return Ok(range);
    }
    let options = accepted
        .iter()
        .map(TimeRange::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::InvalidInput(format!(
        "Unsupported time range: {}. Use one of: {}",
        raw, options
    )))
}

/// Requested limit, or [`DEFAULT_LIMIT`] when absent
///
/// The value is bound as given; zero yields no rows.
pub(crate) fn effective_limit(limit: Option<i64>) -> Result<i64> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if n >= 0 => Ok(n),
        Some(n) => Err(Error::InvalidInput(format!(
            "Invalid limit: {}. Must be zero or greater",
            n
        ))),
    }
}

/// Inclusive date bounds of an interval as query parameters
///
/// The aggregate views are keyed by calendar day, so sub-day precision on
/// either end is dropped here.
pub(crate) fn date_params(interval: &ResolvedInterval) -> [Value; 2] {
    [
        Value::Text(interval.start_date().format("%Y-%m-%d").to_string()),
        Value::Text(interval.end_date().format("%Y-%m-%d").to_string()),
    ]
}

/// Stable sort, largest total first
pub(crate) fn sort_by_total_desc<T>(items: &mut [T], total: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| total(b).partial_cmp(&total(a)).unwrap_or(Ordering::Equal));
}

// =============================================================================
// Dispatch by qualified name
// =============================================================================

fn parse_args<P: DeserializeOwned>(args: serde_json::Value) -> Result<P> {
    let args = if args.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidInput(format!("Invalid arguments: {}", e)))
}

/// Invoke a tool by its qualified name with JSON arguments
pub async fn call_tool(
    store: &dyn StoreGateway,
    name: &str,
    args: serde_json::Value,
) -> serde_json::Value {
    call_tool_at(store, name, args, now_in_zone()).await
}

/// [`call_tool`] against an explicit instant
pub async fn call_tool_at(
    store: &dyn StoreGateway,
    name: &str,
    args: serde_json::Value,
    now: DateTime<FixedOffset>,
) -> serde_json::Value {
    let rejected = |err: Error| {
        serde_json::to_value(ErrorEnvelope::from_error(name, "arguments", &err))
            .unwrap_or(serde_json::Value::Null)
    };

    match name {
        SPEND_SUMMARY_TOOL => match parse_args(args) {
            Ok(params) => get_spend_summary_at(store, params, now).await.into_json(),
            Err(e) => rejected(e),
        },
        SPEND_BY_CATEGORY_TOOL => match parse_args(args) {
            Ok(params) => get_spend_by_category_at(store, params, now).await.into_json(),
            Err(e) => rejected(e),
        },
        SPEND_BY_MERCHANT_TOOL => match parse_args(args) {
            Ok(params) => get_spend_by_merchant_at(store, params, now).await.into_json(),
            Err(e) => rejected(e),
        },
        RECENT_TRANSACTIONS_TOOL => match parse_args(args) {
            Ok(params) => get_recent_transactions(store, params).await.into_json(),
            Err(e) => rejected(e),
        },
        _ => rejected(Error::InvalidInput(format!(
            "Unknown tool: {}. Available: {}",
            name,
            tool_names().join(", ")
        ))),
    }
}
