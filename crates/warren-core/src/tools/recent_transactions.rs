//! finance.get_recent_transactions

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{effective_limit, ToolResponse, RECENT_TRANSACTIONS_TOOL};
use crate::db::{Row, StoreGateway};
use crate::error::Result;
use crate::time_range::format_stored_datetime;

// `datetime_jakarta` is stored as `YYYY-MM-DD HH:MM:SS` wall-clock text in
// one layout, so text order in the view is time order.
const RECENT_TRANSACTIONS_SQL: &str = r#"
    SELECT
        datetime_jakarta,
        merchant,
        category_code,
        total_rp,
        notes
    FROM v_tx_clean
    ORDER BY datetime_jakarta DESC
    LIMIT ?1
"#;

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct RecentTransactionsParams {
    /// Maximum number of transactions to return (default 5)
    #[serde(default)]
    #[schemars(description = "Maximum number of transactions to return (default 5)")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TransactionItem {
    /// Transaction datetime in Asia/Jakarta, `YYYY-MM-DD HH:MM:SS`
    pub datetime_jakarta: String,
    pub merchant: String,
    pub category_code: String,
    /// Transaction amount in Rupiah
    pub total_rp: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RecentTransactionsOutput {
    /// Most recent first
    pub items: Vec<TransactionItem>,
}

/// Latest transactions, newest first
pub async fn get_recent_transactions(
    store: &dyn StoreGateway,
    params: RecentTransactionsParams,
) -> ToolResponse<RecentTransactionsOutput> {
    let result = fetch_recent_transactions(store, &params).await;
    ToolResponse::from_result(RECENT_TRANSACTIONS_TOOL, "recent transactions", result)
}

async fn fetch_recent_transactions(
    store: &dyn StoreGateway,
    params: &RecentTransactionsParams,
) -> Result<RecentTransactionsOutput> {
    let limit = effective_limit(params.limit)?;
    debug!(tool = RECENT_TRANSACTIONS_TOOL, limit, "Running tool");

    let rows = store
        .fetch_all(RECENT_TRANSACTIONS_SQL, &[Value::Integer(limit)])
        .await?;

    let mut items = rows.iter().map(to_item).collect::<Result<Vec<_>>>()?;
    items.truncate(limit as usize);

    Ok(RecentTransactionsOutput { items })
}

fn to_item(row: &Row) -> Result<TransactionItem> {
    Ok(TransactionItem {
        datetime_jakarta: format_stored_datetime(&row.string("datetime_jakarta")?)?,
        merchant: row.string("merchant")?,
        category_code: row.string("category_code")?,
        total_rp: row.f64_or_zero("total_rp")?,
        notes: row.opt_string("notes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{transaction_row, MockStore};
    use crate::tools::ErrorCode;

    fn params(limit: Option<i64>) -> RecentTransactionsParams {
        RecentTransactionsParams { limit }
    }

    #[tokio::test]
    async fn test_store_order_kept_and_formatted() {
        let store = MockStore::with_rows(vec![
            transaction_row("2026-10-21T01:15:00Z", "Indomaret", "GRC", 52_300.0, Some("weekly groceries")),
            transaction_row("2026-10-20 12:00:00", "Grab", "TRN", 18_000.0, None),
            transaction_row("2026-10-19 07:30:15.500", "Kopi Kenangan", "FNB", 27_000.0, None),
        ]);
        let response = get_recent_transactions(&store, params(Some(5))).await;
        let items = &response.success().unwrap().items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].datetime_jakarta, "2026-10-21 08:15:00");
        assert_eq!(items[0].notes.as_deref(), Some("weekly groceries"));
        assert_eq!(items[1].datetime_jakarta, "2026-10-20 12:00:00");
        assert_eq!(items[2].datetime_jakarta, "2026-10-19 07:30:15");
        assert_eq!(items[2].merchant, "Kopi Kenangan");
    }

    #[tokio::test]
    async fn test_at_most_limit_items() {
        let rows = (1..=8)
            .rev()
            .map(|d| {
                transaction_row(
                    &format!("2026-10-{:02} 10:00:00", d),
                    "Alfamart",
                    "GRC",
                    10_000.0 * d as f64,
                    None,
                )
            })
            .collect();
        let store = MockStore::with_rows(rows);
        let response = get_recent_transactions(&store, params(Some(5))).await;
        let items = &response.success().unwrap().items;
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].datetime_jakarta, "2026-10-08 10:00:00");
        assert_eq!(store.calls()[0].1, vec![Value::Integer(5)]);
    }

    #[tokio::test]
    async fn test_zero_limit_returns_no_items() {
        let store = MockStore::with_rows(vec![transaction_row(
            "2026-10-21 09:00:00",
            "Grab",
            "TRN",
            25_000.0,
            None,
        )]);
        let response = get_recent_transactions(&store, params(Some(0))).await;
        assert!(response.success().unwrap().items.is_empty());
        assert_eq!(store.calls()[0].1, vec![Value::Integer(0)]);
    }

    #[tokio::test]
    async fn test_large_limit_is_bound_as_given() {
        let store = MockStore::new();
        get_recent_transactions(&store, params(Some(250))).await;
        assert_eq!(store.calls()[0].1, vec![Value::Integer(250)]);
    }

    #[tokio::test]
    async fn test_negative_limit_is_invalid_input() {
        let store = MockStore::new();
        let response = get_recent_transactions(&store, params(Some(-3))).await;
        let error = response.failure().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert!(error.message.contains("-3"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_default_limit_and_empty() {
        let store = MockStore::new();
        let response = get_recent_transactions(&store, RecentTransactionsParams::default()).await;
        assert!(response.success().unwrap().items.is_empty());
        let (sql, bound) = &store.calls()[0];
        assert!(sql.contains("v_tx_clean"));
        assert_eq!(bound, &vec![Value::Integer(5)]);
    }

    #[tokio::test]
    async fn test_bad_datetime_is_internal_error() {
        let store = MockStore::with_rows(vec![transaction_row("not a date", "Grab", "TRN", 1.0, None)]);
        let response = get_recent_transactions(&store, params(None)).await;
        let error = response.failure().unwrap();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(error.message.starts_with("Failed to fetch recent transactions:"));
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = MockStore::failing("database is locked");
        let response = get_recent_transactions(&store, params(None)).await;
        assert_eq!(response.failure().unwrap().code, ErrorCode::InternalError);
    }
}
