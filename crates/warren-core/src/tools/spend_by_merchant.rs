//! finance.get_spend_by_merchant

use chrono::{DateTime, FixedOffset};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    date_params, effective_limit, parse_range, sort_by_total_desc, ToolResponse,
    SPEND_BY_MERCHANT_TOOL,
};
use crate::db::StoreGateway;
use crate::error::Result;
use crate::time_range::{now_in_zone, resolve_at, TimeRange};

const SPEND_BY_MERCHANT_SQL: &str = r#"
    SELECT
        merchant,
        COALESCE(SUM(spend_total_rp), 0) AS spend_total_rp,
        COALESCE(SUM(tx_count), 0) AS tx_count
    FROM v_spend_by_merchant_daily
    WHERE date >= ?1 AND date <= ?2
    GROUP BY merchant
    ORDER BY spend_total_rp DESC
    LIMIT ?3
"#;

/// Ranges this tool accepts
pub const SPEND_BY_MERCHANT_RANGES: [TimeRange; 3] =
    [TimeRange::Today, TimeRange::ThisWeek, TimeRange::ThisMonth];

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SpendByMerchantParams {
    #[schemars(description = "Time range: today, this_week, this_month")]
    pub range: String,

    /// Maximum number of merchants to return (default 5)
    #[serde(default)]
    #[schemars(description = "Maximum number of merchants to return (default 5)")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MerchantSpendItem {
    pub merchant: String,
    pub spend_total_rp: f64,
    pub tx_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpendByMerchantOutput {
    pub range: String,
    /// Top merchants by spend
    pub items: Vec<MerchantSpendItem>,
}

pub async fn get_spend_by_merchant(
    store: &dyn StoreGateway,
    params: SpendByMerchantParams,
) -> ToolResponse<SpendByMerchantOutput> {
    get_spend_by_merchant_at(store, params, now_in_zone()).await
}

pub async fn get_spend_by_merchant_at(
    store: &dyn StoreGateway,
    params: SpendByMerchantParams,
    now: DateTime<FixedOffset>,
) -> ToolResponse<SpendByMerchantOutput> {
    let result = fetch_spend_by_merchant(store, &params, now).await;
    ToolResponse::from_result(SPEND_BY_MERCHANT_TOOL, "spend by merchant", result)
}

async fn fetch_spend_by_merchant(
    store: &dyn StoreGateway,
    params: &SpendByMerchantParams,
    now: DateTime<FixedOffset>,
) -> Result<SpendByMerchantOutput> {
    let range = parse_range(&params.range, &SPEND_BY_MERCHANT_RANGES)?;
    let limit = effective_limit(params.limit)?;
    let interval = resolve_at(range, now);
    debug!(tool = SPEND_BY_MERCHANT_TOOL, %range, limit, "Running tool");

    let [from, to] = date_params(&interval);
    let rows = store
        .fetch_all(SPEND_BY_MERCHANT_SQL, &[from, to, Value::Integer(limit)])
        .await?;

    let mut items = rows
        .iter()
        .map(|row| {
            Ok(MerchantSpendItem {
                merchant: row.string("merchant")?,
                spend_total_rp: row.f64_or_zero("spend_total_rp")?,
                tx_count: row.i64_or_zero("tx_count")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    sort_by_total_desc(&mut items, |item| item.spend_total_rp);
    items.truncate(limit as usize);

    Ok(SpendByMerchantOutput {
        range: range.to_string(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{merchant_row, MockStore};
    use crate::tools::{ErrorCode, DEFAULT_LIMIT};
    use chrono::TimeZone;

    fn params(range: &str, limit: Option<i64>) -> SpendByMerchantParams {
        SpendByMerchantParams {
            range: range.to_string(),
            limit,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        crate::time_range::zone()
            .with_ymd_and_hms(2026, 10, 21, 20, 45, 0)
            .unwrap()
    }

    fn five_merchants() -> MockStore {
        MockStore::with_rows(vec![
            merchant_row("Indomaret", 120_000.0, 4),
            merchant_row("Grab", 310_000.0, 9),
            merchant_row("Kopi Kenangan", 45_000.0, 2),
            merchant_row("Tokopedia", 980_000.0, 1),
            merchant_row("Alfamart", 75_500.0, 3),
        ])
    }

    #[tokio::test]
    async fn test_limit_caps_to_top_totals() {
        let store = five_merchants();
        let response = get_spend_by_merchant_at(&store, params("this_month", Some(3)), now()).await;
        let output = response.success().unwrap();
        let names: Vec<_> = output.items.iter().map(|i| i.merchant.as_str()).collect();
        assert_eq!(names, vec!["Tokopedia", "Grab", "Indomaret"]);
        assert_eq!(store.calls()[0].1[2], Value::Integer(3));
    }

    #[tokio::test]
    async fn test_default_limit() {
        let store = five_merchants();
        let response = get_spend_by_merchant_at(&store, params("today", None), now()).await;
        let output = response.success().unwrap();
        assert_eq!(output.items.len(), 5);
        assert_eq!(store.calls()[0].1[2], Value::Integer(DEFAULT_LIMIT));
    }

    #[tokio::test]
    async fn test_binds_dates_and_limit_positionally() {
        let store = MockStore::new();
        get_spend_by_merchant_at(&store, params("this_week", Some(2)), now()).await;
        let (sql, bound) = &store.calls()[0];
        assert!(sql.contains("LIMIT ?3"));
        assert_eq!(
            bound,
            &vec![
                Value::Text("2026-10-19".into()),
                Value::Text("2026-10-21".into()),
                Value::Integer(2),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_limit_returns_no_items() {
        let store = MockStore::with_rows(vec![
            merchant_row("Grab", 310_000.0, 9),
            merchant_row("Indomaret", 120_000.0, 4),
        ]);
        let response = get_spend_by_merchant_at(&store, params("today", Some(0)), now()).await;
        assert!(response.success().unwrap().items.is_empty());
        assert_eq!(store.calls()[0].1[2], Value::Integer(0));
    }

    #[tokio::test]
    async fn test_large_limit_is_bound_as_given() {
        let store = five_merchants();
        let response = get_spend_by_merchant_at(&store, params("this_month", Some(250)), now()).await;
        assert_eq!(response.success().unwrap().items.len(), 5);
        assert_eq!(store.calls()[0].1[2], Value::Integer(250));
    }

    #[tokio::test]
    async fn test_negative_limit_is_invalid_input() {
        let store = five_merchants();
        let response = get_spend_by_merchant_at(&store, params("today", Some(-1)), now()).await;
        assert_eq!(response.failure().unwrap().code, ErrorCode::InvalidInput);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_unsupported_range() {
        let store = MockStore::new();
        let response = get_spend_by_merchant_at(&store, params("last_week", None), now()).await;
        assert_eq!(response.failure().unwrap().code, ErrorCode::InvalidInput);

        let response = get_spend_by_merchant_at(&store, params("someday", None), now()).await;
        assert_eq!(
            response.failure().unwrap().message,
            "Invalid time range: someday"
        );
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = MockStore::failing("no such table: v_spend_by_merchant_daily");
        let response = get_spend_by_merchant(&store, params("today", None)).await;
        let error = response.failure().unwrap();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(error.message.contains("no such table"));
    }
}
