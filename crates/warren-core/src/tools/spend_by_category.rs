//! finance.get_spend_by_category

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{date_params, parse_range, sort_by_total_desc, ToolResponse, SPEND_BY_CATEGORY_TOOL};
use crate::db::StoreGateway;
use crate::error::Result;
use crate::time_range::{now_in_zone, resolve_at, TimeRange};

const SPEND_BY_CATEGORY_SQL: &str = r#"
    SELECT
        category_code,
        category_name,
        COALESCE(SUM(spend_total_rp), 0) AS spend_total_rp,
        COALESCE(SUM(tx_count), 0) AS tx_count
    FROM v_spend_by_category_daily
    WHERE date >= ?1 AND date <= ?2
    GROUP BY category_code, category_name
    ORDER BY spend_total_rp DESC
"#;

/// Ranges this tool accepts
pub const SPEND_BY_CATEGORY_RANGES: [TimeRange; 3] =
    [TimeRange::Today, TimeRange::ThisWeek, TimeRange::ThisMonth];

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SpendByCategoryParams {
    #[schemars(description = "Time range: today, this_week, this_month")]
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CategorySpendItem {
    pub category_code: String,
    /// Human-readable category name
    pub category_name: String,
    /// Total spend in Rupiah
    pub spend_total_rp: f64,
    pub tx_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpendByCategoryOutput {
    pub range: String,
    /// Spend breakdown by category, largest first
    pub items: Vec<CategorySpendItem>,
}

pub async fn get_spend_by_category(
    store: &dyn StoreGateway,
    params: SpendByCategoryParams,
) -> ToolResponse<SpendByCategoryOutput> {
    get_spend_by_category_at(store, params, now_in_zone()).await
}

pub async fn get_spend_by_category_at(
    store: &dyn StoreGateway,
    params: SpendByCategoryParams,
    now: DateTime<FixedOffset>,
) -> ToolResponse<SpendByCategoryOutput> {
    let result = fetch_spend_by_category(store, &params, now).await;
    ToolResponse::from_result(SPEND_BY_CATEGORY_TOOL, "spend by category", result)
}

async fn fetch_spend_by_category(
    store: &dyn StoreGateway,
    params: &SpendByCategoryParams,
    now: DateTime<FixedOffset>,
) -> Result<SpendByCategoryOutput> {
    let range = parse_range(&params.range, &SPEND_BY_CATEGORY_RANGES)?;
    let interval = resolve_at(range, now);
    debug!(tool = SPEND_BY_CATEGORY_TOOL, %range, "Running tool");

    let rows = store
        .fetch_all(SPEND_BY_CATEGORY_SQL, &date_params(&interval))
        .await?;

    let mut items = rows
        .iter()
        .map(|row| {
            Ok(CategorySpendItem {
                category_code: row.string("category_code")?,
                category_name: row.string("category_name")?,
                spend_total_rp: row.f64_or_zero("spend_total_rp")?,
                tx_count: row.i64_or_zero("tx_count")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    sort_by_total_desc(&mut items, |item| item.spend_total_rp);

    Ok(SpendByCategoryOutput {
        range: range.to_string(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{category_row, MockStore};
    use crate::tools::ErrorCode;
    use chrono::TimeZone;
    use rusqlite::types::Value;

    fn params(range: &str) -> SpendByCategoryParams {
        SpendByCategoryParams {
            range: range.to_string(),
        }
    }

    fn now() -> DateTime<FixedOffset> {
        crate::time_range::zone()
            .with_ymd_and_hms(2026, 10, 21, 9, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_items_sorted_by_total_desc() {
        let store = MockStore::with_rows(vec![
            category_row("A", "Food", 500.0, 2),
            category_row("B", "Transport", 1500.0, 1),
        ]);
        let response = get_spend_by_category_at(&store, params("today"), now()).await;
        let output = response.success().unwrap();
        assert_eq!(output.range, "today");
        let codes: Vec<_> = output.items.iter().map(|i| i.category_code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
        assert_eq!(output.items[0].category_name, "Transport");
        assert_eq!(output.items[1].tx_count, 2);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let store = MockStore::new();
        let response = get_spend_by_category_at(&store, params("this_month"), now()).await;
        let output = response.success().unwrap();
        assert!(output.items.is_empty());
        assert_eq!(
            store.calls()[0].1,
            vec![Value::Text("2026-10-01".into()), Value::Text("2026-10-21".into())]
        );
    }

    #[tokio::test]
    async fn test_this_week_bounds() {
        let store = MockStore::new();
        get_spend_by_category_at(&store, params("this_week"), now()).await;
        let (sql, bound) = &store.calls()[0];
        assert!(sql.contains("v_spend_by_category_daily"));
        assert_eq!(
            bound,
            &vec![Value::Text("2026-10-19".into()), Value::Text("2026-10-21".into())]
        );
    }

    #[tokio::test]
    async fn test_rejects_summary_only_ranges() {
        let store = MockStore::new();
        for range in ["yesterday", "last_week"] {
            let response = get_spend_by_category_at(&store, params(range), now()).await;
            let error = response.failure().unwrap();
            assert_eq!(error.code, ErrorCode::InvalidInput);
            assert!(error.message.contains(range));
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_column_is_internal_error() {
        let store = MockStore::with_rows(vec![crate::db::Row::from_pairs([(
            "category_code",
            Value::Text("A".into()),
        )])]);
        let response = get_spend_by_category_at(&store, params("today"), now()).await;
        let error = response.failure().unwrap();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(error.message.starts_with("Failed to fetch spend by category:"));
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = MockStore::failing("disk I/O error");
        let response = get_spend_by_category(&store, params("today")).await;
        assert_eq!(response.failure().unwrap().code, ErrorCode::InternalError);
    }
}
