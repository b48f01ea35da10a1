//! finance.get_spend_summary

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{date_params, parse_range, ToolResponse, SPEND_SUMMARY_TOOL};
use crate::db::StoreGateway;
use crate::error::Result;
use crate::time_range::{now_in_zone, resolve_at, TimeRange};

const SPEND_SUMMARY_SQL: &str = r#"
    SELECT
        COALESCE(SUM(spend_total_rp), 0) AS spend_total_rp,
        COALESCE(SUM(tx_count), 0) AS tx_count
    FROM v_spend_daily
    WHERE date_jakarta >= ?1 AND date_jakarta <= ?2
"#;

/// Ranges this tool accepts
pub const SPEND_SUMMARY_RANGES: [TimeRange; 5] = TimeRange::ALL;

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SpendSummaryParams {
    /// Time range for the spend summary
    #[schemars(
        description = "Time range for the spend summary: today, yesterday, this_week, last_week, this_month"
    )]
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpendSummaryOutput {
    /// The time range queried
    pub range: String,
    /// Total spend in Rupiah
    pub spend_total_rp: f64,
    /// Number of transactions
    pub tx_count: i64,
}

/// Total spend and transaction count for a range
pub async fn get_spend_summary(
    store: &dyn StoreGateway,
    params: SpendSummaryParams,
) -> ToolResponse<SpendSummaryOutput> {
    get_spend_summary_at(store, params, now_in_zone()).await
}

/// [`get_spend_summary`] resolved against an explicit instant
pub async fn get_spend_summary_at(
    store: &dyn StoreGateway,
    params: SpendSummaryParams,
    now: DateTime<FixedOffset>,
) -> ToolResponse<SpendSummaryOutput> {
    let result = fetch_spend_summary(store, &params, now).await;
    ToolResponse::from_result(SPEND_SUMMARY_TOOL, "spend summary", result)
}

async fn fetch_spend_summary(
    store: &dyn StoreGateway,
    params: &SpendSummaryParams,
    now: DateTime<FixedOffset>,
) -> Result<SpendSummaryOutput> {
    let range = parse_range(&params.range, &SPEND_SUMMARY_RANGES)?;
    let interval = resolve_at(range, now);
    debug!(tool = SPEND_SUMMARY_TOOL, %range, from = %interval.start_date(), to = %interval.end_date(), "Running tool");

    let row = store.fetch_one(SPEND_SUMMARY_SQL, &date_params(&interval)).await?;

    let (spend_total_rp, tx_count) = match row {
        Some(row) => (row.f64_or_zero("spend_total_rp")?, row.i64_or_zero("tx_count")?),
        None => (0.0, 0),
    };

    Ok(SpendSummaryOutput {
        range: range.to_string(),
        spend_total_rp,
        tx_count,
    })
}
