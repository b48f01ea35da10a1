//! Time range resolution in the Asia/Jakarta civil zone
//!
//! Symbolic range names ("today", "this_week", ...) are converted into
//! concrete `[start, end]` timestamps. All arithmetic happens at a fixed
//! UTC+7 offset; Jakarta has no daylight saving time, so a fixed offset is
//! exact.
//!
//! Ranges that end "now" use the current instant as their end. Ranges that
//! describe a closed past period end one microsecond before the next
//! period begins, so adjacent ranges never share the midnight instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Offset of Asia/Jakarta from UTC, in seconds
pub const UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Display format for timestamps rendered in the fixed zone
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The fixed civil zone every range is resolved in
pub fn zone() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECS).expect("UTC+7 is a valid offset")
}

/// Current instant in the fixed zone
pub fn now_in_zone() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&zone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
}

impl TimeRange {
    /// Every range name, in the order they are documented
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Today,
        TimeRange::Yesterday,
        TimeRange::ThisWeek,
        TimeRange::LastWeek,
        TimeRange::ThisMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Yesterday => "yesterday",
            TimeRange::ThisWeek => "this_week",
            TimeRange::LastWeek => "last_week",
            TimeRange::ThisMonth => "this_month",
        }
    }

    /// Whether the range ends at the current instant rather than at the end
    /// of a closed period
    pub fn is_open_ended(&self) -> bool {
        !matches!(self, TimeRange::Yesterday | TimeRange::LastWeek)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => Ok(TimeRange::Today),
            "yesterday" => Ok(TimeRange::Yesterday),
            "this_week" => Ok(TimeRange::ThisWeek),
            "last_week" => Ok(TimeRange::LastWeek),
            "this_month" => Ok(TimeRange::ThisMonth),
            _ => Err(Error::InvalidRange(s.to_string())),
        }
    }
}

/// A concrete interval in the fixed zone. `start` is inclusive; `end` is
/// either the resolution instant or the last microsecond of a past period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ResolvedInterval {
    /// Calendar date of `start` in the fixed zone
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Calendar date of `end` in the fixed zone
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Resolve a range name against the current instant
pub fn resolve(range_name: &str) -> Result<ResolvedInterval> {
    let range = range_name.parse::<TimeRange>()?;
    Ok(resolve_at(range, now_in_zone()))
}

/// Resolve a range against an explicit instant
///
/// `now` is converted into the fixed zone first, so callers may pass an
/// instant carrying any offset.
pub fn resolve_at(range: TimeRange, now: DateTime<FixedOffset>) -> ResolvedInterval {
    let now = now.with_timezone(&zone());
    let day_start = now
        - Duration::seconds(i64::from(now.num_seconds_from_midnight()))
        - Duration::nanoseconds(i64::from(now.nanosecond()));
    let week_start = day_start - Duration::days(i64::from(now.weekday().num_days_from_monday()));
    let just_before = |boundary: DateTime<FixedOffset>| boundary - Duration::microseconds(1);

    let (start, end) = match range {
        TimeRange::Today => (day_start, now),
        TimeRange::Yesterday => (day_start - Duration::days(1), just_before(day_start)),
        TimeRange::ThisWeek => (week_start, now),
        TimeRange::LastWeek => (week_start - Duration::days(7), just_before(week_start)),
        TimeRange::ThisMonth => (day_start - Duration::days(i64::from(now.day0())), now),
    };

    ResolvedInterval { start, end }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in the fixed zone
pub fn format_in_zone<Tz: chrono::TimeZone>(instant: &DateTime<Tz>) -> String {
    instant.with_timezone(&zone()).format(DISPLAY_FORMAT).to_string()
}

/// Parse a stored timestamp and render it in the fixed zone
///
/// Values carrying an offset (RFC 3339) are converted. Values without one
/// are taken to already be Jakarta wall-clock time.
pub fn format_stored_datetime(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(format_in_zone(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(format_in_zone(&dt));
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.format(DISPLAY_FORMAT).to_string())
        .ok_or_else(|| Error::RowMapping(format!("Unrecognized datetime value: {}", raw)))
}
