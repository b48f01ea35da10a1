//! Test utilities for warren-core
//!
//! - [`MockStore`]: an in-process [`StoreGateway`] with canned rows, failure
//!   injection, and a record of every query it received.
//! - [`FixtureStore`]: a temporary SQLite database carrying a transaction
//!   table and the four reporting views the tools read from.

use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::params;
use rusqlite::types::Value;
use tempfile::TempDir;

use crate::db::{Database, Row, StoreGateway};
use crate::error::{Error, Result};

/// Canned-response store gateway
#[derive(Default)]
pub struct MockStore {
    rows: Vec<Row>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockStore {
    /// A store that returns no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that returns `rows` for every query
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// A store whose every query fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every `(sql, params)` pair received so far
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match &self.failure {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoreGateway for MockStore {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.record(sql, params)?;
        Ok(self.rows.clone())
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        self.record(sql, params)?;
        Ok(self.rows.first().cloned())
    }

    async fn fetch_val(&self, sql: &str, params: &[Value]) -> Result<Value> {
        self.record(sql, params)?;
        Ok(self
            .rows
            .first()
            .and_then(|r| r.value_at(0).cloned())
            .unwrap_or(Value::Null))
    }
}

/// Row for a category aggregate
pub fn category_row(code: &str, name: &str, total: f64, count: i64) -> Row {
    Row::from_pairs([
        ("category_code", Value::Text(code.into())),
        ("category_name", Value::Text(name.into())),
        ("spend_total_rp", Value::Real(total)),
        ("tx_count", Value::Integer(count)),
    ])
}

/// Row for a merchant aggregate
pub fn merchant_row(merchant: &str, total: f64, count: i64) -> Row {
    Row::from_pairs([
        ("merchant", Value::Text(merchant.into())),
        ("spend_total_rp", Value::Real(total)),
        ("tx_count", Value::Integer(count)),
    ])
}

/// Row from the clean transaction view
pub fn transaction_row(
    datetime: &str,
    merchant: &str,
    category_code: &str,
    total: f64,
    notes: Option<&str>,
) -> Row {
    Row::from_pairs([
        ("datetime_jakarta", Value::Text(datetime.into())),
        ("merchant", Value::Text(merchant.into())),
        ("category_code", Value::Text(category_code.into())),
        ("total_rp", Value::Real(total)),
        (
            "notes",
            notes.map_or(Value::Null, |n| Value::Text(n.into())),
        ),
    ])
}

/// Transaction table plus the reporting views, in SQLite dialect
///
/// Timestamps are stored as Jakarta wall-clock text (`YYYY-MM-DD HH:MM:SS`).
pub const FIXTURE_SCHEMA: &str = r#"
CREATE TABLE transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime_jakarta TEXT NOT NULL,
    merchant TEXT NOT NULL,
    category_code TEXT NOT NULL,
    category_name TEXT NOT NULL,
    total_rp REAL,
    notes TEXT
);

CREATE VIEW v_tx_clean AS
SELECT datetime_jakarta, merchant, category_code, category_name, total_rp, notes
FROM transactions;

CREATE VIEW v_spend_daily AS
SELECT date(datetime_jakarta) AS date_jakarta,
       SUM(total_rp) AS spend_total_rp,
       COUNT(*) AS tx_count
FROM transactions
GROUP BY date(datetime_jakarta);

CREATE VIEW v_spend_by_category_daily AS
SELECT date(datetime_jakarta) AS date,
       category_code,
       category_name,
       SUM(total_rp) AS spend_total_rp,
       COUNT(*) AS tx_count
FROM transactions
GROUP BY date(datetime_jakarta), category_code, category_name;

CREATE VIEW v_spend_by_merchant_daily AS
SELECT date(datetime_jakarta) AS date,
       merchant,
       SUM(total_rp) AS spend_total_rp,
       COUNT(*) AS tx_count
FROM transactions
GROUP BY date(datetime_jakarta), merchant;
"#;

/// Temporary SQLite store with the reporting views installed
pub struct FixtureStore {
    // Held so the directory outlives the pool
    _dir: TempDir,
    pub db: Database,
}

impl FixtureStore {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().map_err(|e| Error::Store(e.to_string()))?;
        let path = dir.path().join("warren-fixture.db");
        let path = path
            .to_str()
            .ok_or_else(|| Error::Store("Fixture path is not UTF-8".to_string()))?;
        let db = Database::open(path, 4, None, false)?;
        db.conn()?.execute_batch(FIXTURE_SCHEMA)?;
        Ok(Self { _dir: dir, db })
    }

    /// Insert one transaction
    pub fn insert(
        &self,
        datetime_jakarta: &str,
        merchant: &str,
        category_code: &str,
        category_name: &str,
        total_rp: Option<f64>,
        notes: Option<&str>,
    ) -> Result<()> {
        self.db.conn()?.execute(
            "INSERT INTO transactions (datetime_jakarta, merchant, category_code, category_name, total_rp, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![datetime_jakarta, merchant, category_code, category_name, total_rp, notes],
        )?;
        Ok(())
    }
}
