//! Database access layer with connection pooling
//!
//! The tool layer never touches a connection directly. It talks to a
//! [`StoreGateway`], which offers three read shapes (all rows, one row,
//! one scalar) over parameterized query text. [`Database`] implements the
//! gateway on top of an r2d2 pool of SQLite connections.
//!
//! Parameters are always bound positionally (`?1`, `?2`, ...) and never
//! formatted into the query text.

use std::sync::Arc;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

mod row;

pub use row::Row;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Read-only access to the transaction store
///
/// Implementations must acquire and release any pooled resource within a
/// single call, including when the query fails.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Execute a query and return every row
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any
    async fn fetch_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>>;

    /// Execute a query and return the first column of the first row
    ///
    /// Returns `Value::Null` when the query yields no rows.
    async fn fetch_val(&self, sql: &str, params: &[Value]) -> Result<Value>;
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open a pool sized from the configuration
    pub fn connect(config: &Config) -> Result<Self> {
        Self::open(
            &config.database_path,
            config.pool_max_size,
            Some(config.pool_min_idle),
            config.read_only,
        )
    }

    /// Open a pool with explicit sizing
    ///
    /// `read_only` opens every connection with `SQLITE_OPEN_READ_ONLY`, so the
    /// process cannot write to the store even by accident.
    pub fn open(path: &str, max_size: u32, min_idle: Option<u32>, read_only: bool) -> Result<Self> {
        let mut manager = SqliteConnectionManager::file(path);
        if read_only {
            manager = manager.with_flags(
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            );
        }

        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle.map(|n| n.min(max_size)))
            .build(manager)?;

        info!(
            path = %path,
            max_size,
            read_only,
            "Opened database pool"
        );

        Ok(Self {
            pool,
            db_path: path.to_string(),
        })
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Maximum number of pooled connections
    pub fn max_connections(&self) -> u32 {
        self.pool.max_size()
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run `f` with a pooled connection on the blocking thread pool
    ///
    /// The connection is returned to the pool when the closure finishes,
    /// whether it succeeded or not.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await?
    }
}

/// Run a query and collect every row with its column names
fn query_rows(conn: &Connection, sql: &str, params: &[Value], max_rows: Option<usize>) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()
        .into();
    let width = columns.len();

    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(Arc::clone(&columns), values));
        if max_rows.is_some_and(|max| out.len() >= max) {
            break;
        }
    }
    Ok(out)
}

#[async_trait]
impl StoreGateway for Database {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        let rows = self
            .with_conn(move |conn| query_rows(conn, &sql, &params, None))
            .await?;
        debug!(rows = rows.len(), "fetch_all");
        Ok(rows)
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        let mut rows = self
            .with_conn(move |conn| query_rows(conn, &sql, &params, Some(1)))
            .await?;
        Ok(rows.pop())
    }

    async fn fetch_val(&self, sql: &str, params: &[Value]) -> Result<Value> {
        let row = self.fetch_one(sql, params).await?;
        Ok(row
            .and_then(|r| r.value_at(0).cloned())
            .unwrap_or(Value::Null))
    }
}
