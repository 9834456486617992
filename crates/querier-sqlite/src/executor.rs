//! SQLite statement executor over an sqlx pool.

use async_trait::async_trait;
use querier_core::{Error, ExecResult, Executor, Result, Rows, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;

/// Runs querier statements on a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `url`, e.g. `sqlite:app.db` or `sqlite::memory:`.
    ///
    /// In-memory databases get a single connection, so every statement sees
    /// the same database.
    ///
    /// # Errors
    ///
    /// Returns an executor error when the connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        debug!(url, "Connecting to SQLite");
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(Error::executor)?;
        Ok(Self::new(pool))
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult> {
        let done = bind_params(sqlx::query(sql), params)?
            .execute(&self.pool)
            .await
            .map_err(Error::executor)?;
        Ok(ExecResult {
            rows_affected: done.rows_affected(),
            last_insert_id: Some(done.last_insert_rowid()),
        })
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        let rows = bind_params(sqlx::query(sql), params)?
            .fetch_all(&self.pool)
            .await
            .map_err(Error::executor)?;

        let columns: Vec<String> = rows.first().map_or_else(Vec::new, |row| {
            row.columns().iter().map(|c| c.name().to_string()).collect()
        });
        let values = rows
            .iter()
            .map(|row| (0..columns.len()).map(|i| decode(row, i)).collect())
            .collect::<Result<Vec<Vec<SqlValue>>>>()?;
        Ok(Rows::new(columns, values))
    }
}

/// Binds `params` in order.
///
/// SQLite integers are signed 64-bit; unsigned values past `i64::MAX` are
/// rejected instead of wrapping.
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::UInt(n) => {
                let signed = i64::try_from(*n).map_err(|_| {
                    let msg = format!("unsigned value {n} overflows SQLite INTEGER");
                    Error::from_boxed(msg.into())
                })?;
                query.bind(signed)
            }
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
            SqlValue::Timestamp(ts) => query.bind(*ts),
        };
    }
    Ok(query)
}

/// Reads column `index` by its storage class.
fn decode(row: &SqliteRow, index: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(index).map_err(Error::executor)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();
    let value = if storage.contains("INT") || storage.contains("BOOL") {
        SqlValue::Int(row.try_get_unchecked(index).map_err(Error::executor)?)
    } else if storage == "REAL" || storage.contains("FLOA") || storage.contains("DOUB") {
        SqlValue::Float(row.try_get_unchecked(index).map_err(Error::executor)?)
    } else if storage == "BLOB" {
        SqlValue::Blob(row.try_get_unchecked(index).map_err(Error::executor)?)
    } else {
        SqlValue::Text(row.try_get_unchecked(index).map_err(Error::executor)?)
    };
    Ok(value)
}
