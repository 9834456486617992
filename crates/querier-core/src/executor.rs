//! The statement executor seam.
//!
//! Drivers implement [`Executor`] over their connection pool. Results are
//! materialized: a [`Rows`] value owns its column names and values, so the
//! executor never hands out borrowed driver state.

use async_trait::async_trait;

use crate::error::Result;
use crate::value::SqlValue;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows the statement changed.
    pub rows_affected: u64,
    /// Row id generated by the statement, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// Runs SQL statements with positional parameters.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executes a statement that returns no rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult>;

    /// Executes a query and collects its result set.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for &E {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult> {
        (**self).execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        (**self).query(sql, params).await
    }
}

/// A materialized result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl Rows {
    /// Creates a result set. Every row must have one value per column.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// Returns the column names, in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the result set has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Consumes the result set, returning the column names and raw rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<SqlValue>>) {
        (self.columns, self.rows)
    }
}

/// One row of a [`Rows`] result set.
#[derive(Debug, Clone, Copy)]
pub struct Row<'r> {
    columns: &'r [String],
    values: &'r [SqlValue],
}

impl<'r> Row<'r> {
    /// Returns the column names.
    #[must_use]
    pub const fn columns(&self) -> &'r [String] {
        self.columns
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'r SqlValue> {
        self.values.get(index)
    }

    /// Returns the value of the column named `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&'r SqlValue> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// Returns all values, in column order.
    #[must_use]
    pub const fn values(&self) -> &'r [SqlValue] {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access() {
        let rows = Rows::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![SqlValue::Int(1), SqlValue::Text("ann".into())],
                vec![SqlValue::Int(2), SqlValue::Null],
            ],
        );
        assert_eq!(rows.len(), 2);

        let second = rows.iter().nth(1).unwrap();
        assert_eq!(second.get(0), Some(&SqlValue::Int(2)));
        assert_eq!(second.get_by_name("name"), Some(&SqlValue::Null));
        assert_eq!(second.get_by_name("missing"), None);
        assert_eq!(second.get(5), None);
    }
}
