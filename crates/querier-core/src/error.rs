//! Error types for statement execution and scanning.

use std::sync::Arc;

/// Boxed error produced by an executor or driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`Querier`](crate::Querier) operations and executors.
///
/// Programmer errors (conflicting filters, unmappable field types, empty
/// statements) are not represented here; they panic at the call site.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A query that had to return a row returned none.
    #[error("no record found")]
    NoRecord,

    /// The executor or the underlying driver failed.
    #[error("executor error: {0}")]
    Executor(#[source] Arc<dyn std::error::Error + Send + Sync + 'static>),

    /// A column value could not be stored in its scan target.
    #[error("cannot scan {found} into {expected}")]
    Scan {
        /// Rust type of the scan target.
        expected: &'static str,
        /// Kind of the SQL value that was found.
        found: &'static str,
    },

    /// A row was scanned into a different number of targets than it has
    /// columns.
    #[error("expected {targets} destination arguments in scan, row has {columns} columns")]
    ColumnCount {
        /// Columns in the result row.
        columns: usize,
        /// Scan targets supplied.
        targets: usize,
    },

    /// A model or user callback reported a failure.
    #[error("{0}")]
    Callback(String),
}

impl Error {
    /// Wraps a driver error.
    pub fn executor<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Executor(Arc::new(err))
    }

    /// Wraps an already boxed driver error.
    #[must_use]
    pub fn from_boxed(err: BoxError) -> Self {
        Self::Executor(Arc::from(err))
    }

    /// Creates a callback error from a message.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }

    /// Returns whether this is the "no record found" condition.
    #[must_use]
    pub const fn is_no_record(&self) -> bool {
        matches!(self, Self::NoRecord)
    }
}

/// Result type alias for querier operations.
pub type Result<T> = std::result::Result<T, Error>;
