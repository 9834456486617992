//! Error types for the migrator.

/// A failure while migrating or dropping a model's table.
///
/// Every failure carries the table it happened on and, for column
/// additions, the column.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Checking, creating or dropping the table failed.
    #[error("migration table {table}: {source}")]
    Table {
        /// Table name.
        table: String,
        /// Underlying failure.
        source: querier_core::Error,
    },

    /// Adding a column or running its callback failed.
    #[error("migration table {table}, column {column}: {source}")]
    Column {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Underlying failure.
        source: querier_core::Error,
    },
}

impl MigrateError {
    pub(crate) fn table(table: &str) -> impl FnOnce(querier_core::Error) -> Self + '_ {
        move |source| Self::Table {
            table: table.to_string(),
            source,
        }
    }

    pub(crate) fn column<'c>(
        table: &'c str,
        column: &'c str,
    ) -> impl FnOnce(querier_core::Error) -> Self + 'c {
        move |source| Self::Column {
            table: table.to_string(),
            column: column.to_string(),
            source,
        }
    }

    /// Returns the table the failure happened on.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::Table { table, .. } | Self::Column { table, .. } => table,
        }
    }

    /// Returns the column the failure happened on, if any.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Self::Table { .. } => None,
            Self::Column { column, .. } => Some(column),
        }
    }

    /// Returns the underlying failure.
    #[must_use]
    pub const fn inner(&self) -> &querier_core::Error {
        match self {
            Self::Table { source, .. } | Self::Column { source, .. } => source,
        }
    }
}

/// Result type for migrator operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
