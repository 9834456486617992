//! Traits implemented by migrated models and database drivers.

use async_trait::async_trait;
use querier_core::{Dialect, FieldDescriptor, Querier};

/// Why a model's migration callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateEvent<'c> {
    /// The table was just created.
    Created,
    /// The column was just added to an existing table.
    AddedColumn(&'c str),
}

/// A record type backed by a table.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default, Record)]
/// struct User {
///     #[db(",BIGINT NOT NULL AUTO_INCREMENT")]
///     id: i64,
///     name: String,
/// }
///
/// #[async_trait]
/// impl Model for User {
///     fn table_name(&self) -> &str {
///         "users"
///     }
///
///     fn fields(&self) -> &'static [FieldDescriptor] {
///         Self::FIELDS
///     }
///
///     fn create_table(&self, q: &mut Querier<'_>) {
///         q.write("PRIMARY KEY (id)");
///     }
/// }
/// ```
#[async_trait]
pub trait Model: Send + Sync {
    /// Name of the backing table.
    fn table_name(&self) -> &str;

    /// Field descriptors of the backing record, usually `Self::FIELDS`.
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Appends extra clauses to `CREATE TABLE`, after the column
    /// definitions. The separator is already set to `", "`.
    fn create_table(&self, q: &mut Querier<'_>) {
        let _ = q;
    }

    /// Runs after the table was created or a column was added, with a fresh
    /// querier. Use it to backfill data or add constraints.
    async fn migrate(
        &self,
        q: &mut Querier<'_>,
        event: MigrateEvent<'_>,
    ) -> querier_core::Result<()> {
        let _ = (q, event);
        Ok(())
    }
}

/// Schema introspection for one database, which is also its dialect.
#[async_trait]
pub trait DbInfo: Dialect {
    /// Returns whether `table` exists.
    async fn has_table(&self, q: &mut Querier<'_>, table: &str) -> querier_core::Result<bool>;

    /// Returns the column names of `table`.
    async fn table_columns(
        &self,
        q: &mut Querier<'_>,
        table: &str,
    ) -> querier_core::Result<Vec<String>>;
}
