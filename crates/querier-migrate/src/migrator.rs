//! The additive migrator.
//!
//! For every model, in order: a missing table is created with all record
//! columns, an existing table gets one `ALTER TABLE ... ADD` per record
//! column it lacks. Nothing is ever dropped or altered in place, so running
//! the same migration twice is a no-op.

use querier_core::{Executor, Querier, FIELD_SEP};
use tracing::{info, warn};

use crate::error::{MigrateError, Result};
use crate::model::{DbInfo, MigrateEvent, Model};

/// Outcome of a successful migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationResult {
    /// Tables that were created.
    pub tables_created: Vec<String>,
    /// Columns that were added, as `table.column`.
    pub new_columns: Vec<String>,
    /// DDL statements issued, or planned in dry-run mode.
    pub statements: Vec<String>,
}

impl MigrationResult {
    /// Returns whether the migration changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables_created.is_empty() && self.new_columns.is_empty()
    }
}

/// Reconciles model tables with their records.
///
/// The migrator holds no state between calls besides the executor and the
/// [`DbInfo`]; it is as safe to share as they are.
pub struct Migrator<E, I> {
    executor: E,
    info: I,
    dry_run: bool,
}

impl<E: Executor, I: DbInfo> Migrator<E, I> {
    /// Creates a migrator.
    pub const fn new(executor: E, info: I) -> Self {
        Self {
            executor,
            info,
            dry_run: false,
        }
    }

    /// Enables dry-run mode: DDL is logged and returned in
    /// [`MigrationResult::statements`] but not executed, and model callbacks
    /// are not run. Schema introspection still queries the database.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the executor.
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the database info, which is also the dialect.
    pub const fn info(&self) -> &I {
        &self.info
    }

    /// Migrates `models` in order.
    ///
    /// The first failure aborts the batch; the changes made before it stay
    /// in the database but no result is returned.
    pub async fn migrate(&self, models: &[&dyn Model]) -> Result<MigrationResult> {
        let mut result = MigrationResult::default();
        for model in models {
            self.migrate_model(*model, &mut result).await?;
        }
        Ok(result)
    }

    /// Drops the table of every model, in order, stopping at the first
    /// failure.
    pub async fn drop(&self, models: &[&dyn Model]) -> Result<()> {
        let mut q = self.querier();
        for model in models {
            let table = model.table_name();
            q.write(format!("DROP TABLE {table}"));
            self.run(&mut q, None)
                .await
                .map_err(MigrateError::table(table))?;
            info!(table, "Dropped table");
            q.reset();
        }
        Ok(())
    }

    async fn migrate_model(&self, model: &dyn Model, result: &mut MigrationResult) -> Result<()> {
        let table = model.table_name();
        let mut q = self.querier();

        let exists = self
            .info
            .has_table(&mut q, table)
            .await
            .map_err(MigrateError::table(table))?;
        q.reset();

        let selector = q.fields_of(model.fields());
        if !exists {
            q.write(format!("CREATE TABLE {table} ("))
                .write_fields("{name} {data_type}", FIELD_SEP, &selector.select())
                .set_separator(FIELD_SEP);
            model.create_table(&mut q);
            q.write_raw(")");
            self.run(&mut q, Some(&mut *result))
                .await
                .map_err(MigrateError::table(table))?;
            q.reset();
            info!(table, "Created table");

            if !self.dry_run {
                model
                    .migrate(&mut q, MigrateEvent::Created)
                    .await
                    .map_err(MigrateError::table(table))?;
            }
            result.tables_created.push(table.to_string());
            return Ok(());
        }

        let existing = self
            .info
            .table_columns(&mut q, table)
            .await
            .map_err(MigrateError::table(table))?;
        q.reset();

        for field in selector.except(existing).select() {
            q.write(format!("ALTER TABLE {table}"))
                .write_fields("ADD {name} {data_type}", "", std::slice::from_ref(&field));
            self.run(&mut q, Some(&mut *result))
                .await
                .map_err(MigrateError::column(table, &field.name))?;
            q.reset();
            info!(table, column = %field.name, "Added column");

            if !self.dry_run {
                model
                    .migrate(&mut q, MigrateEvent::AddedColumn(&field.name))
                    .await
                    .map_err(MigrateError::column(table, &field.name))?;
                q.reset();
            }
            result.new_columns.push(format!("{table}.{}", field.name));
        }

        Ok(())
    }

    /// Executes the statement in `q`, or only records it in dry-run mode.
    async fn run(
        &self,
        q: &mut Querier<'_>,
        result: Option<&mut MigrationResult>,
    ) -> querier_core::Result<()> {
        if let Some(result) = result {
            result.statements.push(q.sql().to_string());
        }
        if self.dry_run {
            warn!(sql = %q.sql(), "Dry run, statement not executed");
            return Ok(());
        }
        q.exec().await
    }

    fn querier(&self) -> Querier<'_> {
        Querier::new(&self.executor, &self.info)
    }
}
