//! Additive schema migrations for querier records.
//!
//! `querier-migrate` keeps tables in line with the records that back them:
//! - Missing tables are created from the record's columns
//! - Columns the record gained are added one `ALTER TABLE` at a time
//! - Nothing is ever dropped or changed in place
//!
//! # Architecture
//!
//! - **Model** - A record type with a table name and migration callbacks
//! - **DbInfo** - Per-database schema introspection, also the dialect
//! - **Migrator** - Diffs models against the database and issues DDL
//!
//! # Example
//!
//! ```rust,ignore
//! use querier_migrate::Migrator;
//! use querier_sqlite::{SqliteDialect, SqliteExecutor};
//!
//! let migrator = Migrator::new(SqliteExecutor::new(pool), SqliteDialect::new());
//! let result = migrator.migrate(&[&Users, &Posts]).await?;
//! for table in &result.tables_created {
//!     println!("created {table}");
//! }
//! ```

pub mod error;
mod migrator;
mod model;

pub use error::{MigrateError, Result};
pub use migrator::{MigrationResult, Migrator};
pub use model::{DbInfo, MigrateEvent, Model};
