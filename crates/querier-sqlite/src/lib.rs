//! # querier-sqlite
//!
//! SQLite support for `querier-core` and `querier-migrate`.
//!
//! - [`SqliteExecutor`] runs statements on an [sqlx] pool.
//! - [`SqliteDialect`] maps record fields to column types and implements
//!   [`DbInfo`](querier_migrate::DbInfo) through `sqlite_master` and
//!   `pragma_table_info`.
//!
//! # How SQLite differs from the default dialect
//!
//! - **[Type affinity]**: any declared type name is accepted, so the
//!   default MySQL-flavoured column types are kept as they are.
//! - **Limited [ALTER TABLE]**: `ADD COLUMN` cannot add a `NOT NULL` column
//!   without a default. Fields added to an existing table should be
//!   nullable or carry a type override with a default.
//! - **Booleans** are stored as integers and read back as `0`/`1`.
//!
//! [sqlx]: https://docs.rs/sqlx
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//! [ALTER TABLE]: https://www.sqlite.org/lang_altertable.html
//!
//! ## Example
//!
//! ```rust,no_run
//! use querier_core::{Querier, Record};
//! use querier_derive::Record;
//! use querier_migrate::{Migrator, Model};
//! use querier_sqlite::{SqliteDialect, SqliteExecutor};
//!
//! #[derive(Debug, Default, Record)]
//! struct Note {
//!     #[db(",INTEGER PRIMARY KEY")]
//!     id: i64,
//!     body: String,
//! }
//!
//! struct Notes;
//!
//! #[querier_core::async_trait]
//! impl Model for Notes {
//!     fn table_name(&self) -> &str {
//!         "notes"
//!     }
//!
//!     fn fields(&self) -> &'static [querier_core::FieldDescriptor] {
//!         Note::FIELDS
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ex = SqliteExecutor::connect("sqlite::memory:").await?;
//! let dialect = SqliteDialect::new();
//! Migrator::new(&ex, dialect).migrate(&[&Notes]).await?;
//!
//! let mut q = Querier::new(&ex, &dialect);
//! q.write_with("INSERT INTO notes (body) VALUES (?)", ["hello"]);
//! q.exec().await?;
//! # Ok(())
//! # }
//! ```

mod dialect;
mod executor;
mod info;

pub use dialect::SqliteDialect;
pub use executor::SqliteExecutor;
