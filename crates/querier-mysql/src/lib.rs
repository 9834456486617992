//! # querier-mysql
//!
//! MySQL support for `querier-core` and `querier-migrate`.
//!
//! [`MySqlDialect`] extends the default dialect with nullable timestamps and
//! implements [`DbInfo`](querier_migrate::DbInfo) through
//! `information_schema`, scoped to the connection's current database. Bring
//! any [`Executor`](querier_core::Executor) that talks to MySQL.
//!
//! ```rust
//! use querier_core::{Dialect, ValueType};
//! use querier_mysql::MySqlDialect;
//!
//! let dialect = MySqlDialect::new();
//! assert_eq!(
//!     dialect.type_map(&ValueType::NullTimestamp).as_deref(),
//!     Some("DATETIME NULL")
//! );
//! ```

mod dialect;
mod info;

pub use dialect::MySqlDialect;
