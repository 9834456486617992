//! # querier-core
//!
//! Maps plain Rust structs to SQL columns and builds statements from them.
//!
//! This crate provides:
//! - Static record descriptors ([`Record`]), usually generated by
//!   `#[derive(Record)]` from `querier-derive`
//! - Dialects translating field types to SQL column types ([`Dialect`])
//! - Column selection with nested record flattening ([`FieldSelector`])
//! - Name-indexed bindings into live records ([`ValueMap`])
//! - A statement builder running through a pluggable executor ([`Querier`])
//!
//! ## Records
//!
//! Fields are tagged with `#[db("<name>,<data type>")]`. Either half may be
//! empty; a name of `-` excludes the field.
//!
//! ```rust
//! use querier_core::FieldSelector;
//! use querier_derive::Record;
//!
//! #[derive(Default, Record)]
//! struct Timestamps {
//!     created: i64,
//!     updated: i64,
//! }
//!
//! #[derive(Default, Record)]
//! struct User {
//!     #[db(",BIGINT UNSIGNED NOT NULL AUTO_INCREMENT")]
//!     id: u64,
//!     #[db("username")]
//!     name: String,
//!     #[db("-")]
//!     session: Vec<u8>,
//!     times: Timestamps,
//! }
//!
//! let fields = FieldSelector::of::<User>().except(["updated"]).select();
//! let columns: Vec<String> = fields
//!     .iter()
//!     .map(|f| format!("{} {}", f.name, f.data_type))
//!     .collect();
//! assert_eq!(
//!     columns,
//!     [
//!         "id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT",
//!         "username VARCHAR(255) NOT NULL",
//!         "created BIGINT NOT NULL",
//!     ]
//! );
//! ```

pub mod dialect;
mod error;
mod executor;
mod query;
pub mod record;
mod selector;
pub mod value;
mod values;

pub use async_trait::async_trait;
pub use dialect::{DefaultDialect, Dialect};
pub use error::{BoxError, Error, Result};
pub use executor::{ExecResult, Executor, Row, Rows};
pub use query::{append_to, Querier, FIELD_SEP, SPACE};
pub use record::{
    extract_field_info, FieldDescriptor, FieldInfo, FieldKind, FieldType, Record, ValueType,
};
pub use selector::{Field, FieldSelector};
pub use value::{Ignore, SqlValue, ToSqlValue, Value};
pub use values::{ScanTarget, ValueMap};
