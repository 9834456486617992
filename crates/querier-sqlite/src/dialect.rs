//! SQLite dialect implementation.

use std::borrow::Cow;

use querier_core::{DefaultDialect, Dialect, ValueType};

/// SQLite dialect.
///
/// Uses the default column types and adds `DATETIME NULL` for nullable
/// timestamps. SQLite accepts any declared type name and stores values by
/// affinity, so the default MySQL-flavoured names work unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect {
    base: DefaultDialect,
}

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: DefaultDialect::new(),
        }
    }
}

impl Dialect for SqliteDialect {
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>> {
        self.base.type_map(ty).or_else(|| match ty {
            ValueType::NullTimestamp => Some(Cow::Borrowed("DATETIME NULL")),
            _ => None,
        })
    }
}
