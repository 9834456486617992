//! MySQL dialect implementation.

use std::borrow::Cow;

use querier_core::{DefaultDialect, Dialect, ValueType};

/// MySQL dialect.
///
/// The default column types are already MySQL's; this adds `DATETIME NULL`
/// for nullable timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect {
    base: DefaultDialect,
}

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: DefaultDialect::new(),
        }
    }
}

impl Dialect for MySqlDialect {
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>> {
        if let Some(sql) = self.base.type_map(ty) {
            return Some(sql);
        }
        match ty {
            ValueType::NullTimestamp => Some(Cow::Borrowed("DATETIME NULL")),
            _ => None,
        }
    }
}
