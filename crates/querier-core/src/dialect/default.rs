//! The default SQL dialect.

use std::borrow::Cow;

use super::Dialect;
use crate::record::ValueType;

/// The default dialect: MySQL-flavoured column types and `?` bind variables.
///
/// Nullable timestamps and custom value types are left unmapped; a driver
/// dialect that wraps this one may add them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDialect;

impl DefaultDialect {
    /// Creates a new default dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the default column type for `ty`, if there is one.
    #[must_use]
    pub const fn column_type(ty: &ValueType) -> Option<&'static str> {
        let sql = match ty {
            ValueType::Text => "VARCHAR(255) NOT NULL",
            ValueType::I64 | ValueType::Isize => "BIGINT NOT NULL",
            ValueType::I32 => "INT NOT NULL",
            ValueType::I16 => "SMALLINT NOT NULL",
            ValueType::I8 => "TINYINT NOT NULL",
            ValueType::U64 | ValueType::Usize => "BIGINT UNSIGNED NOT NULL",
            ValueType::U32 => "INT UNSIGNED NOT NULL",
            ValueType::U16 => "SMALLINT UNSIGNED NOT NULL",
            ValueType::U8 => "TINYINT UNSIGNED NOT NULL",
            ValueType::F64 => "DOUBLE NOT NULL",
            ValueType::F32 => "FLOAT NOT NULL",
            ValueType::Bool => "BOOLEAN NOT NULL",
            ValueType::Bytes => "VARBINARY(255) NULL",
            ValueType::Timestamp => "DATETIME NOT NULL",
            ValueType::NullText => "VARCHAR(255) NULL",
            ValueType::NullInt => "BIGINT NULL",
            ValueType::NullFloat => "DOUBLE NULL",
            ValueType::NullBool => "BOOLEAN NULL",
            ValueType::NullTimestamp | ValueType::Custom(_) => return None,
        };
        Some(sql)
    }
}

impl Dialect for DefaultDialect {
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>> {
        Self::column_type(ty).map(Cow::Borrowed)
    }
}
