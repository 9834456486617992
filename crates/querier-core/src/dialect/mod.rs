//! SQL dialect support.
//!
//! A dialect maps the value shape of a record field to a SQL column type and
//! formats bind-variable tokens. Dialects are pure and stateless; driver
//! crates extend [`DefaultDialect`] by holding one and delegating to it.

mod default;

pub use default::DefaultDialect;

use std::borrow::Cow;

use crate::record::ValueType;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Maps a field's value type to a SQL column type.
    ///
    /// `None` means the type has no representation in this dialect. Callers
    /// treat that as fatal unless the field's tag supplies a data type.
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>>;

    /// Returns the bind-variable token for the parameter at `position`
    /// (zero-based index into the statement's parameter list).
    fn bind_var(&self, position: usize) -> Cow<'static, str> {
        let _ = position;
        Cow::Borrowed("?")
    }
}

impl<D: Dialect + ?Sized> Dialect for &D {
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>> {
        (**self).type_map(ty)
    }

    fn bind_var(&self, position: usize) -> Cow<'static, str> {
        (**self).bind_var(position)
    }
}
