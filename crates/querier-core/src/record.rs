//! Record descriptors and field extraction.
//!
//! A record type describes itself through a static table of
//! [`FieldDescriptor`]s, usually generated by `#[derive(Record)]`. Each
//! descriptor carries the declared field name, the raw tag and the
//! [`FieldKind`] reported by the field's [`FieldType`]. The field extractor
//! turns one descriptor into a resolved column.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::dialect::Dialect;
use crate::values::ValueMap;

/// Tag name that excludes a field from every selection.
pub const IGNORE: &str = "-";

/// The value shape of a scalar field, handed to [`Dialect::type_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    Text,
    Bytes,
    Timestamp,
    NullText,
    NullInt,
    NullFloat,
    NullBool,
    NullTimestamp,
    /// A user type implementing [`Value`](crate::Value); only dialects that
    /// know the name can map it.
    Custom(&'static str),
}

/// What a declared field contributes to the column list.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A single column of the given value shape.
    Value(ValueType),
    /// A nested record whose fields are spliced into the parent.
    Record(&'static [FieldDescriptor]),
    /// The field is tagged `-`; its type carries no column information.
    Ignored,
}

/// Static description of one declared field of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Declared Rust field name.
    pub name: &'static str,
    /// Declared Rust type, for diagnostics.
    pub rust_type: &'static str,
    /// Raw tag: `"<name>,<data type>"`, either half may be empty.
    pub tag: &'static str,
    /// Column contribution of the field's type.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        rust_type: &'static str,
        tag: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            rust_type,
            tag,
            kind,
        }
    }
}

/// A record type mapped to table columns.
///
/// Column names produced by one record, nested records included, must be
/// unique. Nothing de-duplicates them: two nested records declaring the same
/// column yield a duplicated column in every statement built from the
/// selection, with whatever behavior the database gives that.
///
/// # Example
///
/// A hand-written implementation, equivalent to what `#[derive(Record)]`
/// generates:
///
/// ```rust
/// use querier_core::{FieldDescriptor, FieldType, Record, ValueMap};
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for User {
///     const FIELDS: &'static [FieldDescriptor] = &[
///         FieldDescriptor::new("id", "i64", "", <i64 as FieldType>::KIND),
///         FieldDescriptor::new("name", "String", "username", <String as FieldType>::KIND),
///     ];
///
///     fn bind_values<'a>(&'a mut self, values: &mut ValueMap<'a>) {
///         let Self { id, name } = self;
///         values.bind(&Self::FIELDS[0], id);
///         values.bind(&Self::FIELDS[1], name);
///     }
/// }
///
/// let columns: Vec<String> = querier_core::FieldSelector::of::<User>()
///     .select()
///     .into_iter()
///     .map(|f| f.name)
///     .collect();
/// assert_eq!(columns, ["id", "username"]);
/// ```
pub trait Record {
    /// Declared fields, in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Registers the storage of every non-ignored field in `values`.
    fn bind_values<'a>(&'a mut self, values: &mut ValueMap<'a>);
}

/// Capability of a type used as a record field.
///
/// Scalar types (anything implementing [`Value`](crate::Value), timestamps
/// included) report [`FieldKind::Value`]; records report
/// [`FieldKind::Record`] and are flattened into their parent.
pub trait FieldType {
    /// Column contribution of this type.
    const KIND: FieldKind;

    /// Registers `self` as the storage of column `name`.
    fn bind_value<'a>(&'a mut self, name: &'static str, values: &mut ValueMap<'a>);

    /// Splices the fields of a nested record into `values`.
    fn bind_inline<'a>(&'a mut self, values: &mut ValueMap<'a>) {
        let _ = values;
    }
}

macro_rules! impl_field_type {
    ($($ty:ty => $kind:expr),+ $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Value($kind);

                fn bind_value<'a>(&'a mut self, name: &'static str, values: &mut ValueMap<'a>) {
                    values.insert(name, self);
                }
            }
        )+
    };
}

impl_field_type!(
    i8 => ValueType::I8,
    i16 => ValueType::I16,
    i32 => ValueType::I32,
    i64 => ValueType::I64,
    isize => ValueType::Isize,
    u8 => ValueType::U8,
    u16 => ValueType::U16,
    u32 => ValueType::U32,
    u64 => ValueType::U64,
    usize => ValueType::Usize,
    f32 => ValueType::F32,
    f64 => ValueType::F64,
    bool => ValueType::Bool,
    String => ValueType::Text,
    Vec<u8> => ValueType::Bytes,
    NaiveDateTime => ValueType::Timestamp,
    DateTime<Utc> => ValueType::Timestamp,
    Option<String> => ValueType::NullText,
    Option<i64> => ValueType::NullInt,
    Option<f64> => ValueType::NullFloat,
    Option<bool> => ValueType::NullBool,
    Option<NaiveDateTime> => ValueType::NullTimestamp,
    Option<DateTime<Utc>> => ValueType::NullTimestamp,
);

/// One declared field, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Column name: the tag override or the declared name.
    pub name: &'static str,
    /// SQL type, empty when not resolved (no dialect, ignored or inline).
    pub data_type: Cow<'static, str>,
    /// The field is excluded from every selection.
    pub ignore: bool,
    /// The field is a nested record to flatten.
    pub inline: bool,
}

/// Resolves the column name and SQL type of one declared field.
///
/// A data type given in the tag is used verbatim and the dialect is never
/// consulted for it. Without a dialect the type stays empty.
///
/// # Panics
///
/// Panics when a dialect is given and it cannot map the field's value type
/// and the tag supplies no data type. This is a record declaration error.
#[must_use]
pub fn extract_field_info(field: &FieldDescriptor, dialect: Option<&dyn Dialect>) -> FieldInfo {
    let (tag_name, tag_type) = match field.tag.split_once(',') {
        Some((name, data_type)) => (name, data_type),
        None => (field.tag, ""),
    };

    let name = if tag_name.is_empty() { field.name } else { tag_name };
    let mut info = FieldInfo {
        name,
        data_type: Cow::Borrowed(""),
        ignore: false,
        inline: false,
    };

    if name == IGNORE {
        info.ignore = true;
        return info;
    }
    if !tag_type.is_empty() {
        info.data_type = Cow::Borrowed(tag_type);
        return info;
    }

    match field.kind {
        FieldKind::Record(_) => info.inline = true,
        FieldKind::Value(ty) => {
            if let Some(dialect) = dialect {
                info.data_type = dialect.type_map(&ty).unwrap_or_else(|| {
                    panic!(
                        "invalid type of record field `{}`: {} has no SQL mapping",
                        field.name, field.rust_type
                    )
                });
            }
        }
        FieldKind::Ignored => {
            // Only reachable for a `-` tag, which returned above.
            info.ignore = true;
        }
    }

    info
}
