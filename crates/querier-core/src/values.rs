//! Name-indexed references into a live record.

use std::collections::HashMap;

use crate::error::Result;
use crate::record::{extract_field_info, FieldDescriptor, FieldType, Record};
use crate::selector::Field;
use crate::value::{Ignore, SqlValue, Value};

static IGNORE: Ignore = Ignore;

/// Maps resolved column names to the storage of one record instance.
///
/// Built by walking the record exactly like [`FieldSelector`] does, nested
/// records flattened, but without a dialect.
///
/// [`FieldSelector`]: crate::FieldSelector
#[derive(Default)]
pub struct ValueMap<'a> {
    values: HashMap<&'static str, &'a mut dyn Value>,
}

impl<'a> ValueMap<'a> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builds the map for `record`.
    pub fn of<R: Record>(record: &'a mut R) -> Self {
        let mut values = Self::new();
        record.bind_values(&mut values);
        values
    }

    /// Binds one declared field: skipped when ignored, flattened when it is
    /// a nested record, inserted under its resolved name otherwise.
    pub fn bind<T: FieldType>(&mut self, field: &FieldDescriptor, target: &'a mut T) {
        let info = extract_field_info(field, None);
        if info.ignore {
            return;
        }
        if info.inline {
            target.bind_inline(self);
        } else {
            target.bind_value(info.name, self);
        }
    }

    /// Inserts a storage location under `name`, replacing any previous one.
    pub fn insert(&mut self, name: &'static str, value: &'a mut dyn Value) {
        self.values.insert(name, value);
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Value> {
        self.values.get(name).map(|v| &**v)
    }

    /// Returns the number of bound columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no column is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the scan targets for a result set, in column order.
    ///
    /// Unknown column names scan into [`ScanTarget::Discard`]. A field hands
    /// out its storage once; a column name repeated in the result set is
    /// discarded after its first occurrence.
    pub fn map_to_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Vec<ScanTarget<'_>> {
        let mut pool: HashMap<&str, &mut dyn Value> = self
            .values
            .iter_mut()
            .map(|(name, value)| (*name, &mut **value as &mut dyn Value))
            .collect();

        columns
            .iter()
            .map(|column| {
                pool.remove(column.as_ref())
                    .map_or(ScanTarget::Discard, ScanTarget::Field)
            })
            .collect()
    }

    /// Returns the bound values for `fields`, in order.
    ///
    /// Fields missing from the map yield a value that binds as NULL.
    #[must_use]
    pub fn map_to_fields(&self, fields: &[Field]) -> Vec<&dyn Value> {
        fields
            .iter()
            .map(|field| self.get(&field.name).unwrap_or(&IGNORE))
            .collect()
    }

    /// Scans one row: `values[i]` is stored in the field named `columns[i]`.
    pub fn scan_row<S: AsRef<str>>(&mut self, columns: &[S], values: Vec<SqlValue>) -> Result<()> {
        for (target, value) in self.map_to_columns(columns).iter_mut().zip(values) {
            target.scan(value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ValueMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.values.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("ValueMap").field("columns", &names).finish()
    }
}

/// Where one result column goes.
pub enum ScanTarget<'s> {
    /// Storage of a record field.
    Field(&'s mut dyn Value),
    /// No field is bound to the column.
    Discard,
}

impl ScanTarget<'_> {
    /// Stores `value` in the target.
    pub fn scan(&mut self, value: SqlValue) -> Result<()> {
        match self {
            Self::Field(target) => target.scan(value),
            Self::Discard => Ok(()),
        }
    }

    /// Returns whether the column is discarded.
    #[must_use]
    pub const fn is_discard(&self) -> bool {
        matches!(self, Self::Discard)
    }
}
