//! Column selection over record descriptors.

use std::collections::HashSet;

use crate::dialect::{DefaultDialect, Dialect};
use crate::record::{extract_field_info, FieldDescriptor, Record};

static DEFAULT_DIALECT: DefaultDialect = DefaultDialect::new();

/// A resolved column of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// SQL data type, empty in value-only contexts.
    pub data_type: String,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    Include,
    Exclude,
}

#[derive(Debug, Clone)]
struct Filter {
    names: HashSet<String>,
    mode: FilterMode,
}

impl Filter {
    fn keeps(&self, name: &str) -> bool {
        self.names.contains(name) != (self.mode == FilterMode::Exclude)
    }
}

/// Selects the columns of a record type.
///
/// Nested records are flattened in place, depth-first, in declaration order.
/// A filter is applied to the flattened list: `only` keeps the named
/// columns, `except` drops them. The two cannot be combined.
///
/// # Example
///
/// ```rust,ignore
/// let fields = FieldSelector::of::<User>()
///     .except(["password"])
///     .select();
/// ```
#[derive(Clone)]
pub struct FieldSelector<'d> {
    fields: &'static [FieldDescriptor],
    dialect: &'d dyn Dialect,
    filter: Option<Filter>,
}

impl FieldSelector<'static> {
    /// Creates a selector over the descriptors of `R`, with the default dialect.
    #[must_use]
    pub fn of<R: Record>() -> Self {
        Self::new(R::FIELDS)
    }

    /// Creates a selector over a descriptor table, with the default dialect.
    #[must_use]
    pub fn new(fields: &'static [FieldDescriptor]) -> Self {
        Self {
            fields,
            dialect: &DEFAULT_DIALECT,
            filter: None,
        }
    }
}

impl<'d> FieldSelector<'d> {
    /// Keeps only the named columns.
    ///
    /// # Panics
    ///
    /// Panics when an `except` filter was already set.
    #[must_use]
    pub fn only<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter(FilterMode::Include, names)
    }

    /// Drops the named columns.
    ///
    /// # Panics
    ///
    /// Panics when an `only` filter was already set.
    #[must_use]
    pub fn except<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter(FilterMode::Exclude, names)
    }

    /// Sets the dialect used to resolve data types.
    #[must_use]
    pub fn set_dialect<'e>(self, dialect: &'e dyn Dialect) -> FieldSelector<'e> {
        FieldSelector {
            fields: self.fields,
            dialect,
            filter: self.filter,
        }
    }

    /// Returns the selected columns, in order.
    ///
    /// # Panics
    ///
    /// Panics when a field's type has no mapping in the dialect and its tag
    /// gives no data type.
    #[must_use]
    pub fn select(&self) -> Vec<Field> {
        let mut out = Vec::with_capacity(self.fields.len());
        collect_fields(self.fields, self.dialect, &mut out);
        if let Some(filter) = &self.filter {
            out.retain(|field| filter.keeps(&field.name));
        }
        out
    }

    fn filter<I, S>(mut self, mode: FilterMode, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = self.filter.get_or_insert_with(|| Filter {
            names: HashSet::new(),
            mode,
        });
        match (filter.mode, mode) {
            (FilterMode::Exclude, FilterMode::Include) => {
                panic!("an except filter was already set")
            }
            (FilterMode::Include, FilterMode::Exclude) => panic!("an only filter was already set"),
            _ => {}
        }
        filter.names.extend(names.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Debug for FieldSelector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSelector")
            .field("fields", &self.fields.len())
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

fn collect_fields(fields: &'static [FieldDescriptor], dialect: &dyn Dialect, out: &mut Vec<Field>) {
    for field in fields {
        let info = extract_field_info(field, Some(dialect));
        if info.ignore {
            continue;
        }
        if info.inline {
            if let crate::record::FieldKind::Record(nested) = field.kind {
                collect_fields(nested, dialect, out);
            }
            continue;
        }
        out.push(Field::new(info.name, info.data_type));
    }
}
