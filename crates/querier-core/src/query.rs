//! The statement builder and executor front-end.

use std::fmt;

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::executor::{Executor, Row, Rows};
use crate::record::{FieldDescriptor, Record};
use crate::selector::{Field, FieldSelector};
use crate::value::{SqlValue, ToSqlValue, Value};
use crate::values::ValueMap;

/// A single space, the default separator.
pub const SPACE: &str = " ";

/// Separator for column and value lists.
pub const FIELD_SEP: &str = ", ";

const PH_NAME: &str = "{name}";
const PH_DATA_TYPE: &str = "{data_type}";
const PH_BIND_VAR: &str = "{bind_var}";

type Deferred<'a> = Box<dyn FnOnce(&Querier<'_>) + Send + 'a>;

/// Builds one SQL statement at a time and runs it through an [`Executor`].
///
/// Fragments are joined with the current separator, a single space unless
/// changed with [`set_separator`](Self::set_separator). Parameters are
/// accumulated in write order and bound positionally.
///
/// A querier is reused with [`reset`](Self::reset) after each statement.
/// Executing an empty statement is a programming error and panics.
///
/// # Example
///
/// ```rust,ignore
/// let mut q = Querier::new(&executor, &dialect);
/// let fields = q.fields::<User>().except(["id"]).select();
/// q.write("INSERT INTO users (")
///     .write_fields("{name}", FIELD_SEP, &fields)
///     .write(") VALUES (")
///     .write_value_map("{bind_var}", FIELD_SEP, &ValueMap::of(&mut user), &fields)
///     .write_raw(")");
/// q.exec().await?;
/// ```
pub struct Querier<'a> {
    ex: &'a dyn Executor,
    dialect: &'a dyn Dialect,

    query: String,
    sep: String,
    pre_write: String,
    params: Vec<SqlValue>,

    err: Option<Error>,
    rows_affected: u64,
    last_insert_id: Option<i64>,
    deferred: Vec<Deferred<'a>>,
}

impl<'a> Querier<'a> {
    /// Creates an empty querier.
    #[must_use]
    pub fn new(ex: &'a dyn Executor, dialect: &'a dyn Dialect) -> Self {
        Self {
            ex,
            dialect,
            query: String::new(),
            sep: SPACE.to_string(),
            pre_write: String::new(),
            params: Vec::new(),
            err: None,
            rows_affected: 0,
            last_insert_id: None,
            deferred: Vec::new(),
        }
    }

    /// Returns a fresh querier sharing this one's executor and dialect.
    #[must_use]
    pub fn sibling(&self) -> Querier<'a> {
        Querier::new(self.ex, self.dialect)
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Returns a selector over `R` bound to this querier's dialect.
    #[must_use]
    pub fn fields<R: Record>(&self) -> FieldSelector<'a> {
        FieldSelector::of::<R>().set_dialect(self.dialect)
    }

    /// Returns a selector over a descriptor table bound to this querier's
    /// dialect.
    #[must_use]
    pub fn fields_of(&self, descriptors: &'static [FieldDescriptor]) -> FieldSelector<'a> {
        FieldSelector::new(descriptors).set_dialect(self.dialect)
    }

    /// Writes a fragment, preceded by the separator unless the statement is
    /// still empty.
    pub fn write(&mut self, query: impl AsRef<str>) -> &mut Self {
        self.write_sep();
        self.query.push_str(query.as_ref());
        self
    }

    /// Writes a fragment and appends its parameters.
    pub fn write_with<I, P>(&mut self, query: impl AsRef<str>, params: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: ToSqlValue,
    {
        self.write(query);
        self.add_params(params)
    }

    /// Writes `format` once per field, joined by `sep`.
    ///
    /// `{name}`, `{data_type}` and `{bind_var}` are replaced by the field's
    /// name, its data type and the dialect's bind variable.
    pub fn write_fields(&mut self, format: &str, sep: &str, fields: &[Field]) -> &mut Self {
        self.write_sep();
        self.write_format(format, sep, Some(fields), fields.len());
        self
    }

    /// Writes `format` once per value, joined by `sep`, and appends the
    /// values as parameters.
    ///
    /// # Panics
    ///
    /// Panics when `format` contains `{name}` or `{data_type}`.
    pub fn write_values<I, P>(&mut self, format: &str, sep: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: ToSqlValue,
    {
        let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.write_sep();
        self.write_format(format, sep, None, values.len());
        self.params.extend(values);
        self
    }

    /// Writes `format` once per field and appends the record values bound
    /// to those fields, in field order.
    pub fn write_value_map(
        &mut self,
        format: &str,
        sep: &str,
        values: &ValueMap<'_>,
        fields: &[Field],
    ) -> &mut Self {
        self.write_sep();
        self.write_format(format, sep, Some(fields), fields.len());
        self.params
            .extend(values.map_to_fields(fields).into_iter().map(Value::sql_value));
        self
    }

    /// Writes a fragment verbatim, without a separator.
    pub fn write_raw(&mut self, s: &str) -> &mut Self {
        self.query.push_str(s);
        self
    }

    /// Inserts a fragment and the separator before the statement.
    pub fn prepend(&mut self, query: &str) -> &mut Self {
        let mut buf = String::with_capacity(query.len() + self.sep.len() + self.query.len());
        buf.push_str(query);
        buf.push_str(&self.sep);
        buf.push_str(&self.query);
        self.query = buf;
        self
    }

    /// Writes the pre-write fragment, if one is set.
    pub fn pre_write(&mut self) -> &mut Self {
        if !self.pre_write.is_empty() {
            self.write_sep();
            self.query.push_str(&self.pre_write);
        }
        self
    }

    /// Sets the fragment written by [`pre_write`](Self::pre_write).
    pub fn set_pre_write(&mut self, s: impl Into<String>) -> &mut Self {
        self.pre_write = s.into();
        self
    }

    /// Sets the separator placed between written fragments.
    pub fn set_separator(&mut self, sep: impl Into<String>) -> &mut Self {
        self.sep = sep.into();
        self
    }

    /// Replaces the dialect.
    pub fn set_dialect(&mut self, dialect: &'a dyn Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Appends parameters.
    pub fn add_params<I, P>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: ToSqlValue,
    {
        self.params
            .extend(params.into_iter().map(ToSqlValue::to_sql_value));
        self
    }

    /// Appends one parameter.
    pub fn add_param(&mut self, param: impl ToSqlValue) -> &mut Self {
        self.params.push(param.to_sql_value());
        self
    }

    /// Returns the accumulated parameters.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns the statement text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.query
    }

    /// Registers a callback run once, after the next statement settles.
    pub fn defer<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&Querier<'_>) + Send + 'a,
    {
        self.deferred.push(Box::new(f));
        self
    }

    /// Like [`defer`](Self::defer), but the callback is skipped when the
    /// statement failed.
    pub fn defer_success<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&Querier<'_>) + Send + 'a,
    {
        self.defer(move |q| {
            if q.err.is_none() {
                f(q);
            }
        })
    }

    /// Executes the statement, recording rows affected and the last insert
    /// id.
    ///
    /// # Panics
    ///
    /// Panics when the statement is empty.
    pub async fn exec(&mut self) -> Result<()> {
        self.assert_statement();
        debug!(sql = %self.query, params = self.params.len(), "Executing statement");

        let result = self.ex.execute(&self.query, &self.params).await;
        let result = result.map(|res| {
            self.rows_affected = res.rows_affected;
            self.last_insert_id = res.last_insert_id;
        });
        self.settle(result)
    }

    /// Runs the query and scans its first row into `record`.
    ///
    /// Returns [`Error::NoRecord`] when the query yields no row. Result
    /// columns without a matching field are discarded.
    ///
    /// # Panics
    ///
    /// Panics when the statement is empty.
    pub async fn first<R: Record>(&mut self, record: &mut R) -> Result<()> {
        let result = match self.query_rows().await {
            Ok(rows) => {
                let (columns, rows) = rows.into_parts();
                rows.into_iter()
                    .next()
                    .ok_or(Error::NoRecord)
                    .and_then(|values| ValueMap::of(record).scan_row(&columns, values))
            }
            Err(err) => Err(err),
        };
        self.settle(result)
    }

    /// Runs the query and appends one record per row to `out`.
    ///
    /// On a scan failure the records scanned so far stay in `out`.
    ///
    /// # Panics
    ///
    /// Panics when the statement is empty.
    pub async fn find<R: Record + Default>(&mut self, out: &mut Vec<R>) -> Result<()> {
        let result = match self.query_rows().await {
            Ok(rows) => {
                let (columns, rows) = rows.into_parts();
                rows.into_iter().try_for_each(|values| {
                    let mut record = R::default();
                    ValueMap::of(&mut record).scan_row(&columns, values)?;
                    out.push(record);
                    Ok(())
                })
            }
            Err(err) => Err(err),
        };
        self.settle(result)
    }

    /// Runs the query and scans the first row into `dest`, one target per
    /// column.
    ///
    /// # Panics
    ///
    /// Panics when the statement is empty.
    pub async fn scan(&mut self, dest: &mut [&mut dyn Value]) -> Result<()> {
        let result = match self.query_rows().await {
            Ok(rows) => {
                let (columns, rows) = rows.into_parts();
                rows.into_iter()
                    .next()
                    .ok_or(Error::NoRecord)
                    .and_then(|values| scan_into(dest, columns.len(), values))
            }
            Err(err) => Err(err),
        };
        self.settle(result)
    }

    /// Runs the query and calls `f` for every row, stopping at the first
    /// error it returns.
    ///
    /// # Panics
    ///
    /// Panics when the statement is empty.
    pub async fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(Row<'_>) -> Result<()>,
    {
        let result = match self.query_rows().await {
            Ok(rows) => rows.iter().try_for_each(&mut f),
            Err(err) => Err(err),
        };
        self.settle(result)
    }

    /// Rows affected by the last executed statement.
    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Row id generated by the last executed statement.
    #[must_use]
    pub const fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// Error of the last statement, if it failed.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Clears the statement, parameters, separator, outcome and pending
    /// callbacks. The executor and dialect are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.query.clear();
        self.params.clear();
        self.pre_write.clear();
        SPACE.clone_into(&mut self.sep);
        self.err = None;
        self.rows_affected = 0;
        self.last_insert_id = None;
        self.deferred.clear();
        self
    }

    async fn query_rows(&mut self) -> Result<Rows> {
        self.assert_statement();
        debug!(sql = %self.query, params = self.params.len(), "Executing query");
        self.ex.query(&self.query, &self.params).await
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        self.err = result.as_ref().err().cloned();
        for f in std::mem::take(&mut self.deferred) {
            f(self);
        }
        result
    }

    fn assert_statement(&self) {
        assert!(!self.query.is_empty(), "query is empty");
    }

    fn write_sep(&mut self) {
        if !self.query.is_empty() {
            self.query.push_str(&self.sep);
        }
    }

    fn write_format(&mut self, format: &str, sep: &str, fields: Option<&[Field]>, count: usize) {
        if count == 0 {
            return;
        }

        let has_name = format.contains(PH_NAME);
        let has_data_type = format.contains(PH_DATA_TYPE);
        let has_bind_var = format.contains(PH_BIND_VAR);

        assert!(
            fields.is_some() || !(has_name || has_data_type),
            "format contains placeholder {PH_NAME} or {PH_DATA_TYPE}, this is not allowed when only formatting values"
        );

        let base = self.params.len();
        for i in 0..count {
            if i > 0 {
                self.query.push_str(sep);
            }
            let mut part = format.to_string();
            if let Some(field) = fields.and_then(|fields| fields.get(i)) {
                if has_name {
                    part = part.replace(PH_NAME, &field.name);
                }
                if has_data_type {
                    part = part.replace(PH_DATA_TYPE, &field.data_type);
                }
            }
            if has_bind_var {
                part = part.replace(PH_BIND_VAR, &self.dialect.bind_var(base + i));
            }
            self.query.push_str(&part);
        }
    }
}

fn scan_into(dest: &mut [&mut dyn Value], columns: usize, values: Vec<SqlValue>) -> Result<()> {
    if dest.len() != columns {
        return Err(Error::ColumnCount {
            columns,
            targets: dest.len(),
        });
    }
    for (target, value) in dest.iter_mut().zip(values) {
        target.scan(value)?;
    }
    Ok(())
}

/// Returns a row callback that collects the first column of every row as a
/// string.
pub fn append_to(out: &mut Vec<String>) -> impl FnMut(Row<'_>) -> Result<()> + Send + '_ {
    move |row| {
        let mut value = String::new();
        value.scan(row.get(0).cloned().unwrap_or(SqlValue::Null))?;
        out.push(value);
        Ok(())
    }
}

impl fmt::Display for Querier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

impl fmt::Debug for Querier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Querier")
            .field("query", &self.query)
            .field("params", &self.params)
            .field("err", &self.err)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}
