//! SQL values, parameter conversion and scan targets.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// A SQL value that can be used as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Unsigned integer value, kept apart so values above `i64::MAX` never
    /// wrap.
    UInt(u64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Returns a short name for the kind of value, used in scan errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int(_) => "INT",
            Self::UInt(_) => "UINT",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Returns whether this is `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Trait for types that can be converted to SQL parameters.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl<T: Value> ToSqlValue for &T {
    fn to_sql_value(self) -> SqlValue {
        self.sql_value()
    }
}

/// A live storage location that can be bound as a parameter and scanned into.
///
/// This is the "scan from SQL" capability: any type implementing `Value`
/// can be a column of a record, and is never flattened.
pub trait Value: Send + Sync {
    /// Returns the current value as a SQL parameter.
    fn sql_value(&self) -> SqlValue;

    /// Stores a value read from a result row.
    fn scan(&mut self, value: SqlValue) -> Result<()>;
}

fn mismatch<T>(found: &SqlValue) -> Error {
    Error::Scan {
        expected: std::any::type_name::<T>(),
        found: found.kind(),
    }
}

macro_rules! impl_value_int {
    ($variant:ident as $wide:ty: $($ty:ty),+) => {
        $(
            impl Value for $ty {
                #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
                fn sql_value(&self) -> SqlValue {
                    SqlValue::$variant(*self as $wide)
                }

                fn scan(&mut self, value: SqlValue) -> Result<()> {
                    match value {
                        SqlValue::Int(n) => {
                            *self = <$ty>::try_from(n).map_err(|_| mismatch::<$ty>(&value))?;
                            Ok(())
                        }
                        SqlValue::UInt(n) => {
                            *self = <$ty>::try_from(n).map_err(|_| mismatch::<$ty>(&value))?;
                            Ok(())
                        }
                        SqlValue::Bool(b) => {
                            *self = <$ty>::from(b);
                            Ok(())
                        }
                        other => Err(mismatch::<$ty>(&other)),
                    }
                }
            }

            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    self.sql_value()
                }
            }
        )+
    };
}

impl_value_int!(Int as i64: i8, i16, i32, i64, isize);
impl_value_int!(UInt as u64: u8, u16, u32, u64, usize);

macro_rules! impl_value_float {
    ($($ty:ty),+) => {
        $(
            impl Value for $ty {
                fn sql_value(&self) -> SqlValue {
                    SqlValue::Float(f64::from(*self))
                }

                #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                fn scan(&mut self, value: SqlValue) -> Result<()> {
                    match value {
                        SqlValue::Float(f) => {
                            *self = f as $ty;
                            Ok(())
                        }
                        SqlValue::Int(n) => {
                            *self = n as $ty;
                            Ok(())
                        }
                        SqlValue::UInt(n) => {
                            *self = n as $ty;
                            Ok(())
                        }
                        other => Err(mismatch::<$ty>(&other)),
                    }
                }
            }

            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    self.sql_value()
                }
            }
        )+
    };
}

impl_value_float!(f32, f64);

impl Value for bool {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Bool(b) => *self = b,
            // Drivers without a native boolean report 0/1.
            SqlValue::Int(n) => *self = n != 0,
            SqlValue::UInt(n) => *self = n != 0,
            other => return Err(mismatch::<Self>(&other)),
        }
        Ok(())
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl Value for String {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Text(s) => *self = s,
            SqlValue::Blob(b) => {
                *self = String::from_utf8(b).map_err(|_| Error::Scan {
                    expected: "String",
                    found: "BLOB",
                })?;
            }
            other => return Err(mismatch::<Self>(&other)),
        }
        Ok(())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl Value for Vec<u8> {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Blob(b) => *self = b,
            SqlValue::Text(s) => *self = s.into_bytes(),
            // The default byte column is nullable; NULL reads as empty.
            SqlValue::Null => self.clear(),
            other => return Err(mismatch::<Self>(&other)),
        }
        Ok(())
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

impl Value for NaiveDateTime {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Timestamp(ts) => *self = ts,
            SqlValue::Text(ref s) => {
                *self = parse_timestamp(s).ok_or_else(|| mismatch::<Self>(&value))?;
            }
            other => return Err(mismatch::<Self>(&other)),
        }
        Ok(())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl Value for DateTime<Utc> {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.naive_utc())
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        let mut naive = self.naive_utc();
        naive.scan(value)?;
        *self = naive.and_utc();
        Ok(())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self.naive_utc())
    }
}

impl<T: Value + Default> Value for Option<T> {
    fn sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, Value::sql_value)
    }

    fn scan(&mut self, value: SqlValue) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.scan(value)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<T: Value + Default> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.sql_value()
    }
}

/// Scan target for values nobody asked for; binds as NULL.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ignore;

impl Value for Ignore {
    fn sql_value(&self) -> SqlValue {
        SqlValue::Null
    }

    fn scan(&mut self, _value: SqlValue) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_int_scan_checks_range() {
        let mut small: i8 = 0;
        small.scan(SqlValue::Int(42)).unwrap();
        assert_eq!(small, 42);

        let err = small.scan(SqlValue::Int(1_000)).unwrap_err();
        assert!(matches!(err, Error::Scan { found: "INT", .. }));
    }

    #[test]
    fn test_unsigned_keeps_high_values() {
        let big = u64::MAX - 1;
        assert_eq!(big.sql_value(), SqlValue::UInt(18_446_744_073_709_551_614));

        let mut back: u64 = 0;
        back.scan(big.sql_value()).unwrap();
        assert_eq!(back, big);

        let mut signed: i64 = 0;
        let err = signed.scan(SqlValue::UInt(big)).unwrap_err();
        assert!(matches!(err, Error::Scan { found: "UINT", .. }));

        // Drivers hand unsigned columns back as signed when they fit.
        back.scan(SqlValue::Int(7)).unwrap();
        assert_eq!(back, 7);
        let err = back.scan(SqlValue::Int(-1)).unwrap_err();
        assert!(matches!(err, Error::Scan { found: "INT", .. }));
    }

    #[test]
    fn test_bool_from_int() {
        let mut flag = false;
        flag.scan(SqlValue::Int(1)).unwrap();
        assert!(flag);
        flag.scan(SqlValue::Int(0)).unwrap();
        assert!(!flag);
    }

    #[test]
    fn test_null_into_non_option_fails() {
        let mut name = String::new();
        let err = name.scan(SqlValue::Null).unwrap_err();
        assert!(matches!(err, Error::Scan { found: "NULL", .. }));
    }

    #[test]
    fn test_option_scan() {
        let mut age: Option<i64> = Some(3);
        age.scan(SqlValue::Null).unwrap();
        assert_eq!(age, None);
        age.scan(SqlValue::Int(7)).unwrap();
        assert_eq!(age, Some(7));
        assert_eq!(age.sql_value(), SqlValue::Int(7));
        assert_eq!(None::<i64>.sql_value(), SqlValue::Null);
    }

    #[test]
    fn test_timestamp_from_text() {
        let mut ts = NaiveDateTime::default();
        ts.scan(SqlValue::Text("2024-03-01 12:30:00".to_string()))
            .unwrap();
        let want = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(ts, want);

        assert!(ts.scan(SqlValue::Text("yesterday".to_string())).is_err());
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
        assert_eq!((&String::from("x")).to_sql_value(), SqlValue::Text("x".into()));
    }

    #[test]
    fn test_ignore_discards() {
        let mut ignore = Ignore;
        ignore.scan(SqlValue::Text("anything".into())).unwrap();
        assert_eq!(ignore.sql_value(), SqlValue::Null);
    }
}
