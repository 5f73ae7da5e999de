//! Value conversion between sqlorm and SQLite.
//!
//! SQLite has five storage classes (NULL, INTEGER, REAL, TEXT, BLOB).
//! Booleans bind as 0/1; arrays must be expanded by the statement factory
//! before they reach the driver.

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use sqlorm_core::Value;

/// A borrowed [`Value`] bindable as a statement parameter.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Value::Bool(b) => Ok(ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b)))),
            Value::Int(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::Float(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            Value::Bytes(b) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(b))),
            Value::Array(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "list values must be expanded into one placeholder per item".into(),
            )),
        }
    }
}

/// Convert a column value read from SQLite.
pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_binds_as_integer() {
        let value = Value::Bool(true);
        match Param(&value).to_sql().unwrap() {
            ToSqlOutput::Owned(SqlValue::Integer(1)) => {}
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn test_array_is_rejected() {
        let value = Value::Array(vec![Value::Int(1)]);
        assert!(Param(&value).to_sql().is_err());
    }

    #[test]
    fn test_from_value_ref() {
        assert_eq!(from_value_ref(ValueRef::Null), Value::Null);
        assert_eq!(from_value_ref(ValueRef::Integer(7)), Value::Int(7));
        assert_eq!(from_value_ref(ValueRef::Real(1.5)), Value::Float(1.5));
        assert_eq!(
            from_value_ref(ValueRef::Text(b"blog")),
            Value::Text("blog".to_string())
        );
        assert_eq!(
            from_value_ref(ValueRef::Blob(&[0, 1])),
            Value::Bytes(vec![0, 1])
        );
    }
}
