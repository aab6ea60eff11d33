//! Conversions between Polars values and SQLite values.

use polars::prelude::{AnyValue, Column, DataType};
use rusqlite::types::Value;

/// Declared SQL type for a column of `dtype`.
pub(crate) fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => "INTEGER",
        DataType::Float32 | DataType::Float64 => "REAL",
        _ => "TEXT",
    }
}

pub(crate) fn to_sql_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Integer(i64::from(b)),
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Real(v as f64),
        },
        AnyValue::Float32(v) => Value::Real(f64::from(v)),
        AnyValue::Float64(v) if v.is_nan() => Value::Null,
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        other => Value::Text(other.to_string()),
    }
}

/// Column type inferred from stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Integer,
    Real,
    Text,
}

fn infer(values: &[Value], declared: &str) -> Inferred {
    let mut inferred: Option<Inferred> = None;
    for value in values {
        let kind = match value {
            Value::Null => continue,
            Value::Integer(_) => Inferred::Integer,
            Value::Real(_) => Inferred::Real,
            Value::Text(_) | Value::Blob(_) => return Inferred::Text,
        };
        inferred = Some(match (inferred, kind) {
            (None, kind) => kind,
            (Some(Inferred::Integer), Inferred::Integer) => Inferred::Integer,
            _ => Inferred::Real,
        });
    }
    inferred.unwrap_or_else(|| {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            Inferred::Integer
        } else if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB")
        {
            Inferred::Real
        } else {
            Inferred::Text
        }
    })
}

/// Build a column from stored values: `Int64` when every value is an
/// integer, `Float64` when all are numeric, otherwise `String`.
///
/// Columns with only nulls fall back to the declared SQL type.
pub(crate) fn column_from_values(name: &str, values: &[Value], declared: &str) -> Column {
    match infer(values, declared) {
        Inferred::Integer => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::Integer(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), data)
        }
        Inferred::Real => {
            let data: Vec<Option<f64>> = values
                .iter()
                .map(|value| match value {
                    Value::Integer(v) => Some(*v as f64),
                    Value::Real(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), data)
        }
        Inferred::Text => {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|value| match value {
                    Value::Null => None,
                    Value::Integer(v) => Some(v.to_string()),
                    Value::Real(v) => Some(v.to_string()),
                    Value::Text(s) => Some(s.clone()),
                    Value::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                })
                .collect();
            Column::new(name.into(), data)
        }
    }
}
