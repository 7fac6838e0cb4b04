//! MySQL column decoding.
//!
//! Fetched rows come back as [`Record`]s: an ordered mapping from column
//! name to [`Value`], insertion order matching the select list. Decoding is
//! two-phase: the column's reported type name is classified into a
//! [`TypeCategory`], then a category-specific decoder extracts the value.

use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};

use crate::model::Record;
use crate::value::Value;

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Binary,
    Text,
}

/// Classify a MySQL type name into a logical category.
pub(crate) fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("int") || lower.contains("serial") || lower.contains("tiny") {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    // varchar, text, char, date, time, enum, ...
    TypeCategory::Text
}

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
struct RawDecimal(String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Decode a full row into a record, preserving select-list column order.
pub(crate) fn decode_row(row: &MySqlRow) -> Record {
    let mut record = Record::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let category = categorize_type(col.type_info().name());
        record.insert(col.name(), decode_column(row, idx, category));
    }
    record
}

fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> Value {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Binary => decode_binary(row, idx),
        TypeCategory::Text => decode_text(row, idx),
    }
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> Value {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => Value::String(v.0),
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::error!("Failed to decode DECIMAL: {:?}", e);
            Value::Null
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> Value {
    // Check NULL first
    if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
        return Value::Null;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return Value::Int(v);
    }
    // Unsigned columns that don't decode as i64
    if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
        return Value::Int(v as i64);
    }
    Value::Null
}

fn decode_boolean(row: &MySqlRow, idx: usize) -> Value {
    row.try_get::<Option<bool>, _>(idx)
        .ok()
        .flatten()
        .map(Value::Bool)
        .unwrap_or(Value::Null)
}

fn decode_float(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return Value::Float(v);
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return Value::Float(v as f64);
    }
    Value::Null
}

fn decode_binary(row: &MySqlRow, idx: usize) -> Value {
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .ok()
        .flatten()
        .map(Value::Bytes)
        .unwrap_or(Value::Null)
}

fn decode_text(row: &MySqlRow, idx: usize) -> Value {
    row.try_get::<Option<String>, _>(idx)
        .ok()
        .flatten()
        .map(Value::String)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_integer_types() {
        assert_eq!(categorize_type("BIGINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("INT UNSIGNED"), TypeCategory::Integer);
        assert_eq!(categorize_type("TINYINT"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_boolean_before_integer() {
        // MySQL reports tinyint(1) as BOOLEAN
        assert_eq!(categorize_type("BOOLEAN"), TypeCategory::Boolean);
    }

    #[test]
    fn test_categorize_misc_types() {
        assert_eq!(categorize_type("DECIMAL"), TypeCategory::Decimal);
        assert_eq!(categorize_type("DOUBLE"), TypeCategory::Float);
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
        assert_eq!(categorize_type("BLOB"), TypeCategory::Binary);
        assert_eq!(categorize_type("DATETIME"), TypeCategory::Text);
    }
}
