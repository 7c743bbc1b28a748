//! Per-type column value checks
//!
//! [`check_value`] decides whether a weakly-typed JSON value is storable in
//! a column: nullability, exact type match (no implicit coercion between
//! strings and numbers), declared length for textual types, integer range,
//! and temporal/UUID formats. The check is pure and deterministic; an
//! unacceptable value is reported as a message, never as a panic or abort.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use uuid::Uuid;

use super::types::{ColumnDescriptor, ColumnType};

/// Validate a value against a column's declared type and constraints.
///
/// Returns a field-scoped message on rejection; the caller attaches the
/// field name.
pub fn check_value(column: &ColumnDescriptor, value: &Value) -> Result<(), String> {
    if value.is_null() {
        if column.nullable {
            return Ok(());
        }
        return Err(format!("column '{}' does not allow NULL", column.name));
    }

    match column.column_type {
        ColumnType::Varchar | ColumnType::Char | ColumnType::Text => {
            let text = expect_str(column, value)?;
            if let Some(max_length) = column.max_length {
                let length = text.chars().count();
                if length > max_length {
                    return Err(format!(
                        "value for column '{}' exceeds maximum length {} (got {})",
                        column.name, max_length, length
                    ));
                }
            }
            Ok(())
        }
        ColumnType::Int => {
            let number = value
                .as_i64()
                .ok_or_else(|| type_mismatch(column, value))?;
            if number < i64::from(i32::MIN) || number > i64::from(i32::MAX) {
                return Err(format!(
                    "value {} out of range for column '{}' (int)",
                    number, column.name
                ));
            }
            Ok(())
        }
        ColumnType::BigInt => {
            if value.is_i64() || value.is_u64() {
                Ok(())
            } else {
                Err(type_mismatch(column, value))
            }
        }
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal => {
            if value.is_number() {
                Ok(())
            } else {
                Err(type_mismatch(column, value))
            }
        }
        ColumnType::Bool => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(type_mismatch(column, value))
            }
        }
        ColumnType::Date => {
            let text = expect_str(column, value)?;
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| {
                    format!(
                        "value for column '{}' is not a valid date (expected YYYY-MM-DD)",
                        column.name
                    )
                })
        }
        ColumnType::DateTime | ColumnType::Timestamp => {
            let text = expect_str(column, value)?;
            if DateTime::parse_from_rfc3339(text).is_ok()
                || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
            {
                Ok(())
            } else {
                Err(format!(
                    "value for column '{}' is not a valid datetime",
                    column.name
                ))
            }
        }
        ColumnType::Uuid => {
            let text = expect_str(column, value)?;
            Uuid::parse_str(text).map(|_| ()).map_err(|_| {
                format!("value for column '{}' is not a valid UUID", column.name)
            })
        }
        // Any JSON document is storable as-is
        ColumnType::Json => Ok(()),
    }
}

fn expect_str<'a>(column: &ColumnDescriptor, value: &'a Value) -> Result<&'a str, String> {
    value.as_str().ok_or_else(|| type_mismatch(column, value))
}

fn type_mismatch(column: &ColumnDescriptor, value: &Value) -> String {
    format!(
        "column '{}' expects {}, got {}",
        column.name,
        column.column_type.type_name(),
        json_type_name(value)
    )
}

/// Returns the JSON type name for error messages
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(column_type: ColumnType) -> ColumnDescriptor {
        ColumnDescriptor::new("c", column_type).not_null()
    }

    #[test]
    fn test_null_rejected_on_not_null_column() {
        let result = check_value(&column(ColumnType::Varchar), &Value::Null);
        assert!(result.unwrap_err().contains("NULL"));
    }

    #[test]
    fn test_null_accepted_on_nullable_column() {
        let nullable = ColumnDescriptor::new("c", ColumnType::Varchar);
        assert!(check_value(&nullable, &Value::Null).is_ok());
    }

    #[test]
    fn test_varchar_length_limit() {
        let col = column(ColumnType::Varchar).with_max_length(5);
        assert!(check_value(&col, &json!("hello")).is_ok());
        assert!(check_value(&col, &json!("hello!")).is_err());
    }

    #[test]
    fn test_varchar_length_counts_chars_not_bytes() {
        let col = column(ColumnType::Varchar).with_max_length(3);
        // 3 characters, 6 bytes
        assert!(check_value(&col, &json!("äöü")).is_ok());
    }

    #[test]
    fn test_varchar_rejects_number() {
        let err = check_value(&column(ColumnType::Varchar), &json!(5)).unwrap_err();
        assert!(err.contains("expects varchar"));
        assert!(err.contains("got int"));
    }

    #[test]
    fn test_int_range() {
        let col = column(ColumnType::Int);
        assert!(check_value(&col, &json!(42)).is_ok());
        assert!(check_value(&col, &json!(i64::from(i32::MAX))).is_ok());
        assert!(check_value(&col, &json!(i64::from(i32::MAX) + 1)).is_err());
        assert!(check_value(&col, &json!(2.5)).is_err());
    }

    #[test]
    fn test_bigint_accepts_large_integers() {
        let col = column(ColumnType::BigInt);
        assert!(check_value(&col, &json!(i64::MAX)).is_ok());
        assert!(check_value(&col, &json!(2.5)).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        let col = column(ColumnType::Double);
        assert!(check_value(&col, &json!(100)).is_ok());
        assert!(check_value(&col, &json!(99.5)).is_ok());
        assert!(check_value(&col, &json!("99.5")).is_err());
    }

    #[test]
    fn test_bool() {
        let col = column(ColumnType::Bool);
        assert!(check_value(&col, &json!(true)).is_ok());
        assert!(check_value(&col, &json!(1)).is_err());
    }

    #[test]
    fn test_date_format() {
        let col = column(ColumnType::Date);
        assert!(check_value(&col, &json!("2024-02-29")).is_ok());
        assert!(check_value(&col, &json!("2023-02-29")).is_err());
        assert!(check_value(&col, &json!("29/02/2024")).is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let col = column(ColumnType::DateTime);
        assert!(check_value(&col, &json!("2024-05-01T10:30:00Z")).is_ok());
        assert!(check_value(&col, &json!("2024-05-01 10:30:00")).is_ok());
        assert!(check_value(&col, &json!("yesterday")).is_err());
    }

    #[test]
    fn test_uuid() {
        let col = column(ColumnType::Uuid);
        assert!(check_value(&col, &json!("550e8400-e29b-41d4-a716-446655440000")).is_ok());
        assert!(check_value(&col, &json!("not-a-uuid")).is_err());
    }

    #[test]
    fn test_json_accepts_any_value() {
        let col = column(ColumnType::Json);
        assert!(check_value(&col, &json!({"a": [1, 2]})).is_ok());
        assert!(check_value(&col, &json!("plain string")).is_ok());
    }
}
