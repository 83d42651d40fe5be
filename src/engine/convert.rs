//! Filter value conversion
//!
//! Per-filter normalization applied while building a where clause:
//! operator translation into the store grammar, date-string normalization
//! for date-typed fields, and enum vocabulary substitution.

use crate::protocol::FilterOperator;
use crate::store::{Condition, Value};
use std::collections::HashMap;

/// Translate a protocol operator into a store condition.
///
/// `eq` carries the value through as plain equality; unrecognized operators
/// deliberately fall back to the same pass-through instead of failing.
pub fn convert_operator(op: &FilterOperator, value: Value) -> Condition {
    match op {
        FilterOperator::Eq => Condition::Equals(value),
        FilterOperator::Neq => Condition::Not(value),
        FilterOperator::Gt => Condition::Gt(value),
        FilterOperator::Gte => Condition::Gte(value),
        FilterOperator::Lt => Condition::Lt(value),
        FilterOperator::Lte => Condition::Lte(value),
        FilterOperator::In => Condition::In(value),
        FilterOperator::Contains => Condition::Contains(value),
        FilterOperator::Unknown(name) => {
            tracing::debug!(op = %name, "Unrecognized filter operator, passing value through");
            Condition::Equals(value)
        }
    }
}

/// Normalize a date string to a fully qualified ISO-8601 datetime.
///
/// Idempotent: an already-qualified input comes back unchanged.
pub fn normalize_date(raw: &str) -> String {
    // Already a full datetime with timezone
    if raw.ends_with('Z') || raw.contains('+') {
        return raw.to_string();
    }
    // Has a time component but no timezone
    if raw.contains('T') {
        if raw.contains('.') {
            return format!("{raw}Z");
        }
        return format!("{raw}.000Z");
    }
    // Bare date
    format!("{raw}T00:00:00.000Z")
}

/// Normalize the date strings inside a condition, if the field is
/// date-typed.
///
/// Each string-valued operand is normalized independently; non-string
/// operands (numbers, arrays) pass through untouched.
pub fn convert_date_condition(
    field: &str,
    condition: Condition,
    date_fields: &[String],
) -> Condition {
    if !date_fields.iter().any(|f| f == field) {
        return condition;
    }
    condition.map(|value| match value {
        Value::String(s) => Value::String(normalize_date(&s)),
        other => other,
    })
}

/// Substitute a protocol enum value with the store's vocabulary.
///
/// Applies only when the value is a string with a mapping configured for
/// this field; everything else passes through unchanged.
pub fn convert_enum_value(
    field: &str,
    value: Value,
    mappings: &HashMap<String, HashMap<String, Value>>,
) -> Value {
    if let Value::String(raw) = &value {
        if let Some(field_mappings) = mappings.get(field) {
            if let Some(mapped) = field_mappings.get(raw) {
                return mapped.clone();
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_operator_eq_passes_through() {
        assert_eq!(
            convert_operator(&FilterOperator::Eq, Value::from("test")),
            Condition::Equals(Value::from("test"))
        );
        assert_eq!(
            convert_operator(&FilterOperator::Eq, Value::Number(42.0)),
            Condition::Equals(Value::Number(42.0))
        );
    }

    #[test]
    fn test_convert_operator_wraps() {
        assert_eq!(
            convert_operator(&FilterOperator::Neq, Value::from("test")),
            Condition::Not(Value::from("test"))
        );
        assert_eq!(
            convert_operator(&FilterOperator::Gt, Value::Number(100.0)),
            Condition::Gt(Value::Number(100.0))
        );
        assert_eq!(
            convert_operator(&FilterOperator::Gte, Value::Number(100.0)),
            Condition::Gte(Value::Number(100.0))
        );
        assert_eq!(
            convert_operator(&FilterOperator::Lt, Value::Number(100.0)),
            Condition::Lt(Value::Number(100.0))
        );
        assert_eq!(
            convert_operator(&FilterOperator::Lte, Value::Number(100.0)),
            Condition::Lte(Value::Number(100.0))
        );
        let items = Value::Array(vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(
            convert_operator(&FilterOperator::In, items.clone()),
            Condition::In(items)
        );
        assert_eq!(
            convert_operator(&FilterOperator::Contains, Value::from("test")),
            Condition::Contains(Value::from("test"))
        );
    }

    #[test]
    fn test_convert_operator_unknown_passes_through() {
        assert_eq!(
            convert_operator(
                &FilterOperator::Unknown("between".into()),
                Value::from("test")
            ),
            Condition::Equals(Value::from("test"))
        );
    }

    #[test]
    fn test_normalize_date_qualified_unchanged() {
        assert_eq!(
            normalize_date("2024-02-01T12:00:00.000Z"),
            "2024-02-01T12:00:00.000Z"
        );
        assert_eq!(
            normalize_date("2024-02-01T12:00:00+09:00"),
            "2024-02-01T12:00:00+09:00"
        );
    }

    #[test]
    fn test_normalize_date_adds_timezone() {
        assert_eq!(
            normalize_date("2024-02-01T12:00:00"),
            "2024-02-01T12:00:00.000Z"
        );
        assert_eq!(
            normalize_date("2024-02-01T12:00:00.123"),
            "2024-02-01T12:00:00.123Z"
        );
    }

    #[test]
    fn test_normalize_date_bare_date() {
        assert_eq!(normalize_date("2024-02-01"), "2024-02-01T00:00:00.000Z");
    }

    #[test]
    fn test_normalize_date_idempotent() {
        for input in ["2024-02-01", "2024-02-01T12:00:00", "2024-02-01T12:00:00.123"] {
            let once = normalize_date(input);
            assert_eq!(normalize_date(&once), once);
        }
    }

    fn date_fields() -> Vec<String> {
        vec!["date".to_string()]
    }

    #[test]
    fn test_convert_date_condition_non_date_field_untouched() {
        let cond = Condition::Equals(Value::from("test"));
        assert_eq!(
            convert_date_condition("name", cond.clone(), &date_fields()),
            cond
        );
    }

    #[test]
    fn test_convert_date_condition_normalizes_strings() {
        assert_eq!(
            convert_date_condition(
                "date",
                Condition::Equals(Value::from("2024-02-01")),
                &date_fields()
            ),
            Condition::Equals(Value::from("2024-02-01T00:00:00.000Z"))
        );
        assert_eq!(
            convert_date_condition(
                "date",
                Condition::Lt(Value::from("2024-12-31")),
                &date_fields()
            ),
            Condition::Lt(Value::from("2024-12-31T00:00:00.000Z"))
        );
    }

    #[test]
    fn test_convert_date_condition_non_string_operand_untouched() {
        assert_eq!(
            convert_date_condition(
                "date",
                Condition::Gt(Value::Number(100.0)),
                &date_fields()
            ),
            Condition::Gt(Value::Number(100.0))
        );
    }

    #[test]
    fn test_convert_date_condition_custom_field() {
        let fields = vec!["customDate".to_string()];
        assert_eq!(
            convert_date_condition(
                "customDate",
                Condition::Equals(Value::from("2024-02-01")),
                &fields
            ),
            Condition::Equals(Value::from("2024-02-01T00:00:00.000Z"))
        );
    }

    fn enum_mappings() -> HashMap<String, HashMap<String, Value>> {
        let mut type_map = HashMap::new();
        type_map.insert("expense".to_string(), Value::from("EXPENSE"));
        type_map.insert("income".to_string(), Value::from("INCOME"));
        let mut mappings = HashMap::new();
        mappings.insert("type".to_string(), type_map);
        mappings
    }

    #[test]
    fn test_convert_enum_value_mapped() {
        assert_eq!(
            convert_enum_value("type", Value::from("expense"), &enum_mappings()),
            Value::from("EXPENSE")
        );
    }

    #[test]
    fn test_convert_enum_value_unmapped_passes_through() {
        let mappings = enum_mappings();
        assert_eq!(
            convert_enum_value("type", Value::from("unknown"), &mappings),
            Value::from("unknown")
        );
        assert_eq!(
            convert_enum_value("status", Value::from("active"), &mappings),
            Value::from("active")
        );
        assert_eq!(
            convert_enum_value("type", Value::Number(123.0), &mappings),
            Value::Number(123.0)
        );
    }
}
