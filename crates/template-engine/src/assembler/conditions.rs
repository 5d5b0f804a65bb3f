//! Conditional block guards
//!
//! A guard on an absent (or null) field is always false, whatever the
//! operator. Evaluation never panics.

use serde_json::Value;
use shared_types::{is_filled, BlockCondition, ConditionOperator, FieldValues};

/// Evaluate a block guard against the resolved field values
pub fn evaluate_condition(condition: &BlockCondition, data: &FieldValues) -> bool {
    let actual = match data.get(&condition.field) {
        Some(value) if !value.is_null() => value,
        _ => return false,
    };
    let expected = condition.value.as_ref();

    match condition.operator {
        ConditionOperator::Exists => is_filled(actual),
        ConditionOperator::Equals => expected.is_some_and(|e| values_equal(actual, e)),
        ConditionOperator::NotEquals => match expected {
            Some(e) => !values_equal(actual, e),
            None => true,
        },
        ConditionOperator::GreaterThan => compare_numbers(actual, expected, |a, b| a > b),
        ConditionOperator::LessThan => compare_numbers(actual, expected, |a, b| a < b),
        ConditionOperator::Includes => expected.is_some_and(|e| includes(actual, e)),
    }
}

/// Strict equality, except that numbers compare by numeric value
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_numbers(actual: &Value, expected: Option<&Value>, cmp: fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), expected.and_then(as_number)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Numeric view of a value; numeric strings ("12", "12,5") are accepted
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

/// Substring test for strings, membership test for arrays
fn includes(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::String(haystack) => match expected {
            Value::String(needle) => haystack.contains(needle.as_str()),
            Value::Number(n) => haystack.contains(&n.to_string()),
            _ => false,
        },
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}
