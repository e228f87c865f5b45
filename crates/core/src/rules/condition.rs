//! Condition evaluation against a serialized rule context.
//!
//! Rule data is authored by people, so nothing here errors: a missing field,
//! an unknown operator or a bad regex simply makes the condition false.

use regex::Regex;
use serde_json::Value;

use super::model::{ConditionOperator, RuleCondition};

/// Numbers closer than this compare equal.
const NUMERIC_EPSILON: f64 = 1e-9;

/// Follow a dotted path (`wardrobe.door_type_finishes.double.chrome`).
/// Array segments may be addressed by index.
pub fn resolve_field<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Evaluate a condition list as a strict left fold: each condition's own
/// `logic_operator` joins the result so far with the next condition.
/// An empty list matches.
pub fn conditions_match(conditions: &[RuleCondition], context: &Value) -> bool {
    let mut iter = conditions.iter();
    let Some(first) = iter.next() else {
        return true;
    };
    let mut result = evaluate_condition(first, context);
    let mut join = first.logic_operator;
    for condition in iter {
        result = join.combine(result, evaluate_condition(condition, context));
        join = condition.logic_operator;
    }
    result
}

pub fn evaluate_condition(condition: &RuleCondition, context: &Value) -> bool {
    let Some(actual) = resolve_field(context, &condition.field) else {
        tracing::debug!(field = %condition.field, "Rule condition references unknown field");
        return false;
    };
    let expected = &condition.value;

    match condition.operator {
        ConditionOperator::Equals => values_equal(actual, expected),
        ConditionOperator::NotEquals => !values_equal(actual, expected),
        ConditionOperator::GreaterThan => compare(actual, expected).is_some_and(|o| o.is_gt()),
        ConditionOperator::GreaterThanOrEqual => {
            compare(actual, expected).is_some_and(|o| o.is_ge())
        }
        ConditionOperator::LessThan => compare(actual, expected).is_some_and(|o| o.is_lt()),
        ConditionOperator::LessThanOrEqual => compare(actual, expected).is_some_and(|o| o.is_le()),
        ConditionOperator::Contains => contains(actual, expected),
        ConditionOperator::NotContains => !contains(actual, expected),
        ConditionOperator::In => is_in(actual, expected),
        ConditionOperator::NotIn => !is_in(actual, expected),
        ConditionOperator::IsEmpty => is_empty(actual),
        ConditionOperator::IsNotEmpty => !is_empty(actual),
        ConditionOperator::Matches => matches(actual, expected),
        ConditionOperator::Unknown => {
            tracing::debug!(field = %condition.field, "Rule condition uses unknown operator");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

/// Numbers, and strings that parse as finite numbers.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return (x - y).abs() < NUMERIC_EPSILON;
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.trim().to_lowercase() == y.trim().to_lowercase(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    let (x, y) = (as_number(a)?, as_number(b)?);
    if (x - y).abs() < NUMERIC_EPSILON {
        Some(std::cmp::Ordering::Equal)
    } else {
        x.partial_cmp(&y)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Array membership, case-insensitive substring, or object key presence.
fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::String(s) => text_of(needle).is_some_and(|n| s.to_lowercase().contains(&n)),
        Value::Object(map) => needle
            .as_str()
            .is_some_and(|key| map.contains_key(key) || map.contains_key(&key.to_lowercase())),
        _ => false,
    }
}

/// Membership in a list given as an array or a comma-separated string.
/// An array field matches when any of its elements is in the list.
fn is_in(actual: &Value, list: &Value) -> bool {
    let options: Vec<Value> = match list {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(|part| Value::String(part.trim().to_string()))
            .collect(),
        _ => return false,
    };
    match actual {
        Value::Array(items) => items
            .iter()
            .any(|item| options.iter().any(|o| values_equal(item, o))),
        _ => options.iter().any(|o| values_equal(actual, o)),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn matches(actual: &Value, pattern: &Value) -> bool {
    let (Some(text), Some(pattern)) = (actual_text(actual), pattern.as_str()) else {
        return false;
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&text),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Invalid regex in rule condition");
            false
        }
    }
}

/// Like [`text_of`] but keeps the original case for regex matching.
fn actual_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => text_of(other),
    }
}
