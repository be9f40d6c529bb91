//! Query filter evaluation against raw documents.

use crate::core::types::RawDocument;
use regex::RegexBuilder;
use serde_json::Value;
use std::cmp::Ordering;

/// Values stored at a dotted path. Arrays along the way are traversed, so a
/// path may resolve to several values.
pub fn resolve_path<'a>(document: &'a RawDocument, path: &str) -> Vec<&'a Value> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Vec::new();
    };
    let mut current: Vec<&Value> = document.get(first).into_iter().collect();

    for segment in segments {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(fields) => next.extend(fields.get(segment)),
                Value::Array(items) => {
                    if let Ok(index) = segment.parse::<usize>() {
                        next.extend(items.get(index));
                    }
                    for item in items {
                        if let Value::Object(fields) = item {
                            next.extend(fields.get(segment));
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
}

/// Evaluate `filter` against `document`.
///
/// Errors carry a message for the server's `errmsg`.
pub fn matches(document: &RawDocument, filter: &RawDocument) -> Result<bool, String> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => all_clauses(document, condition, key)?.iter().all(|m| *m),
            "$or" => all_clauses(document, condition, key)?.iter().any(|m| *m),
            "$nor" => !all_clauses(document, condition, key)?.iter().any(|m| *m),
            "$comment" => true,
            op if op.starts_with('$') => return Err(format!("unknown top level operator: {op}")),
            path => matches_condition(&resolve_path(document, path), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_clauses(document: &RawDocument, clauses: &Value, op: &str) -> Result<Vec<bool>, String> {
    let Value::Array(clauses) = clauses else {
        return Err(format!("{op} must be an array"));
    };
    if clauses.is_empty() {
        return Err(format!("{op} must be a nonempty array"));
    }
    clauses
        .iter()
        .map(|clause| match clause {
            Value::Object(clause) => matches(document, clause),
            _ => Err(format!("{op} entries need to be full objects")),
        })
        .collect()
}

fn is_operator_object(value: &Value) -> bool {
    match value {
        Value::Object(fields) => !fields.is_empty() && fields.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

fn matches_condition(values: &[&Value], condition: &Value) -> Result<bool, String> {
    match condition {
        Value::Object(operators) if is_operator_object(condition) => {
            for (op, operand) in operators {
                if !matches_operator(values, op, operand, operators)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(equals_any(values, condition)),
    }
}

fn matches_operator(
    values: &[&Value],
    op: &str,
    operand: &Value,
    siblings: &RawDocument,
) -> Result<bool, String> {
    let matched = match op {
        "$eq" => equals_any(values, operand),
        "$ne" => !equals_any(values, operand),
        "$gt" => compares_any(values, operand, |o| o == Ordering::Greater),
        "$gte" => compares_any(values, operand, |o| o != Ordering::Less),
        "$lt" => compares_any(values, operand, |o| o == Ordering::Less),
        "$lte" => compares_any(values, operand, |o| o != Ordering::Greater),
        "$in" => list_operand(op, operand)?
            .iter()
            .any(|candidate| equals_any(values, candidate)),
        "$nin" => !list_operand(op, operand)?
            .iter()
            .any(|candidate| equals_any(values, candidate)),
        "$all" => {
            let wanted = list_operand(op, operand)?;
            !wanted.is_empty() && wanted.iter().all(|candidate| equals_any(values, candidate))
        }
        "$exists" => {
            let wanted = operand.as_bool().unwrap_or(true);
            values.is_empty() != wanted
        }
        "$size" => {
            let Some(size) = operand.as_u64() else {
                return Err("$size needs a number".to_string());
            };
            values
                .iter()
                .any(|value| matches!(value, Value::Array(items) if items.len() as u64 == size))
        }
        "$not" => {
            if !is_operator_object(operand) {
                return Err("$not needs a regex or a document".to_string());
            }
            !matches_condition(values, operand)?
        }
        "$regex" => {
            let Some(pattern) = operand.as_str() else {
                return Err("$regex has to be a string".to_string());
            };
            let options = siblings
                .get("$options")
                .and_then(Value::as_str)
                .unwrap_or("");
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(options.contains('i'))
                .multi_line(options.contains('m'))
                .dot_matches_new_line(options.contains('s'))
                .ignore_whitespace(options.contains('x'))
                .build()
                .map_err(|e| format!("invalid regex: {e}"))?;
            expand(values).any(|value| value.as_str().is_some_and(|text| regex.is_match(text)))
        }
        "$elemMatch" => elem_match(values, operand)?,
        // Only meaningful next to $regex
        "$options" => true,
        other => return Err(format!("unknown operator: {other}")),
    };
    Ok(matched)
}

/// Any element of a stored array satisfies `query`: an operator object
/// against the element itself, or a filter against sub-documents.
fn elem_match(values: &[&Value], query: &Value) -> Result<bool, String> {
    let Value::Object(filter) = query else {
        return Err("$elemMatch needs an Object".to_string());
    };
    let operator_form = is_operator_object(query);

    for value in values {
        let Value::Array(elements) = value else {
            continue;
        };
        for element in elements {
            let matched = match element {
                _ if operator_form => matches_condition(&[element], query)?,
                Value::Object(sub_document) => matches(sub_document, filter)?,
                _ => false,
            };
            if matched {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn list_operand<'a>(op: &str, operand: &'a Value) -> Result<&'a Vec<Value>, String> {
    operand
        .as_array()
        .ok_or_else(|| format!("{op} needs an array"))
}

/// Each stored value, plus the elements of stored arrays.
fn expand<'a>(values: &'a [&'a Value]) -> impl Iterator<Item = &'a Value> + 'a {
    values.iter().copied().flat_map(|value| {
        let elements: &'a [Value] = match value {
            Value::Array(items) => items,
            _ => &[],
        };
        std::iter::once(value).chain(elements)
    })
}

fn equals_any(values: &[&Value], wanted: &Value) -> bool {
    if wanted.is_null() && values.is_empty() {
        return true;
    }
    expand(values).any(|value| values_equal(value, wanted))
}

fn compares_any(values: &[&Value], bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    expand(values).any(|value| compare(value, bound).is_some_and(&accept))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between values of the same kind; `None` across kinds.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
