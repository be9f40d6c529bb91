//! Filter casting.
//!
//! Filters arrive in the query dialect of the document database and are cast
//! through the schema's field types before they are placed in a command, so
//! `{ "array": [1] }` against an array of strings becomes `{ "array": ["1"] }`.

use super::{FieldType, Schema};
use crate::core::error::{DoctextError, Result};
use crate::core::types::RawDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

static OBJECT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());

impl Schema {
    /// Cast a filter document through this schema.
    ///
    /// Undeclared paths are left as they are. Logical operators (`$and`,
    /// `$or`, `$nor`) are cast clause by clause; `$elemMatch` is cast
    /// against the element type of its array.
    ///
    /// # Errors
    ///
    /// - [`DoctextError::Cast`] when a value cannot be converted to its path's type
    /// - [`DoctextError::InvalidFilter`] for unknown operators or malformed operands
    pub fn cast_filter(&self, filter: &RawDocument) -> Result<RawDocument> {
        let mut cast = RawDocument::new();

        for (key, value) in filter {
            let value = match key.as_str() {
                "$and" | "$or" | "$nor" => Value::Array(self.cast_clauses(key, value)?),
                "$comment" => value.clone(),
                op if op.starts_with('$') => {
                    return Err(DoctextError::InvalidFilter(format!(
                        "unsupported top-level operator {op}"
                    )));
                }
                path => self.cast_condition(path, value)?,
            };
            cast.insert(key.clone(), value);
        }

        Ok(cast)
    }

    fn cast_clauses(&self, op: &str, value: &Value) -> Result<Vec<Value>> {
        let clauses = match value.as_array() {
            Some(clauses) if !clauses.is_empty() => clauses,
            _ => {
                return Err(DoctextError::InvalidFilter(format!(
                    "{op} must be a nonempty array"
                )));
            }
        };

        clauses
            .iter()
            .map(|clause| {
                let clause = clause.as_object().ok_or_else(|| {
                    DoctextError::InvalidFilter(format!("{op} entries must be objects"))
                })?;
                Ok(Value::Object(self.cast_filter(clause)?))
            })
            .collect()
    }

    fn cast_condition(&self, path: &str, value: &Value) -> Result<Value> {
        let kind = self.field_type(path);
        match value {
            Value::Object(ops) if is_operator_object(ops) => {
                Ok(Value::Object(self.cast_operators(path, kind, ops)?))
            }
            _ => cast_value(path, kind, value),
        }
    }

    fn cast_operators(
        &self,
        path: &str,
        kind: &FieldType,
        ops: &RawDocument,
    ) -> Result<RawDocument> {
        let mut cast = RawDocument::new();

        for (op, operand) in ops {
            let value = match op.as_str() {
                "$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte" => {
                    cast_value(path, kind, operand)?
                }
                "$in" | "$nin" | "$all" => {
                    let items = operand.as_array().ok_or_else(|| {
                        DoctextError::InvalidFilter(format!(
                            "{op} needs an array at path \"{path}\""
                        ))
                    })?;
                    let items = items
                        .iter()
                        .map(|item| cast_value(path, kind, item))
                        .collect::<Result<Vec<_>>>()?;
                    Value::Array(items)
                }
                "$exists" => Value::Bool(
                    cast_boolean(operand).ok_or_else(|| cast_error(path, "Boolean", operand))?,
                ),
                "$size" => match operand.as_u64() {
                    Some(size) => Value::from(size),
                    None => return Err(cast_error(path, "Number", operand)),
                },
                "$not" => match operand {
                    Value::Object(inner) if is_operator_object(inner) => {
                        Value::Object(self.cast_operators(path, kind, inner)?)
                    }
                    _ => {
                        return Err(DoctextError::InvalidFilter(format!(
                            "$not needs an operator object at path \"{path}\""
                        )));
                    }
                },
                "$elemMatch" => Value::Object(self.cast_elem_match(path, kind, operand)?),
                "$regex" | "$options" => match operand {
                    Value::String(_) => operand.clone(),
                    _ => return Err(cast_error(path, "String", operand)),
                },
                other => {
                    return Err(DoctextError::InvalidFilter(format!(
                        "unknown operator {other} at path \"{path}\""
                    )));
                }
            };
            cast.insert(op.clone(), value);
        }

        Ok(cast)
    }

    /// `$elemMatch` operand: an operator object applied to each element, or
    /// a sub-document whose keys are paths below `path`.
    fn cast_elem_match(
        &self,
        path: &str,
        kind: &FieldType,
        operand: &Value,
    ) -> Result<RawDocument> {
        let query = operand.as_object().ok_or_else(|| {
            DoctextError::InvalidFilter(format!("$elemMatch needs an object at path \"{path}\""))
        })?;
        if is_operator_object(query) {
            return self.cast_operators(path, kind.element(), query);
        }

        let mut cast = RawDocument::new();
        for (key, value) in query {
            let value = match key.as_str() {
                "$and" | "$or" | "$nor" => {
                    let clauses = value.as_array().filter(|c| !c.is_empty()).ok_or_else(|| {
                        DoctextError::InvalidFilter(format!("{key} must be a nonempty array"))
                    })?;
                    let clauses = clauses
                        .iter()
                        .map(|clause| self.cast_elem_match(path, kind, clause).map(Value::Object))
                        .collect::<Result<Vec<_>>>()?;
                    Value::Array(clauses)
                }
                op if op.starts_with('$') => {
                    return Err(DoctextError::InvalidFilter(format!(
                        "unknown operator {op} in $elemMatch at path \"{path}\""
                    )));
                }
                field => self.cast_condition(&format!("{path}.{field}"), value)?,
            };
            cast.insert(key.clone(), value);
        }
        Ok(cast)
    }
}

/// `{ "$gt": 1, "$lt": 5 }` style condition
pub(crate) fn is_operator_object(doc: &RawDocument) -> bool {
    !doc.is_empty() && doc.keys().all(|key| key.starts_with('$'))
}

/// Cast a single value to `kind`.
///
/// Arrays are cast element-wise; a scalar compared against an array path is
/// cast as the element type.
pub(crate) fn cast_value(path: &str, kind: &FieldType, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let cast = match kind {
        FieldType::Mixed => Some(value.clone()),
        FieldType::Array(inner) => {
            return match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| cast_value(path, inner, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array),
                _ => cast_value(path, inner, value),
            };
        }
        FieldType::String => cast_string(value).map(Value::String),
        FieldType::Number => cast_number(value),
        FieldType::Boolean => cast_boolean(value).map(Value::Bool),
        FieldType::ObjectId => cast_object_id(value).map(Value::String),
    };

    cast.ok_or_else(|| cast_error(path, &kind.name(), value))
}

fn cast_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cast_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::from(u8::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(int) = trimmed.parse::<i64>() {
                return Some(Value::from(int));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}

fn cast_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn cast_object_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if OBJECT_ID_PATTERN.is_match(s) => Some(s.to_lowercase()),
        _ => None,
    }
}

fn cast_error(path: &str, expected: &str, value: &Value) -> DoctextError {
    DoctextError::Cast {
        path: path.to_string(),
        expected: expected.to_string(),
        value: value.to_string(),
    }
}
