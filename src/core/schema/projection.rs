//! Projection resolution.
//!
//! A projection arrives either as a document (`{ "single": 0 }`) or as a
//! space separated string (`"-single +secret"`). It is resolved against the
//! schema so that fields declared with `select = false` stay hidden unless
//! the caller force-includes them with `+path`.

use super::Schema;
use crate::core::error::{DoctextError, Result};
use crate::core::types::RawDocument;
use serde_json::Value;

use super::ID_PATH;

/// Caller supplied projection
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Document form: `{ "single": 0, "array": 0 }`
    Fields(RawDocument),

    /// String form: `"single -_id"`, `"-single"`, `"+secret"`
    Spec(String),
}

impl Projection {
    /// Interpret a JSON value as a projection
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(spec) => Ok(Projection::Spec(spec.clone())),
            Value::Object(fields) => Ok(Projection::Fields(fields.clone())),
            other => Err(DoctextError::Projection(format!(
                "expected an object or a string, got {other}"
            ))),
        }
    }
}

impl From<&str> for Projection {
    fn from(spec: &str) -> Self {
        Projection::Spec(spec.to_string())
    }
}

impl From<String> for Projection {
    fn from(spec: String) -> Self {
        Projection::Spec(spec)
    }
}

impl From<RawDocument> for Projection {
    fn from(fields: RawDocument) -> Self {
        Projection::Fields(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Include,
    Exclude,
    /// `+path`: lift a schema-level exclusion
    Force,
}

impl Schema {
    /// Resolve a projection into the `path -> 0|1` document sent to the server.
    ///
    /// Returns `Ok(None)` when nothing needs projecting.
    ///
    /// # Errors
    ///
    /// Returns [`DoctextError::Projection`] for malformed paths, unsupported
    /// values, or a mix of inclusion and exclusion (other than `_id`).
    pub fn resolve_projection(&self, projection: Option<&Projection>) -> Result<Option<RawDocument>> {
        let mut entries = match projection {
            Some(Projection::Spec(spec)) => parse_spec(spec)?,
            Some(Projection::Fields(fields)) => parse_fields(fields)?,
            None => Vec::new(),
        };

        let inclusive = has_selection(&entries, Selection::Include);
        if inclusive && has_selection(&entries, Selection::Exclude) {
            return Err(DoctextError::Projection(
                "cannot mix inclusion and exclusion".to_string(),
            ));
        }

        // Schema-level exclusions only matter for exclusive projections;
        // an inclusive projection leaves unlisted fields out anyway.
        if !inclusive {
            for path in self.deselected_fields() {
                if !entries.iter().any(|(p, _)| p == path) {
                    entries.push((path.to_string(), Selection::Exclude));
                }
            }
        }

        let mut resolved = RawDocument::new();
        for (path, selection) in entries {
            match selection {
                Selection::Include => {
                    resolved.insert(path, Value::from(1));
                }
                Selection::Exclude => {
                    resolved.insert(path, Value::from(0));
                }
                Selection::Force if inclusive => {
                    resolved.insert(path, Value::from(1));
                }
                Selection::Force => {}
            }
        }

        Ok(if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        })
    }
}

fn has_selection(entries: &[(String, Selection)], wanted: Selection) -> bool {
    entries
        .iter()
        .any(|(path, selection)| *selection == wanted && path != ID_PATH)
}

fn parse_spec(spec: &str) -> Result<Vec<(String, Selection)>> {
    spec.split_whitespace()
        .map(|token| {
            let (path, selection) = if let Some(path) = token.strip_prefix('-') {
                (path, Selection::Exclude)
            } else if let Some(path) = token.strip_prefix('+') {
                (path, Selection::Force)
            } else {
                (token, Selection::Include)
            };
            Ok((checked_path(path)?, selection))
        })
        .collect()
}

fn parse_fields(fields: &RawDocument) -> Result<Vec<(String, Selection)>> {
    fields
        .iter()
        .map(|(path, value)| {
            let include = match value {
                Value::Number(n) => n.as_f64().map(|f| f != 0.0),
                Value::Bool(b) => Some(*b),
                Value::String(s) => match s.as_str() {
                    "1" | "true" => Some(true),
                    "0" | "false" => Some(false),
                    _ => None,
                },
                _ => None,
            }
            .ok_or_else(|| {
                DoctextError::Projection(format!(
                    "unsupported value {value} for path \"{path}\""
                ))
            })?;

            let selection = if include {
                Selection::Include
            } else {
                Selection::Exclude
            };
            Ok((checked_path(path)?, selection))
        })
        .collect()
}

fn checked_path(path: &str) -> Result<String> {
    if Schema::is_valid_path(path) {
        Ok(path.to_string())
    } else {
        Err(DoctextError::Projection(format!("invalid path \"{path}\"")))
    }
}
