//! Text search options.

use crate::core::error::{DoctextError, Result};
use crate::core::schema::Projection;
use crate::core::types::RawDocument;
use serde_json::Value;

/// Command keys the named options map to, in their default order
const NAMED_KEYS: [&str; 4] = ["filter", "project", "limit", "language"];

/// Options for a single text search
///
/// Every field is optional. `limit` and `language` are forwarded to the
/// server unmodified, like the parameters in `extra`; the server checks
/// their types. Command keys keep the order in which they were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSearchOptions {
    /// Collection to search instead of the handle's own
    pub collection: Option<String>,

    /// Return raw documents instead of model instances
    pub lean: bool,

    /// Predicate in the database's query dialect, cast through the schema
    pub filter: Option<Value>,

    /// Fields to include or exclude
    pub project: Option<Projection>,

    /// Maximum number of results
    pub limit: Option<Value>,

    /// Language used to analyze the search text
    pub language: Option<Value>,

    /// Additional command parameters
    pub extra: RawDocument,

    /// Command keys in first-set order
    order: Vec<String>,
}

impl TextSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn lean(mut self, lean: bool) -> Self {
        self.lean = lean;
        self
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self.touch("filter");
        self
    }

    pub fn project(mut self, projection: impl Into<Projection>) -> Self {
        self.project = Some(projection.into());
        self.touch("project");
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(Value::from(limit));
        self.touch("limit");
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(Value::String(language.into()));
        self.touch("language");
        self
    }

    /// Add a pass-through command parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        self.touch(&key);
        self.extra.insert(key, value.into());
        self
    }

    /// Build options from a loosely typed option document.
    ///
    /// Recognized keys are `text` (collection override), `lean`, `filter`
    /// and `project`. `limit`, `language` and anything else are kept
    /// verbatim, in document order.
    pub fn from_document(doc: &RawDocument) -> Result<Self> {
        let mut options = Self::default();

        for (key, value) in doc {
            match key.as_str() {
                "text" => {
                    let name = value
                        .as_str()
                        .ok_or_else(|| invalid(key, "a collection name string", value))?;
                    options.collection = Some(name.to_string());
                }
                "lean" => options.lean = is_truthy(value),
                "filter" => options = options.filter(value.clone()),
                "project" => options = options.project(Projection::from_value(value)?),
                "limit" => {
                    options.limit = Some(value.clone());
                    options.touch(key);
                }
                "language" => {
                    options.language = Some(value.clone());
                    options.touch(key);
                }
                "search" => {
                    return Err(DoctextError::InvalidOption(
                        "'search' is set by the search text, not by options".to_string(),
                    ));
                }
                _ => options = options.param(key.clone(), value.clone()),
            }
        }

        Ok(options)
    }

    /// Command keys carried by these options, in command order.
    ///
    /// Keys set through the builder or an option document come first, in
    /// first-set order. Fields assigned directly follow in default order.
    pub fn command_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .order
            .iter()
            .map(String::as_str)
            .filter(|key| self.is_set(key))
            .collect();
        for key in NAMED_KEYS {
            if self.is_set(key) && !keys.contains(&key) {
                keys.push(key);
            }
        }
        for key in self.extra.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    fn is_set(&self, key: &str) -> bool {
        match key {
            "filter" => self.filter.is_some(),
            "project" => self.project.is_some(),
            "limit" => self.limit.is_some(),
            "language" => self.language.is_some(),
            other => self.extra.contains_key(other),
        }
    }

    fn touch(&mut self, key: &str) {
        if !self.order.iter().any(|k| k == key) {
            self.order.push(key.to_string());
        }
    }
}

fn invalid(key: &str, expected: &str, value: &Value) -> DoctextError {
    DoctextError::InvalidOption(format!("'{key}' must be {expected}, got {value}"))
}

/// Loose truthiness for flags coming from untyped option documents
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
