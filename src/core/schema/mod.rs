//! Declarative document schemas.
//!
//! A [`Schema`] describes the fields of a collection's documents: their
//! types, whether they are selected by default, and whether they take part
//! in the collection's text index. The schema is what filter casting and
//! projection resolution consult before a text command is built.
//!
//! Schemas can be built in code or loaded from TOML:
//!
//! ```toml
//! [fields.single]
//! type = "string"
//! text = true
//!
//! [fields.array]
//! type = { array = "string" }
//! text = true
//!
//! [fields.secret]
//! type = "string"
//! select = false
//! ```

mod cast;
mod projection;

pub use projection::Projection;

use crate::core::error::{DoctextError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primary key path, implicitly present on every schema
pub const ID_PATH: &str = "_id";

// Dotted field paths: `name`, `_id`, `meta.tags`
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").unwrap());

static ID_FIELD: Lazy<SchemaField> = Lazy::new(|| SchemaField::new(FieldType::ObjectId));

static MIXED: FieldType = FieldType::Mixed;

/// Field type used for casting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    ObjectId,
    /// Anything goes; values are never cast
    Mixed,
    Array(Box<FieldType>),
}

impl FieldType {
    /// Array of `inner`
    pub fn array(inner: FieldType) -> Self {
        FieldType::Array(Box::new(inner))
    }

    /// Element type for arrays, the type itself otherwise
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::Array(inner) => inner,
            other => other,
        }
    }

    /// Type name used in cast errors
    pub fn name(&self) -> String {
        match self {
            FieldType::String => "String".to_string(),
            FieldType::Number => "Number".to_string(),
            FieldType::Boolean => "Boolean".to_string(),
            FieldType::ObjectId => "ObjectId".to_string(),
            FieldType::Mixed => "Mixed".to_string(),
            FieldType::Array(inner) => format!("[{}]", inner.name()),
        }
    }
}

fn default_select() -> bool {
    true
}

/// A single schema path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    #[serde(rename = "type")]
    pub kind: FieldType,

    /// Selected by default; `false` hides the field unless explicitly asked for
    #[serde(default = "default_select")]
    pub select: bool,

    /// Part of the collection's text index
    #[serde(default)]
    pub text: bool,
}

impl SchemaField {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            select: true,
            text: false,
        }
    }

    /// Mark the field as text indexed
    pub fn text(mut self) -> Self {
        self.text = true;
        self
    }

    /// Exclude the field from results unless a projection asks for it
    pub fn deselected(mut self) -> Self {
        self.select = false;
        self
    }
}

/// Document schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: BTreeMap<String, SchemaField>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field
    pub fn with_field(mut self, path: impl Into<String>, field: SchemaField) -> Self {
        self.fields.insert(path.into(), field);
        self
    }

    /// Parse and validate a schema from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let schema: Schema = toml::from_str(contents)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check that every declared path is well formed
    pub fn validate(&self) -> Result<()> {
        for path in self.fields.keys() {
            if !Self::is_valid_path(path) {
                return Err(DoctextError::ConfigError(format!(
                    "Invalid schema path: '{path}'"
                )));
            }
        }
        Ok(())
    }

    /// Check whether `path` is a well formed (possibly dotted) field path
    pub fn is_valid_path(path: &str) -> bool {
        PATH_PATTERN.is_match(path)
    }

    /// Look up a declared path; `_id` is always present
    pub fn path(&self, path: &str) -> Option<&SchemaField> {
        match self.fields.get(path) {
            Some(field) => Some(field),
            None if path == ID_PATH => Some(&ID_FIELD),
            None => None,
        }
    }

    /// Type of a path, `Mixed` when undeclared
    pub fn field_type(&self, path: &str) -> &FieldType {
        self.path(path).map_or(&MIXED, |field| &field.kind)
    }

    /// Paths that belong to the text index
    pub fn text_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| field.text)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Paths hidden from results by default
    pub fn deselected_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.select)
            .map(|(path, _)| path.as_str())
    }
}
