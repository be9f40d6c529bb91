//! Schema-bound models.
//!
//! A [`Model`] ties a Rust type to a collection and its [`Schema`], and knows
//! how to rebuild itself from a document the database already holds.
//!
//! # Trust boundary
//!
//! [`Model::init`] receives field data straight from the database. It must
//! build the value as-is: no defaults are applied and no validation runs,
//! the same way a persisted document is loaded rather than created. Fields
//! removed by a projection are simply absent, so model types should declare
//! projectable fields as `Option` (or `#[serde(default)]`).

use crate::core::error::{DoctextError, Result};
use crate::core::schema::Schema;
use crate::core::types::RawDocument;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A schema-typed document
pub trait Model: Sized + Send + Sync + 'static {
    /// Collection the model is bound to
    const COLLECTION: &'static str;

    /// Schema used for filter casting and projection resolution
    fn schema() -> Schema;

    /// Build an instance from persisted field data (see the module docs)
    fn init(fields: RawDocument) -> Result<Self>;
}

/// Deserialize persisted field data into `T`.
///
/// This is the usual body of [`Model::init`] for `serde` types.
pub fn from_fields<T: DeserializeOwned>(fields: RawDocument) -> Result<T> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| DoctextError::Hydration(e.to_string()))
}

/// Model with no compile-time shape.
///
/// Used when the schema is only known at runtime (the CLI loads it from a
/// file). Pair it with [`crate::core::search::TextSearch::with_schema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: RawDocument,
}

impl Record {
    /// Document id, if present
    pub fn id(&self) -> Option<&str> {
        self.fields.get("_id").and_then(Value::as_str)
    }

    /// Look up a (possibly dotted) path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.fields.get(first)?, |value, part| value.get(part))
    }
}

impl Model for Record {
    const COLLECTION: &'static str = "records";

    fn schema() -> Schema {
        Schema::default()
    }

    fn init(fields: RawDocument) -> Result<Self> {
        Ok(Self { fields })
    }
}
