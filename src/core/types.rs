//! Core data types for doctext.
//!
//! This module defines the document representation shared by every layer
//! and the typed view of a text search response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw document as exchanged with the database.
///
/// Field order is preserved (`serde_json` is built with `preserve_order`),
/// which the command payload relies on.
pub type RawDocument = Map<String, Value>;

/// A result document, either rehydrated into the model or left raw
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized<M> {
    /// Schema-typed instance built with [`crate::core::model::Model::init`]
    Model(M),

    /// Raw document returned in lean mode
    Lean(RawDocument),
}

impl<M> Materialized<M> {
    /// Check if the document was rehydrated
    pub fn is_model(&self) -> bool {
        matches!(self, Materialized::Model(_))
    }

    /// Borrow the model instance, if rehydrated
    pub fn as_model(&self) -> Option<&M> {
        match self {
            Materialized::Model(model) => Some(model),
            Materialized::Lean(_) => None,
        }
    }

    /// Borrow the raw document, if lean
    pub fn as_lean(&self) -> Option<&RawDocument> {
        match self {
            Materialized::Model(_) => None,
            Materialized::Lean(doc) => Some(doc),
        }
    }

    /// Take the model instance, if rehydrated
    pub fn into_model(self) -> Option<M> {
        match self {
            Materialized::Model(model) => Some(model),
            Materialized::Lean(_) => None,
        }
    }
}

/// A single scored match from a text search
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch<M> {
    /// Relevance score reported by the server (higher = more relevant)
    pub score: f64,

    /// Matched document; `None` when the server sent no object
    pub obj: Option<Materialized<M>>,

    /// Any other fields the server attached to the match
    pub extra: RawDocument,
}

/// Statistics block of a text search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchStats {
    #[serde(default)]
    pub nscanned: u64,

    #[serde(default)]
    pub nscanned_objects: u64,

    /// Number of results returned
    #[serde(default)]
    pub n: u64,

    /// Number of candidates found before limit
    #[serde(default)]
    pub nfound: u64,

    #[serde(default)]
    pub time_micros: u64,
}

/// Response from a text search
///
/// `results` is `Some` only when the server answered with a `results` array.
/// Every other response field is kept untouched in `rest`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchResponse<M> {
    pub results: Option<Vec<TextMatch<M>>>,
    pub rest: RawDocument,
}

impl<M> TextSearchResponse<M> {
    /// Number of results, zero when the response had no results list
    pub fn len(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over results (empty when the response had no results list)
    pub fn iter(&self) -> impl Iterator<Item = &TextMatch<M>> {
        self.results.iter().flatten()
    }

    /// Rehydrated models in result order, skipping lean or missing objects
    pub fn models(&self) -> impl Iterator<Item = &M> {
        self.iter()
            .filter_map(|m| m.obj.as_ref().and_then(Materialized::as_model))
    }

    /// Language the server used for the query
    pub fn language(&self) -> Option<&str> {
        self.rest.get("language").and_then(Value::as_str)
    }

    /// Parsed statistics block, if the server sent one
    pub fn stats(&self) -> Option<TextSearchStats> {
        self.rest
            .get("stats")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}
