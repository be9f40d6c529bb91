//! Text command construction.
//!
//! The server's text command handler reads the target collection from the
//! first field of the command, so field order is part of the wire format:
//!
//! ```text
//! { text, search, <options in the order they were set>... }
//! ```

use super::options::TextSearchOptions;
use crate::core::config::SearchConfig;
use crate::core::error::{DoctextError, Result};
use crate::core::schema::Schema;
use crate::core::types::RawDocument;
use serde_json::Value;

/// Command fields the builder owns; extra parameters may not reuse them
pub const RESERVED_FIELDS: [&str; 7] = [
    "text", "search", "filter", "project", "limit", "language", "lean",
];

/// Ordered text command document
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand(RawDocument);

impl TextCommand {
    /// Target collection
    pub fn collection(&self) -> &str {
        self.0.get("text").and_then(Value::as_str).unwrap_or("")
    }

    /// Search text
    pub fn search(&self) -> &str {
        self.0.get("search").and_then(Value::as_str).unwrap_or("")
    }

    pub fn as_document(&self) -> &RawDocument {
        &self.0
    }

    pub fn into_document(self) -> RawDocument {
        self.0
    }
}

/// Builds text commands for one schema
pub struct CommandBuilder<'a> {
    schema: &'a Schema,
    config: &'a SearchConfig,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(schema: &'a Schema, config: &'a SearchConfig) -> Self {
        Self { schema, config }
    }

    /// Build the command for `search` against `collection`.
    ///
    /// Filter casting and projection resolution happen here, so every
    /// validation error surfaces before anything is sent.
    pub fn build(
        &self,
        collection: &str,
        search: &str,
        options: &TextSearchOptions,
    ) -> Result<TextCommand> {
        if search.trim().is_empty() {
            return Err(DoctextError::InvalidQuery(
                "Search text cannot be empty".to_string(),
            ));
        }

        let collection = options.collection.as_deref().unwrap_or(collection);
        if collection.is_empty() {
            return Err(DoctextError::InvalidOption(
                "Collection name cannot be empty".to_string(),
            ));
        }

        let mut command = RawDocument::new();
        command.insert("text".to_string(), Value::from(collection));
        command.insert("search".to_string(), Value::from(search));

        if let Some(key) = options
            .extra
            .keys()
            .find(|key| RESERVED_FIELDS.contains(&key.as_str()))
        {
            return Err(DoctextError::InvalidOption(format!(
                "'{key}' cannot be passed as an extra parameter"
            )));
        }

        for key in options.command_keys() {
            let value = match key {
                "filter" => match &options.filter {
                    Some(Value::Object(filter)) => {
                        Some(Value::Object(self.schema.cast_filter(filter)?))
                    }
                    Some(other) => {
                        return Err(DoctextError::InvalidFilter(format!(
                            "filter must be an object, got {other}"
                        )));
                    }
                    None => None,
                },
                "project" => self
                    .schema
                    .resolve_projection(options.project.as_ref())?
                    .map(Value::Object),
                "limit" => options.limit.clone(),
                "language" => options.language.clone(),
                extra => {
                    if !self.config.allow_passthrough {
                        return Err(DoctextError::InvalidOption(format!(
                            "Unsupported option '{extra}' (pass-through is disabled)"
                        )));
                    }
                    options.extra.get(extra).cloned()
                }
            };
            if let Some(value) = value {
                command.insert(key.to_string(), value);
            }
        }

        // Config defaults fill in options the caller left out
        if let (false, Some(limit)) = (command.contains_key("limit"), self.config.default_limit) {
            command.insert("limit".to_string(), Value::from(limit));
        }
        if let (false, Some(language)) = (
            command.contains_key("language"),
            self.config.default_language.as_deref(),
        ) {
            command.insert("language".to_string(), Value::from(language));
        }

        Ok(TextCommand(command))
    }
}
