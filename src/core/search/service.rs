//! Text search service.
//!
//! [`TextSearch`] is the text search capability attached to a model: it
//! builds the command, sends it through the executor, and maps the response
//! back into model instances.

use super::command::{CommandBuilder, TextCommand};
use super::options::TextSearchOptions;
use crate::core::config::SearchConfig;
use crate::core::error::{DoctextError, Result};
use crate::core::executor::CommandExecutor;
use crate::core::model::Model;
use crate::core::schema::Schema;
use crate::core::types::{Materialized, RawDocument, TextMatch, TextSearchResponse};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Text search handle for model `M`
pub struct TextSearch<M: Model> {
    executor: Arc<dyn CommandExecutor>,
    collection: String,
    schema: Arc<Schema>,
    config: SearchConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for TextSearch<M> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            collection: self.collection.clone(),
            schema: Arc::clone(&self.schema),
            config: self.config.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> TextSearch<M> {
    /// Bind to the model's own collection and schema
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self::with_schema(executor, M::COLLECTION, M::schema())
    }

    /// Bind to an explicit collection and schema
    pub fn with_schema(
        executor: Arc<dyn CommandExecutor>,
        collection: impl Into<String>,
        schema: Schema,
    ) -> Self {
        Self {
            executor,
            collection: collection.into(),
            schema: Arc::new(schema),
            config: SearchConfig::default(),
            _model: PhantomData,
        }
    }

    /// Apply search defaults and the pass-through policy
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Build the command without sending it
    pub fn build_command(&self, search: &str, options: &TextSearchOptions) -> Result<TextCommand> {
        CommandBuilder::new(&self.schema, &self.config).build(&self.collection, search, options)
    }

    /// Run a text search.
    ///
    /// Exactly one command is sent per call, and only after the search text,
    /// filter and projection have been validated.
    pub async fn text_search(
        &self,
        search: &str,
        options: TextSearchOptions,
    ) -> Result<TextSearchResponse<M>> {
        let command = self.build_command(search, &options)?;

        tracing::debug!(
            collection = command.collection(),
            backend = self.executor.backend_name(),
            lean = options.lean,
            "Dispatching text command"
        );

        let response = self
            .executor
            .run_command(command.into_document())
            .await
            .map_err(|e| DoctextError::Transport {
                message: e.message,
                response: e.response,
            })?;

        let response = map_response::<M>(response, options.lean)?;
        tracing::debug!(results = response.len(), "Text search finished");
        Ok(response)
    }

    /// Run a text search and hand the outcome to `callback`
    pub async fn text_search_with<F>(&self, search: &str, options: TextSearchOptions, callback: F)
    where
        F: FnOnce(Result<TextSearchResponse<M>>),
    {
        callback(self.text_search(search, options).await);
    }
}

/// Turn a raw text command response into a typed one.
///
/// Server errors take precedence. A `results` array is mapped match by
/// match; any other shape is left in `rest` untouched.
pub fn map_response<M: Model>(response: RawDocument, lean: bool) -> Result<TextSearchResponse<M>> {
    if let Some(errmsg) = response.get("errmsg") {
        let message = errmsg
            .as_str()
            .map_or_else(|| errmsg.to_string(), str::to_string);
        tracing::warn!(error = %message, "Text command failed on the server");
        return Err(DoctextError::Server(message));
    }

    if response
        .get("ok")
        .and_then(Value::as_f64)
        .is_some_and(|ok| ok == 0.0)
    {
        return Err(DoctextError::Server("command failed".to_string()));
    }

    let mut results = None;
    let mut rest = RawDocument::new();

    for (key, value) in response {
        match value {
            Value::Array(items) if key == "results" => {
                let matches = items
                    .into_iter()
                    .map(|item| map_match::<M>(item, lean))
                    .collect::<Result<Vec<_>>>()?;
                results = Some(matches);
            }
            value => {
                rest.insert(key, value);
            }
        }
    }

    Ok(TextSearchResponse { results, rest })
}

fn map_match<M: Model>(item: Value, lean: bool) -> Result<TextMatch<M>> {
    let mut text_match = TextMatch {
        score: 0.0,
        obj: None,
        extra: RawDocument::new(),
    };

    let Value::Object(fields) = item else {
        return Ok(text_match);
    };

    for (key, value) in fields {
        match value {
            Value::Object(doc) if key == "obj" => {
                let obj = if lean {
                    Materialized::Lean(doc)
                } else {
                    Materialized::Model(M::init(doc)?)
                };
                text_match.obj = Some(obj);
            }
            value if key == "score" => match value.as_f64() {
                Some(score) => text_match.score = score,
                None => {
                    tracing::debug!(score = %value, "Score is not a number, kept as-is");
                    text_match.extra.insert(key, value);
                }
            },
            value => {
                text_match.extra.insert(key, value);
            }
        }
    }

    Ok(text_match)
}
