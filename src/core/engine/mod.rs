//! Embedded document database with text search.
//!
//! `MemoryDatabase` keeps collections of raw documents in memory and answers
//! the `text` command the way a document server does, using tantivy for
//! analysis and BM25 scoring. It backs the CLI, the benches and the
//! integration tests.

pub mod analyzer;
pub mod filter;
pub mod projection;
pub mod text_index;

pub use analyzer::TextLanguage;
pub use text_index::{TextIndex, TextQuery};

use crate::core::config::EngineConfig;
use crate::core::error::{DoctextError, Result};
use crate::core::executor::{CommandError, CommandExecutor};
use crate::core::schema::Schema;
use crate::core::types::RawDocument;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Error codes reported in `{ok: 0, errmsg, code}` responses
pub mod codes {
    pub const BAD_VALUE: i64 = 2;
    pub const NAMESPACE_NOT_FOUND: i64 = 26;
    pub const INDEX_NOT_FOUND: i64 = 27;
    pub const COMMAND_NOT_FOUND: i64 = 59;
    pub const INTERNAL_ERROR: i64 = 1;
}

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<RawDocument>,
    text_index: Option<TextIndex>,
}

/// A failed command, rendered as `{ok: 0, errmsg, code}`
#[derive(Debug)]
struct CommandFailure {
    errmsg: String,
    code: i64,
}

impl CommandFailure {
    fn new(code: i64, errmsg: impl Into<String>) -> Self {
        Self {
            errmsg: errmsg.into(),
            code,
        }
    }

    fn into_document(self) -> RawDocument {
        let mut response = RawDocument::new();
        response.insert("ok".to_string(), json!(0));
        response.insert("errmsg".to_string(), json!(self.errmsg));
        response.insert("code".to_string(), json!(self.code));
        response
    }
}

/// In-memory database answering `text` and `ping` commands
#[derive(Debug)]
pub struct MemoryDatabase {
    config: EngineConfig,
    index_language: TextLanguage,
    collections: Mutex<HashMap<String, Collection>>,
    sequence: AtomicU32,
}

impl MemoryDatabase {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let index_language = config.index_language.parse::<TextLanguage>().map_err(|_| {
            DoctextError::ConfigError(format!(
                "Unsupported index language: {}",
                config.index_language
            ))
        })?;

        Ok(Self {
            config,
            index_language,
            collections: Mutex::new(HashMap::new()),
            sequence: AtomicU32::new(0),
        })
    }

    pub fn database_name(&self) -> &str {
        &self.config.database
    }

    fn collections(&self) -> Result<MutexGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .lock()
            .map_err(|_| DoctextError::Engine("collection lock poisoned".to_string()))
    }

    /// 24 hex chars: seconds since the epoch, process id, then a counter
    fn next_object_id(&self) -> String {
        let seconds = Utc::now().timestamp() as u32;
        let process = u64::from(std::process::id()) & 0xff_ffff_ffff;
        let counter = self.sequence.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;
        format!("{seconds:08x}{process:010x}{counter:06x}")
    }

    /// Insert documents, assigning `_id` where missing.
    ///
    /// Returns the stored documents, `_id` first. Documents are added to the
    /// collection's text index if it has one.
    pub fn insert_many(
        &self,
        collection: &str,
        documents: impl IntoIterator<Item = RawDocument>,
    ) -> Result<Vec<RawDocument>> {
        let mut stored = Vec::new();
        for document in documents {
            let id = match document.get("_id") {
                Some(id) => id.clone(),
                None => Value::String(self.next_object_id()),
            };
            let mut with_id = RawDocument::new();
            with_id.insert("_id".to_string(), id);
            with_id.extend(document.into_iter().filter(|(key, _)| key != "_id"));
            stored.push(with_id);
        }

        let mut collections = self.collections()?;
        let entry = collections.entry(collection.to_string()).or_default();
        let start = entry.documents.len() as u64;
        if let Some(index) = &entry.text_index {
            index.add_documents(
                stored
                    .iter()
                    .enumerate()
                    .map(|(offset, document)| (start + offset as u64, document)),
            )?;
        }
        entry.documents.extend(stored.iter().cloned());

        tracing::debug!(
            collection = collection,
            inserted = stored.len(),
            total = entry.documents.len(),
            "Inserted documents"
        );

        Ok(stored)
    }

    /// Number of documents in a collection (0 when it does not exist)
    pub fn count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .collections()?
            .get(collection)
            .map_or(0, |c| c.documents.len()))
    }

    /// Build the text index of a collection over `fields`.
    ///
    /// A collection holds at most one text index; creating another with
    /// different fields or language is an error, recreating the same one is
    /// a no-op.
    pub fn create_text_index<I, S>(
        &self,
        collection: &str,
        fields: I,
        language: Option<TextLanguage>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(DoctextError::Engine(
                "text index needs at least one field".to_string(),
            ));
        }
        let language = language.unwrap_or(self.index_language);

        let mut collections = self.collections()?;
        let entry = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = &entry.text_index {
            if existing.fields() == fields.as_slice() && existing.language() == language {
                return Ok(());
            }
            return Err(DoctextError::Engine(format!(
                "collection {collection} already has a text index over {:?}",
                existing.fields()
            )));
        }

        let index = TextIndex::create(fields, language)?;
        index.add_documents(
            entry
                .documents
                .iter()
                .enumerate()
                .map(|(position, document)| (position as u64, document)),
        )?;

        tracing::info!(
            collection = collection,
            fields = ?index.fields(),
            language = %language,
            "Created text index"
        );
        entry.text_index = Some(index);

        Ok(())
    }

    /// Build the text index from the schema's `text` fields
    pub fn ensure_text_index(&self, collection: &str, schema: &Schema) -> Result<()> {
        let fields = schema.text_fields();
        if fields.is_empty() {
            return Err(DoctextError::Engine(format!(
                "schema for {collection} declares no text fields"
            )));
        }
        self.create_text_index(collection, fields, None)
    }

    /// Run a command document, answering the way a server would.
    pub fn execute(&self, command: &RawDocument) -> RawDocument {
        let outcome = match command.keys().next().map(String::as_str) {
            Some("text") => self.run_text(command),
            Some("ping") => Ok(ok_document()),
            Some(name) => Err(CommandFailure::new(
                codes::COMMAND_NOT_FOUND,
                format!("no such cmd: {name}"),
            )),
            None => Err(CommandFailure::new(
                codes::COMMAND_NOT_FOUND,
                "no such cmd: (empty)",
            )),
        };

        outcome.unwrap_or_else(|failure| {
            tracing::debug!(code = failure.code, errmsg = %failure.errmsg, "Command failed");
            failure.into_document()
        })
    }

    fn run_text(&self, command: &RawDocument) -> std::result::Result<RawDocument, CommandFailure> {
        let started = Instant::now();

        let collection = command
            .get("text")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CommandFailure::new(codes::BAD_VALUE, "text expects a collection name"))?;

        let search = match command.get("search") {
            Some(Value::String(search)) if !search.trim().is_empty() => search.as_str(),
            _ => return Err(CommandFailure::new(codes::BAD_VALUE, "no search specified")),
        };

        let filter = match command.get("filter") {
            None | Some(Value::Null) => None,
            Some(Value::Object(filter)) => Some(filter),
            Some(_) => return Err(CommandFailure::new(codes::BAD_VALUE, "filter must be an object")),
        };

        let project = match command.get("project") {
            None | Some(Value::Null) => None,
            Some(Value::Object(project)) => Some(project),
            Some(_) => return Err(CommandFailure::new(codes::BAD_VALUE, "project must be an object")),
        };

        let limit = match command.get("limit") {
            None | Some(Value::Null) => self.config.default_limit,
            Some(value) => match value.as_f64() {
                Some(limit) if limit > 0.0 => limit as u64,
                Some(_) => self.config.default_limit,
                None => return Err(CommandFailure::new(codes::BAD_VALUE, "limit must be a number")),
            },
        };

        let collections = self
            .collections
            .lock()
            .map_err(|_| CommandFailure::new(codes::INTERNAL_ERROR, "collection lock poisoned"))?;

        let namespace = format!("{}.{}", self.config.database, collection);
        let stored = collections.get(collection).ok_or_else(|| {
            CommandFailure::new(codes::NAMESPACE_NOT_FOUND, format!("ns not found: {namespace}"))
        })?;
        let index = stored.text_index.as_ref().ok_or_else(|| {
            CommandFailure::new(
                codes::INDEX_NOT_FOUND,
                format!("no text index for: {namespace}"),
            )
        })?;

        let language = match command.get("language") {
            None | Some(Value::Null) => index.language(),
            Some(Value::String(name)) => name
                .parse::<TextLanguage>()
                .map_err(|message| CommandFailure::new(codes::BAD_VALUE, message))?,
            Some(_) => return Err(CommandFailure::new(codes::BAD_VALUE, "language must be a string")),
        };

        let query = TextQuery::parse(search);
        let (terms, negated) = query.analyze(language);
        let phrases: Vec<String> = query.phrases.iter().map(|p| p.to_lowercase()).collect();

        let hits = index
            .search(&terms, &negated, stored.documents.len())
            .map_err(|e| CommandFailure::new(codes::INTERNAL_ERROR, e.message()))?;

        let nscanned = hits.len();
        let mut nscanned_objects = 0usize;
        let mut nfound = 0usize;
        let mut results = Vec::new();

        for (score, position) in hits {
            let Some(document) = stored.documents.get(position as usize) else {
                continue;
            };
            nscanned_objects += 1;

            if !phrases.is_empty() {
                let values: Vec<String> = index
                    .indexed_values(document)
                    .into_iter()
                    .map(str::to_lowercase)
                    .collect();
                let all_present = phrases
                    .iter()
                    .all(|phrase| values.iter().any(|value| value.contains(phrase.as_str())));
                if !all_present {
                    continue;
                }
            }

            if let Some(filter) = filter {
                let matched = filter::matches(document, filter)
                    .map_err(|message| CommandFailure::new(codes::BAD_VALUE, message))?;
                if !matched {
                    continue;
                }
            }

            nfound += 1;
            if results.len() as u64 >= limit {
                continue;
            }

            let obj = match project {
                Some(project) => projection::apply(document, project)
                    .map_err(|message| CommandFailure::new(codes::BAD_VALUE, message))?,
                None => document.clone(),
            };
            results.push(json!({ "score": f64::from(score), "obj": obj }));
        }

        let n = results.len();
        let mut response = RawDocument::new();
        response.insert(
            "queryDebugString".to_string(),
            json!(query_debug_string(&terms, &negated, &phrases)),
        );
        response.insert("language".to_string(), json!(language.name()));
        response.insert("results".to_string(), Value::Array(results));
        response.insert(
            "stats".to_string(),
            json!({
                "nscanned": nscanned,
                "nscannedObjects": nscanned_objects,
                "n": n,
                "nfound": nfound,
                "timeMicros": started.elapsed().as_micros() as u64,
            }),
        );
        response.insert("ok".to_string(), json!(1));

        tracing::debug!(
            collection = collection,
            language = %language,
            n = n,
            nfound = nfound,
            "Answered text command"
        );

        Ok(response)
    }
}

fn ok_document() -> RawDocument {
    let mut response = RawDocument::new();
    response.insert("ok".to_string(), json!(1));
    response
}

/// `terms||negated||phrases||`, each section `|`-joined
fn query_debug_string(terms: &[String], negated: &[String], phrases: &[String]) -> String {
    format!(
        "{}||{}||{}||",
        terms.join("|"),
        negated.join("|"),
        phrases.join("|")
    )
}

#[async_trait]
impl CommandExecutor for MemoryDatabase {
    async fn run_command(
        &self,
        command: RawDocument,
    ) -> std::result::Result<RawDocument, CommandError> {
        Ok(self.execute(&command))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
