//! Search command - run a text search over a JSON document file

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::error::{DoctextError, Result};
use crate::core::model::Record;
use crate::core::schema::{FieldType, Projection, Schema, SchemaField};
use crate::core::search::TextSearchOptions;
use crate::core::services::Services;
use crate::core::types::{Materialized, RawDocument, TextSearchResponse, TextSearchStats};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Search text (bare words, -negated words, "quoted phrases")
    pub query: String,

    /// JSON file holding an array of documents
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// TOML schema file (string fields are text-indexed when omitted)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Collection the documents are loaded into
    #[arg(long, short = 'c', default_value = "documents")]
    pub collection: String,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<u64>,

    /// Filter as a JSON object, e.g. '{"views": {"$gt": 10}}'
    #[arg(long)]
    pub filter: Option<String>,

    /// Projection: a JSON object or a field list such as "-body +secret"
    #[arg(long)]
    pub project: Option<String>,

    /// Language used to analyze the search text
    #[arg(long, short = 'l')]
    pub language: Option<String>,

    /// Print raw documents instead of records
    #[arg(long)]
    pub lean: bool,

    /// Extra command parameter forwarded as-is (key=JSON, repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Print the command that would be sent, without running it
    #[arg(long)]
    pub explain: bool,
}

/// Search result item
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub lean: bool,
    pub document: Option<RawDocument>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponseOutput {
    pub query: String,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub total_results: usize,
    pub results: Vec<SearchResultItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TextSearchStats>,
}

/// Parse a `key=JSON` pair; values that are not valid JSON are kept as strings
pub fn parse_param(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Read the document file: a JSON array of objects
pub fn load_documents(path: &Path) -> Result<Vec<RawDocument>> {
    let contents = fs::read_to_string(path)?;
    let documents: Vec<RawDocument> = serde_json::from_str(&contents)?;
    Ok(documents)
}

/// Schema from a TOML file, or inferred from the documents
pub fn load_schema(path: Option<&Path>, documents: &[RawDocument]) -> Result<Schema> {
    match path {
        Some(path) => Schema::from_toml_str(&fs::read_to_string(path)?),
        None => Ok(infer_schema(documents)),
    }
}

/// Text-index every top-level string and string-array field
pub fn infer_schema(documents: &[RawDocument]) -> Schema {
    let mut schema = Schema::new();
    for document in documents {
        for (key, value) in document {
            if key == "_id" || schema.path(key).is_some() {
                continue;
            }
            let kind = match value {
                Value::String(_) => FieldType::String,
                Value::Array(items) if items.iter().all(Value::is_string) && !items.is_empty() => {
                    FieldType::array(FieldType::String)
                }
                _ => continue,
            };
            schema = schema.with_field(key.clone(), SchemaField::new(kind).text());
        }
    }
    schema
}

/// Turn command-line arguments into search options
pub fn build_options(args: &SearchArgs) -> Result<TextSearchOptions> {
    let mut options = TextSearchOptions::new().lean(args.lean);

    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }
    if let Some(filter) = &args.filter {
        let filter: Value = serde_json::from_str(filter)
            .map_err(|e| DoctextError::InvalidFilter(format!("filter is not valid JSON: {e}")))?;
        options = options.filter(filter);
    }
    if let Some(project) = &args.project {
        let projection = match serde_json::from_str::<Value>(project) {
            Ok(value @ Value::Object(_)) => Projection::from_value(&value)?,
            _ => Projection::from(project.as_str()),
        };
        options = options.project(projection);
    }
    if let Some(language) = &args.language {
        options = options.language(language.clone());
    }
    for (key, value) in &args.params {
        options = options.param(key.clone(), value.clone());
    }

    Ok(options)
}

fn to_output(args: &SearchArgs, response: &TextSearchResponse<Record>) -> SearchResponseOutput {
    let results = response
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let (document, lean) = match &m.obj {
                Some(Materialized::Model(record)) => (Some(record.fields.clone()), false),
                Some(Materialized::Lean(raw)) => (Some(raw.clone()), true),
                None => (None, args.lean),
            };
            let id = document
                .as_ref()
                .and_then(|d| d.get("_id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            SearchResultItem {
                rank: i + 1,
                score: m.score,
                id,
                lean,
                document,
            }
        })
        .collect::<Vec<_>>();

    SearchResponseOutput {
        query: args.query.clone(),
        collection: args.collection.clone(),
        language: response.language().map(str::to_string),
        total_results: results.len(),
        results,
        stats: response.stats(),
    }
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let documents = load_documents(&args.data)?;
    if documents.is_empty() {
        output::print_warning(&format!("No documents in {}", args.data.display()));
    }
    let schema = load_schema(args.schema.as_deref(), &documents)?;
    let options = build_options(&args)?;
    let search = services.text_search_with_schema(args.collection.clone(), schema);

    if args.explain {
        let command = search.build_command(&args.query, &options)?;
        match format {
            OutputFormat::Human => {
                output::print_header("Command:");
                println!("{}", serde_json::to_string_pretty(command.as_document())?);
            }
            OutputFormat::Json => output::print_output(command.as_document(), format),
        }
        return Ok(());
    }

    services.database.insert_many(&args.collection, documents)?;
    services
        .database
        .ensure_text_index(&args.collection, search.schema())?;

    let response = search.text_search(&args.query, options).await?;
    let output = to_output(&args, &response);

    match format {
        OutputFormat::Human => {
            if output.results.is_empty() {
                println!(
                    "No results found for '{}' in '{}'",
                    colors::label(&args.query),
                    colors::collection(&output.collection)
                );
            } else {
                println!(
                    "Found {} result(s) in '{}':\n",
                    colors::number(&output.total_results.to_string()),
                    colors::collection(&output.collection)
                );

                for result in &output.results {
                    println!(
                        "[{}] {} {}",
                        colors::rank(&result.rank.to_string()),
                        colors::id(result.id.as_deref().unwrap_or("-")),
                        colors::dim(&format!("(score: {:.2})", result.score))
                    );
                    if let Some(document) = &result.document {
                        for (key, value) in document.iter().filter(|(key, _)| *key != "_id") {
                            println!(
                                "    {}: {}",
                                colors::label(key),
                                output::truncate(&value.to_string(), 100)
                            );
                        }
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
