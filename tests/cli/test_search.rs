//! Tests for the search CLI command
//!
//! Tests the search command handler:
//! - Searching a document file with and without a schema file
//! - Options: limit, filter, project, language, lean, params
//! - Explain mode (no documents loaded)
//! - Error cases (missing file, bad filter, empty query)

use crate::cli::test_helpers::{create_cli_test_services, search_args, write_fixture_files};
use doctext::cli::commands::search::{execute, load_documents, load_schema};
use doctext::cli::OutputFormat;
use serde_json::json;

/// Test a basic search (human output)
#[tokio::test]
async fn test_search_human() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let result = execute(search_args(&files, "blueberry"), &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Search should succeed: {:?}", result.err());
    assert_eq!(services.database.count("posts").unwrap(), 3);
}

/// Test a basic search (JSON output)
#[tokio::test]
async fn test_search_json() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let result = execute(search_args(&files, "strings"), &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Search (JSON) should succeed");
}

/// Test every search option at once
#[tokio::test]
async fn test_search_with_options() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let mut args = search_args(&files, "strings");
    args.limit = Some(1);
    args.filter = Some(r#"{"array": [1]}"#.to_string());
    args.project = Some("-single".to_string());
    args.language = Some("english".to_string());
    args.lean = true;
    args.params = vec![("hint".to_string(), json!("posts_text"))];

    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Search with options should succeed: {:?}", result.err());
}

/// Test that the schema is inferred when no schema file is given
#[tokio::test]
async fn test_search_inferred_schema() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let documents = load_documents(&files.data).unwrap();
    let schema = load_schema(None, &documents).unwrap();
    assert_eq!(schema.text_fields(), vec!["array", "single"]);

    let mut args = search_args(&files, "elephant");
    args.schema = None;
    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
}

/// Test explain mode prints the command without loading anything
#[tokio::test]
async fn test_search_explain() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let mut args = search_args(&files, "blueberry");
    args.explain = true;
    args.filter = Some(r#"{"views": "7"}"#.to_string());

    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(result.is_ok());
    assert_eq!(services.database.count("posts").unwrap(), 0);
}

/// Test that an empty query is rejected
#[tokio::test]
async fn test_search_empty_query() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let result = execute(search_args(&files, "  "), &services, OutputFormat::Human).await;
    assert!(result.is_err());
}

/// Test that a malformed filter is rejected
#[tokio::test]
async fn test_search_bad_filter() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let mut args = search_args(&files, "blueberry");
    args.filter = Some("{array: [1]".to_string());

    let result = execute(args, &services, OutputFormat::Human).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("filter"));
}

/// Test that a missing data file is an error
#[tokio::test]
async fn test_search_missing_data_file() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let mut args = search_args(&files, "blueberry");
    args.data = files.dir.path().join("missing.json");

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err());
}

/// Test that an unsupported language surfaces the server error
#[tokio::test]
async fn test_search_unsupported_language() {
    let services = create_cli_test_services();
    let files = write_fixture_files();

    let mut args = search_args(&files, "blueberry");
    args.language = Some("klingon".to_string());

    let result = execute(args, &services, OutputFormat::Human).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("language"));
}
