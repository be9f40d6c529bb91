//! End-to-end text search against the embedded database
//!
//! Seeds the three fixture posts and exercises the search handle the way
//! an application would: typed models, lean documents, limits, filters,
//! projections and language overrides.

use crate::common::{create_test_services, seed_posts, FailingExecutor, Post, RecordingExecutor};
use doctext::core::config::SearchConfig;
use doctext::core::error::DoctextError;
use doctext::core::executor::CommandExecutor;
use doctext::core::search::{TextSearch, TextSearchOptions};
use doctext::core::types::Materialized;
use serde_json::json;
use std::sync::Arc;

/// Test that an empty search is rejected before anything is sent
#[tokio::test]
async fn test_requires_a_search() {
    let services = create_test_services();
    seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    for blank in ["", "   "] {
        let result = search.text_search(blank, TextSearchOptions::new()).await;
        let err = result.expect_err("blank search must fail");
        assert!(matches!(err, DoctextError::InvalidQuery(_)));
        assert!(err.is_validation());
    }
    assert!(recorder.sent().is_empty());
}

/// Test that results come back as model instances
#[tokio::test]
async fn test_casts_results_to_models() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search("blueberry", TextSearchOptions::new())
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    assert!(response.iter().all(|m| matches!(m.obj, Some(Materialized::Model(_)))));
    let post = response.models().next().unwrap();
    assert_eq!(post.id, seeded.blueberry);
    assert_eq!(post.single.as_deref(), Some("Blueberry"));
    assert!(response.iter().all(|m| m.score > 0.0));
}

/// Test that limit caps the result count
#[tokio::test]
async fn test_accepts_limit() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search("strings", TextSearchOptions::new().limit(1))
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    assert_eq!(response.models().next().unwrap().id, seeded.blueberry);
    let stats = response.stats().unwrap();
    assert_eq!(stats.n, 1);
    assert_eq!(stats.nfound, 2);
}

/// Test that the filter is cast through the schema before it is applied
#[tokio::test]
async fn test_accepts_filter_and_casts() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    let response = search
        .text_search(
            "strings",
            TextSearchOptions::new().filter(json!({"array": [1]})),
        )
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    assert_eq!(response.models().next().unwrap().id, seeded.elephant);

    let sent = recorder.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["filter"], json!({"array": ["1"]}));
}

/// Test that $elemMatch is cast against the array's element type
#[tokio::test]
async fn test_elem_match_filter() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    let response = search
        .text_search(
            "strings",
            TextSearchOptions::new().filter(json!({"array": {"$elemMatch": {"$eq": 1}}})),
        )
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    assert_eq!(response.models().next().unwrap().id, seeded.elephant);
    assert_eq!(
        recorder.sent()[0]["filter"],
        json!({"array": {"$elemMatch": {"$eq": "1"}}})
    );
}

/// Test that option documents reach the server unmodified and in order
#[tokio::test]
async fn test_option_document_forwarded_verbatim() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    let bag = json!({"language": "english", "limit": 1.0});
    let options = TextSearchOptions::from_document(bag.as_object().unwrap()).unwrap();
    let response = search.text_search("strings", options).await.unwrap();

    assert_eq!(response.len(), 1);
    assert_eq!(response.models().next().unwrap().id, seeded.blueberry);

    let sent = recorder.sent();
    let keys: Vec<&str> = sent[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["text", "search", "language", "limit"]);
    assert_eq!(sent[0]["limit"], json!(1.0));
}

/// Test projection with object syntax
#[tokio::test]
async fn test_accepts_project_object() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search(
            "funny",
            TextSearchOptions::new().project(json!({"single": 0}).as_object().cloned().unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    let post = response.models().next().unwrap();
    assert_eq!(post.id, seeded.letters);
    assert_eq!(post.single, None);
}

/// Test projection with string syntax
#[tokio::test]
async fn test_accepts_project_string() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search("funny", TextSearchOptions::new().project("-single"))
        .await
        .unwrap();

    assert_eq!(response.len(), 1);
    let post = response.models().next().unwrap();
    assert_eq!(post.id, seeded.letters);
    assert_eq!(post.single, None);
}

/// Test that the query language changes stemming
#[tokio::test]
async fn test_accepts_language() {
    let services = create_test_services();
    seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search("funny", TextSearchOptions::new().language("spanish"))
        .await
        .unwrap();

    assert_eq!(response.len(), 0);
    assert!(response.results.is_some());
    assert_eq!(response.language(), Some("spanish"));
}

/// Test lean mode returns raw documents
#[tokio::test]
async fn test_accepts_lean() {
    let services = create_test_services();
    let seeded = seed_posts(&services);
    let search = services.text_search::<Post>();

    let response = search
        .text_search("string", TextSearchOptions::new().lean(true))
        .await
        .unwrap();

    assert_eq!(response.len(), 2);
    assert_eq!(response.models().count(), 0);
    let ids: Vec<&str> = response
        .iter()
        .filter_map(|m| m.obj.as_ref().and_then(Materialized::as_lean))
        .filter_map(|doc| doc["_id"].as_str())
        .collect();
    assert!(ids.contains(&seeded.blueberry.as_str()));
    assert!(ids.contains(&seeded.elephant.as_str()));
}

/// Test the callback form hands over the same outcome
#[tokio::test]
async fn test_callback_form() {
    let services = create_test_services();
    seed_posts(&services);
    let search = services.text_search::<Post>();

    let mut outcome = None;
    search
        .text_search_with("blueberry", TextSearchOptions::new(), |result| {
            outcome = Some(result.map(|response| response.len()));
        })
        .await;
    assert_eq!(outcome.unwrap().unwrap(), 1);

    let mut outcome = None;
    search
        .text_search_with("", TextSearchOptions::new(), |result| {
            outcome = Some(result.is_err());
        })
        .await;
    assert_eq!(outcome, Some(true));
}

/// Test the command layout: text, search, then options, then extras
#[tokio::test]
async fn test_command_payload_order() {
    let services = create_test_services();
    seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    search
        .text_search(
            "ice cream",
            TextSearchOptions::new()
                .param("hint", "posts_text")
                .language("english")
                .limit(5),
        )
        .await
        .unwrap();

    let sent = recorder.sent();
    assert_eq!(sent.len(), 1);
    let keys: Vec<&str> = sent[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["text", "search", "hint", "language", "limit"]);
    assert_eq!(sent[0]["text"], json!("posts"));
    assert_eq!(sent[0]["search"], json!("ice cream"));
}

/// Test that extras are rejected when pass-through is disabled
#[tokio::test]
async fn test_passthrough_disabled() {
    let services = create_test_services();
    seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone()).with_config(SearchConfig {
        allow_passthrough: false,
        ..SearchConfig::default()
    });

    let err = search
        .text_search("ice", TextSearchOptions::new().param("hint", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DoctextError::InvalidOption(_)));
    assert!(recorder.sent().is_empty());
}

/// Test that cast failures surface before sending
#[tokio::test]
async fn test_cast_failure_is_validation_error() {
    let services = create_test_services();
    seed_posts(&services);
    let recorder = Arc::new(RecordingExecutor::new(services.executor()));
    let search = TextSearch::<Post>::new(recorder.clone());

    let err = search
        .text_search(
            "ice",
            TextSearchOptions::new().filter(json!({"views": "lots"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DoctextError::Cast { .. }));
    assert!(recorder.sent().is_empty());
}

/// Test that server-side failures come back as server errors
#[tokio::test]
async fn test_server_error_without_text_index() {
    let services = create_test_services();
    services
        .database
        .insert_many("posts", crate::common::make_docs())
        .unwrap();
    let search = services.text_search::<Post>();

    let err = search
        .text_search("blueberry", TextSearchOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_server());
    assert!(err.message().contains("no text index"));
}

/// Test that connection failures come back as transport errors
#[tokio::test]
async fn test_transport_error() {
    let executor: Arc<dyn CommandExecutor> = Arc::new(FailingExecutor);
    let search = TextSearch::<Post>::new(executor);

    let err = search
        .text_search("blueberry", TextSearchOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(err.message().contains("connection refused"));
}

/// Test that a cloned handle can be used from several tasks
#[tokio::test]
async fn test_concurrent_searches() {
    let services = create_test_services();
    seed_posts(&services);
    let search = services.text_search::<Post>();

    let handles: Vec<_> = ["blueberry", "elephant", "funny"]
        .into_iter()
        .map(|term| {
            let search = search.clone();
            tokio::spawn(async move { search.text_search(term, TextSearchOptions::new()).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.len(), 1);
    }
}
