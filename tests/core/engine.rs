//! Embedded database behavior through the public command interface

use crate::common::{create_test_services, make_docs, post_schema, seed_posts};
use doctext::core::config::EngineConfig;
use doctext::core::engine::{MemoryDatabase, TextLanguage};
use doctext::core::types::RawDocument;
use serde_json::{json, Value};

fn command(value: Value) -> RawDocument {
    value.as_object().cloned().unwrap()
}

fn result_ids(response: &RawDocument) -> Vec<String> {
    response["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["obj"]["_id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_seeded_text_command() {
    let services = create_test_services();
    let seeded = seed_posts(&services);

    let response = services
        .database
        .execute(&command(json!({"text": "posts", "search": "elephant"})));
    assert_eq!(response["ok"], json!(1));
    assert_eq!(result_ids(&response), vec![seeded.elephant]);
}

#[test]
fn test_iso_language_code() {
    let services = create_test_services();
    seed_posts(&services);

    let response = services.database.execute(&command(
        json!({"text": "posts", "search": "funny", "language": "es"}),
    ));
    assert_eq!(response["language"], json!("spanish"));
    assert!(result_ids(&response).is_empty());
}

#[test]
fn test_inclusive_projection_and_regex_filter() {
    let services = create_test_services();
    let seeded = seed_posts(&services);

    let response = services.database.execute(&command(json!({
        "text": "posts",
        "search": "string",
        "filter": {"single": {"$regex": "^ELEPHANT", "$options": "i"}},
        "project": {"array": 1}
    })));

    assert_eq!(result_ids(&response), vec![seeded.elephant]);
    let obj = response["results"][0]["obj"].as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["_id", "array"]);
}

#[test]
fn test_non_english_index_language() {
    let db = MemoryDatabase::new(EngineConfig {
        index_language: "spanish".to_string(),
        ..EngineConfig::default()
    })
    .unwrap();
    db.insert_many(
        "recetas",
        vec![command(json!({"titulo": "Helados caseros"}))],
    )
    .unwrap();
    db.create_text_index("recetas", ["titulo"], None).unwrap();

    let response = db.execute(&command(json!({"text": "recetas", "search": "helado"})));
    assert_eq!(response["language"], json!("spanish"));
    assert_eq!(result_ids(&response).len(), 1);

    db.create_text_index("other", ["titulo"], Some(TextLanguage::None))
        .unwrap();
}

#[test]
fn test_engine_limit_default() {
    let db = MemoryDatabase::new(EngineConfig {
        default_limit: 2,
        ..EngineConfig::default()
    })
    .unwrap();
    let docs: Vec<RawDocument> = (0..5)
        .map(|i| command(json!({"body": format!("note number {i}")})))
        .collect();
    db.insert_many("notes", docs).unwrap();
    db.create_text_index("notes", ["body"], None).unwrap();

    let response = db.execute(&command(json!({"text": "notes", "search": "note"})));
    assert_eq!(result_ids(&response).len(), 2);
    assert_eq!(response["stats"]["nfound"], json!(5));
}

#[test]
fn test_schema_driven_index_matches_fixture() {
    let db = MemoryDatabase::new(EngineConfig::default()).unwrap();
    db.insert_many("posts", make_docs()).unwrap();
    db.ensure_text_index("posts", &post_schema()).unwrap();
    assert_eq!(db.count("posts").unwrap(), 3);

    let response = db.execute(&command(json!({"text": "posts", "search": "ice cream"})));
    assert_eq!(result_ids(&response).len(), 1);
}
