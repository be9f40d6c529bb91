//! Schema-driven command building

use crate::common::{post_schema, Post, POST_SCHEMA_TOML};
use doctext::core::config::SearchConfig;
use doctext::core::error::DoctextError;
use doctext::core::model::Model;
use doctext::core::schema::{FieldType, Projection, Schema, SchemaField};
use doctext::core::search::{CommandBuilder, TextSearchOptions};
use serde_json::json;

#[test]
fn test_toml_schema_matches_model_schema() {
    let schema = Schema::from_toml_str(POST_SCHEMA_TOML).unwrap();
    assert_eq!(schema, post_schema());
    assert_eq!(schema.text_fields(), vec!["array", "single"]);
}

#[test]
fn test_builder_casts_and_resolves() {
    let schema = Post::schema().with_field(
        "secret",
        SchemaField::new(FieldType::String).deselected(),
    );
    let config = SearchConfig::default();
    let builder = CommandBuilder::new(&schema, &config);

    let options = TextSearchOptions::new()
        .filter(json!({"$or": [{"views": "12"}, {"array": {"$in": [3, true]}}]}))
        .project("-single");
    let command = builder.build(Post::COLLECTION, "strings", &options).unwrap();
    let document = command.as_document();

    assert_eq!(
        document["filter"],
        json!({"$or": [{"views": 12}, {"array": {"$in": ["3", "true"]}}]})
    );
    assert_eq!(document["project"], json!({"single": 0, "secret": 0}));
}

#[test]
fn test_builder_force_includes_deselected() {
    let schema = Schema::new()
        .with_field("body", SchemaField::new(FieldType::String).text())
        .with_field("secret", SchemaField::new(FieldType::String).deselected());
    let config = SearchConfig::default();
    let builder = CommandBuilder::new(&schema, &config);

    let options = TextSearchOptions::new().project(Projection::from("body +secret"));
    let command = builder.build("notes", "x", &options).unwrap();
    assert_eq!(command.as_document()["project"], json!({"body": 1, "secret": 1}));
}

#[test]
fn test_option_bag_dispatch() {
    let bag = json!({
        "limit": 3,
        "lean": true,
        "project": "-single",
        "language": "english",
        "score": {"$meta": "textScore"}
    });
    let options = TextSearchOptions::from_document(bag.as_object().unwrap()).unwrap();
    assert_eq!(options.limit, Some(json!(3)));
    assert!(options.lean);
    assert_eq!(options.extra.len(), 1);

    let bag = json!({"search": "sneaky"});
    let err = TextSearchOptions::from_document(bag.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, DoctextError::InvalidOption(_)));
}
