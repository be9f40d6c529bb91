// Test fixtures for integration testing

use doctext::core::error::Result;
use doctext::core::model::{from_fields, Model};
use doctext::core::schema::{FieldType, Schema, SchemaField};
use doctext::core::types::RawDocument;
use serde::Deserialize;
use serde_json::json;

/// Model with a text-indexed string and string array
#[allow(dead_code)] // Used in integration tests
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub single: Option<String>,
    pub array: Option<Vec<String>>,
}

impl Model for Post {
    const COLLECTION: &'static str = "posts";

    fn schema() -> Schema {
        post_schema()
    }

    fn init(fields: RawDocument) -> Result<Self> {
        from_fields(fields)
    }
}

/// `single` and `array` are text indexed; `views` is only used for casting
#[allow(dead_code)] // Used in integration tests
pub fn post_schema() -> Schema {
    Schema::new()
        .with_field("single", SchemaField::new(FieldType::String).text())
        .with_field(
            "array",
            SchemaField::new(FieldType::array(FieldType::String)).text(),
        )
        .with_field("views", SchemaField::new(FieldType::Number))
}

/// The three seeded documents: blueberry, elephant, letters
#[allow(dead_code)] // Used in integration tests
pub fn make_docs() -> Vec<RawDocument> {
    vec![
        json!({
            "single": "Blueberry",
            "array": ["array", "of", "strings"]
        }),
        json!({
            "single": "elephant a string",
            "array": ["1"]
        }),
        json!({
            "single": "a significant word ice cream funny"
        }),
    ]
    .into_iter()
    .filter_map(|value| value.as_object().cloned())
    .collect()
}

/// Same documents as a JSON file body
#[allow(dead_code)] // Used in CLI tests
pub fn docs_json() -> String {
    serde_json::to_string_pretty(&make_docs()).expect("fixture documents serialize")
}

/// Schema file matching `post_schema`
#[allow(dead_code)] // Used in CLI tests
pub const POST_SCHEMA_TOML: &str = r#"
[fields.single]
type = "string"
text = true

[fields.array]
type = { array = "string" }
text = true

[fields.views]
type = "number"
"#;
