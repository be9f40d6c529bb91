// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test binaries
#[allow(unused_imports)]
pub use fixtures::{docs_json, make_docs, post_schema, Post, POST_SCHEMA_TOML};
#[allow(unused_imports)]
pub use helpers::{
    create_test_services, seed_posts, FailingExecutor, RecordingExecutor, SeededPosts,
};
