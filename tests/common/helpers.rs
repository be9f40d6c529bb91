// Test helper functions

use super::fixtures::{make_docs, Post};
use async_trait::async_trait;
use doctext::core::config::Config;
use doctext::core::executor::{CommandError, CommandExecutor};
use doctext::core::model::Model;
use doctext::core::services::Services;
use doctext::core::types::RawDocument;
use std::sync::{Arc, Mutex};

/// Create test services with default configuration
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services() -> Services {
    Services::new(Config::default()).expect("Failed to create services")
}

/// Ids of the seeded posts, in insertion order
#[allow(dead_code)] // Used in integration tests
#[derive(Debug, Clone)]
pub struct SeededPosts {
    pub blueberry: String,
    pub elephant: String,
    pub letters: String,
}

/// Insert the fixture posts and build their text index
#[allow(dead_code)] // Used in integration tests
pub fn seed_posts(services: &Services) -> SeededPosts {
    let stored = services
        .database
        .insert_many(Post::COLLECTION, make_docs())
        .expect("Failed to insert posts");
    services
        .database
        .ensure_text_index(Post::COLLECTION, &Post::schema())
        .expect("Failed to create text index");

    let id = |i: usize| {
        stored[i]["_id"]
            .as_str()
            .expect("inserted documents have string ids")
            .to_string()
    };

    SeededPosts {
        blueberry: id(0),
        elephant: id(1),
        letters: id(2),
    }
}

/// Executor that records every command before delegating
#[allow(dead_code)] // Used in integration tests
pub struct RecordingExecutor {
    inner: Arc<dyn CommandExecutor>,
    sent: Mutex<Vec<RawDocument>>,
}

#[allow(dead_code)] // Used in integration tests
impl RecordingExecutor {
    pub fn new(inner: Arc<dyn CommandExecutor>) -> Self {
        Self {
            inner,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<RawDocument> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run_command(&self, command: RawDocument) -> Result<RawDocument, CommandError> {
        self.sent.lock().expect("lock").push(command.clone());
        self.inner.run_command(command).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Executor whose connection always fails
#[allow(dead_code)] // Used in integration tests
pub struct FailingExecutor;

#[async_trait]
impl CommandExecutor for FailingExecutor {
    async fn run_command(&self, _command: RawDocument) -> Result<RawDocument, CommandError> {
        Err(CommandError::new("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
