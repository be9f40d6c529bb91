//! Database command execution seam.
//!
//! The adapter never talks to a database directly. It hands a command
//! document to a [`CommandExecutor`] and gets the response document back.
//! Connection handling, retries and timeouts belong to the executor.

use crate::core::types::RawDocument;
use async_trait::async_trait;
use thiserror::Error;

/// Failure to deliver a command or read its response
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,

    /// Whatever response the executor managed to read, if any
    pub response: Option<RawDocument>,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// Attach the raw response
    pub fn with_response(mut self, response: RawDocument) -> Self {
        self.response = Some(response);
        self
    }
}

/// Runs generic administrative commands against a database
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Send one command document and return the response document
    async fn run_command(&self, command: RawDocument) -> Result<RawDocument, CommandError>;

    /// Name of the backend (for status/logging)
    fn backend_name(&self) -> &'static str;
}
