//! Error types and error handling for doctext.
//!
//! This module defines the error type used throughout the crate. Errors
//! fall into four groups: validation failures detected before a command is
//! sent, transport failures reported by the executor, errors reported by the
//! database server inside a response, and local failures (hydration,
//! configuration, the embedded engine).

use crate::core::types::RawDocument;
use thiserror::Error;

/// Result type alias for doctext operations
pub type Result<T> = std::result::Result<T, DoctextError>;

/// Main error type for doctext
#[derive(Error, Debug)]
pub enum DoctextError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Cast to {expected} failed for value {value} at path \"{path}\"")]
    Cast {
        path: String,
        expected: String,
        value: String,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid projection: {0}")]
    Projection(String),

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        response: Option<RawDocument>,
    },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Failed to initialize document: {0}")]
    Hydration(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl DoctextError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if the error was raised before any command left the process
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DoctextError::InvalidQuery(_)
                | DoctextError::InvalidOption(_)
                | DoctextError::Cast { .. }
                | DoctextError::InvalidFilter(_)
                | DoctextError::Projection(_)
        )
    }

    /// Check if the executor failed to deliver the command
    pub fn is_transport(&self) -> bool {
        matches!(self, DoctextError::Transport { .. })
    }

    /// Check if the server answered with an error message
    pub fn is_server(&self) -> bool {
        matches!(self, DoctextError::Server(_))
    }

    /// Raw response attached to a transport error, if any
    pub fn response(&self) -> Option<&RawDocument> {
        match self {
            DoctextError::Transport { response, .. } => response.as_ref(),
            _ => None,
        }
    }
}
