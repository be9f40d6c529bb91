//! Core domain logic (transport-agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Raw documents and typed text search responses
//! - **xdg**: XDG directory handling
//! - **logging**: Tracing subscriber setup
//! - **schema**: Field types, filter casting, projections
//! - **model**: Model trait and the dynamic `Record` model
//! - **executor**: Command execution seam
//! - **search**: Text command builder and result mapper
//! - **engine**: Embedded in-memory database (tantivy)
//! - **services**: Unified service container

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod logging;
pub mod model;
pub mod schema;
pub mod search;
pub mod services;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{DoctextError, Result};
pub use services::Services;
