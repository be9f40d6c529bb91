//! doctext - text search for document models
//!
//! Adds a `text_search` operation to schema-bound document models: the
//! search string and options become a single `text` command for the
//! database, and the response comes back with every matched document
//! rehydrated as a model instance (or left raw in lean mode).
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - schema (casting filters, resolving projections)
//!   - search (command builder, result mapper)
//!   - executor (the seam to the database)
//!   - engine (embedded tantivy-backed database)
//!   - config, error, logging, types, xdg
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Example
//!
//! ```no_run
//! use doctext::{Config, Services, TextSearchOptions};
//! use doctext::core::schema::{FieldType, Schema, SchemaField};
//!
//! # async fn demo() -> doctext::Result<()> {
//! let services = Services::new(Config::default())?;
//! let schema = Schema::new()
//!     .with_field("title", SchemaField::new(FieldType::String).text());
//! let search = services.text_search_with_schema("posts", schema);
//!
//! let response = search
//!     .text_search("ice cream", TextSearchOptions::new().limit(5))
//!     .await?;
//! for record in response.models() {
//!     println!("{:?}", record.id());
//! }
//! # Ok(())
//! # }
//! ```

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::engine::MemoryDatabase;
pub use crate::core::error::{DoctextError, Result};
pub use crate::core::executor::{CommandError, CommandExecutor};
pub use crate::core::model::{Model, Record};
pub use crate::core::search::{TextSearch, TextSearchOptions};
pub use crate::core::services::Services;
pub use crate::core::types::*;
