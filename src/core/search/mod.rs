//! Text search over a document database.
//!
//! This module builds the server's text command from a search string and
//! options, runs it through a [`crate::core::executor::CommandExecutor`],
//! and maps the response back into model instances.

mod command;
mod options;
mod service;

pub use command::{CommandBuilder, TextCommand, RESERVED_FIELDS};
pub use options::TextSearchOptions;
pub use service::{map_response, TextSearch};
