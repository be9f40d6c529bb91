//! Unified service container for doctext
//!
//! Provides shared access to the configuration and the embedded database.

use crate::core::config::Config;
use crate::core::engine::MemoryDatabase;
use crate::core::error::Result;
use crate::core::executor::CommandExecutor;
use crate::core::model::{Model, Record};
use crate::core::schema::Schema;
use crate::core::search::TextSearch;
use std::sync::Arc;

/// Unified services container
#[derive(Clone, Debug)]
pub struct Services {
    /// Embedded database answering text commands
    pub database: Arc<MemoryDatabase>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Result<Self> {
        let database = Arc::new(MemoryDatabase::new(config.engine.clone())?);

        Ok(Self {
            database,
            config: Arc::new(config),
        })
    }

    /// The database as a command executor
    pub fn executor(&self) -> Arc<dyn CommandExecutor> {
        self.database.clone()
    }

    /// Text search handle for a compile-time model
    pub fn text_search<M: Model>(&self) -> TextSearch<M> {
        TextSearch::new(self.executor()).with_config(self.config.search.clone())
    }

    /// Text search handle for a schema only known at runtime
    pub fn text_search_with_schema(
        &self,
        collection: impl Into<String>,
        schema: Schema,
    ) -> TextSearch<Record> {
        TextSearch::with_schema(self.executor(), collection, schema)
            .with_config(self.config.search.clone())
    }
}
