//! Configuration management for doctext.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::engine::TextLanguage;
use crate::core::error::{DoctextError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Text search defaults applied by the command builder
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Language sent when a search does not name one
    #[serde(default)]
    pub default_language: Option<String>,

    /// Limit sent when a search does not set one
    #[serde(default)]
    pub default_limit: Option<u64>,

    /// Forward unrecognized options to the server as command parameters
    #[serde(default = "default_allow_passthrough")]
    pub allow_passthrough: bool,
}

/// Embedded engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Database name used in namespaces and error messages
    #[serde(default = "default_database")]
    pub database: String,

    /// Language text indexes are built with
    #[serde(default = "default_index_language")]
    pub index_language: String,

    /// Result limit when a text command sets none
    #[serde(default = "default_engine_limit")]
    pub default_limit: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_allow_passthrough() -> bool {
    true
}

fn default_database() -> String {
    "test".to_string()
}

fn default_index_language() -> String {
    "english".to_string()
}

fn default_engine_limit() -> u64 {
    100
}

fn default_log_filter() -> String {
    "doctext=info".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_language: None,
            default_limit: None,
            allow_passthrough: default_allow_passthrough(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            index_language: default_index_language(),
            default_limit: default_engine_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DoctextError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. DOCTEXT_CONFIG env var
    /// 2. XDG config file (~/.config/doctext/config.toml)
    /// 3. ./doctext.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("DOCTEXT_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("doctext.toml").exists() {
                Self::from_file("doctext.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Search configuration
        if let Ok(language) = env::var("DOCTEXT_DEFAULT_LANGUAGE") {
            self.search.default_language = Some(language);
        }
        if let Ok(limit) = env::var("DOCTEXT_DEFAULT_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.search.default_limit = Some(l);
            }
        }
        if let Ok(passthrough) = env::var("DOCTEXT_ALLOW_PASSTHROUGH") {
            if let Ok(p) = passthrough.parse() {
                self.search.allow_passthrough = p;
            }
        }

        // Engine configuration
        if let Ok(database) = env::var("DOCTEXT_DATABASE") {
            self.engine.database = database;
        }
        if let Ok(language) = env::var("DOCTEXT_INDEX_LANGUAGE") {
            self.engine.index_language = language;
        }
        if let Ok(limit) = env::var("DOCTEXT_ENGINE_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.engine.default_limit = l;
            }
        }

        // Logging configuration
        if let Ok(filter) = env::var("DOCTEXT_LOG") {
            self.logging.filter = filter;
        }
        if let Ok(format) = env::var("DOCTEXT_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "pretty" => self.logging.format = LogFormat::Pretty,
                _ => {}
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit == Some(0) {
            return Err(DoctextError::ConfigError(
                "Default limit must be non-zero".to_string(),
            ));
        }

        if self.engine.database.trim().is_empty() {
            return Err(DoctextError::ConfigError(
                "Database name cannot be empty".to_string(),
            ));
        }

        if self.engine.index_language.parse::<TextLanguage>().is_err() {
            return Err(DoctextError::ConfigError(format!(
                "Unsupported index language: {}",
                self.engine.index_language
            )));
        }

        if self.engine.default_limit == 0 {
            return Err(DoctextError::ConfigError(
                "Engine default limit must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Default language: {}",
            self.search.default_language.as_deref().unwrap_or("(server default)")
        );
        match self.search.default_limit {
            Some(limit) => tracing::info!("  Default limit: {}", limit),
            None => tracing::info!("  Default limit: (server default)"),
        }
        tracing::info!("  Allow pass-through: {}", self.search.allow_passthrough);
        tracing::info!("  Engine database: {}", self.engine.database);
        tracing::info!("  Engine index language: {}", self.engine.index_language);
        tracing::info!("  Engine default limit: {}", self.engine.default_limit);
    }
}
