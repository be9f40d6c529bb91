//! XDG Base Directory Support
//!
//! Resolves where doctext looks for its configuration file.

use std::env;
use std::path::PathBuf;

/// XDG directory structure for doctext
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure with proper resolution order
    ///
    /// Priority order (highest to lowest):
    /// 1. DOCTEXT_CONFIG_DIR
    /// 2. XDG_CONFIG_HOME
    /// 3. XDG default (~/.config)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Resolve config directory
    fn resolve_config_dir() -> PathBuf {
        if let Ok(dir) = env::var("DOCTEXT_CONFIG_DIR") {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("doctext");
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("doctext")
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        // Check DOCTEXT_CONFIG_FILE first (explicit override)
        if let Ok(file) = env::var("DOCTEXT_CONFIG_FILE") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
