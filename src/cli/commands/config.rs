//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub config_file_exists: bool,
    #[serde(flatten)]
    pub config: Config,
}

/// Execute the config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_file = XdgDirs::new().config_file();

    let response = ConfigResponse {
        config_file: config_file.to_string_lossy().into_owned(),
        config_file_exists: config_file.exists(),
        config: services.config.as_ref().clone(),
    };

    match format {
        OutputFormat::Human => {
            let search = &response.config.search;
            let engine = &response.config.engine;
            let logging = &response.config.logging;

            println!("Configuration:");
            println!(
                "  config_file: {}{}",
                response.config_file,
                if response.config_file_exists { "" } else { " (not found)" }
            );
            println!("  search:");
            println!(
                "    default_language: {}",
                search.default_language.as_deref().unwrap_or("(server default)")
            );
            match search.default_limit {
                Some(limit) => println!("    default_limit: {limit}"),
                None => println!("    default_limit: (server default)"),
            }
            println!("    allow_passthrough: {}", search.allow_passthrough);
            println!("  engine:");
            println!("    database: {}", engine.database);
            println!("    index_language: {}", engine.index_language);
            println!("    default_limit: {}", engine.default_limit);
            println!("  logging:");
            println!("    filter: {}", logging.filter);
            println!("    format: {:?}", logging.format);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
