//! CLI adapter for doctext
//!
//! Loads a JSON document file into the embedded database and runs text
//! searches against it, printing results for humans or as JSON.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// doctext - text search over document collections
///
/// Searches a JSON file of documents the way a document database's `text`
/// command does: stemmed terms, negations and phrases, with filters,
/// projections and limits.
#[derive(Parser, Debug)]
#[command(name = "doctext")]
#[command(version)]
#[command(about = "Text search over document collections", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a text search over a document file
    Search(commands::SearchArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  doctext completions bash > ~/.local/share/bash-completion/completions/doctext
    ///   zsh:   doctext completions zsh > ~/.zfunc/_doctext
    ///   fish:  doctext completions fish > ~/.config/fish/completions/doctext.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::logging::init_tracing;
    use crate::core::services::Services;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    // Load configuration
    let config = Config::load()?;
    init_tracing(&config.logging);
    config.log_config();

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Execute command
    match cli.command {
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
