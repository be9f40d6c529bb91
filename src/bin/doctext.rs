//! doctext CLI - text search over JSON document files
//!
//! # Examples
//!
//! ```bash
//! # Search a document file, text-indexing every string field
//! doctext search "ice cream" --data posts.json
//!
//! # Filter, project and limit, with an explicit schema
//! doctext search "strings" --data posts.json --schema schema.toml \
//!     --filter '{"array": [1]}' --project "-single" --limit 5
//!
//! # Show the command that would be sent
//! doctext search "blueberry" --data posts.json --explain --format json
//!
//! # Show configuration
//! doctext show-config
//! ```

use clap::Parser;
use doctext::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
