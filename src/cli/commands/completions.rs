//! Completions command - print shell completion scripts for `doctext`

use crate::cli::Cli;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` into `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}
