//! Completions command - shell completion scripts

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    pub fn run(&self) -> Result<()> {
        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, "cst", &mut io::stdout());
        Ok(())
    }
}
