//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use miette::Result;

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Calc(args) => args.run(&global),
        Commands::Case(cmd) => commands::case::run(cmd, &global),
        Commands::Report(args) => args.run(&global),
        Commands::Completions(args) => args.run(),
    }
}
