//! Command-line argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::commands::calc::CalcArgs;
use crate::cli::commands::case::CaseCommands;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::report::ReportArgs;

/// Cost-Savings Toolkit - audit medical cost-savings cases kept as plain-text YAML
#[derive(Debug, Parser)]
#[command(name = "cst", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Name recorded as the actor of changes (overrides config)
    #[arg(long, global = true, env = "CST_AUTHOR")]
    pub author: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute savings figures from raw cost inputs
    Calc(CalcArgs),

    /// Manage cost-savings cases
    #[command(subcommand)]
    Case(CaseCommands),

    /// Summarize all cases in a directory
    Report(ReportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human output, unless the config names another default
    Auto,
    Human,
    Yaml,
    Json,
    Csv,
}
