//! Shared helper functions for CLI commands

use std::io::{self, IsTerminal};

use crate::cli::GlobalOpts;
use crate::core::Config;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Whether prompts can be shown (stdin and stderr attached to a terminal)
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Actor recorded in timeline events: `--author`, then config, then `$USER`
pub fn resolve_actor(global: &GlobalOpts, config: &Config) -> String {
    global
        .author
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| config.author())
}
