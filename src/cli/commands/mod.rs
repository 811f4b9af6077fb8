//! CLI command implementations

pub mod calc;
pub mod case;
pub mod completions;
pub mod report;
