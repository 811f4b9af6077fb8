//! CST: Cost-Savings Toolkit
//!
//! Lifecycle rules and savings arithmetic for medical cost-savings cases,
//! with a plain-text case store and a command-line front end.

pub mod cli;
pub mod core;
pub mod entities;
