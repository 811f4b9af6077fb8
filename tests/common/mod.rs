//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a cst command with a fixed author and no user config
pub fn cst(home: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("cst"));
    cmd.env("CST_AUTHOR", "auditor.test")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CST_LOG");
    cmd
}

/// Helper to create an empty workspace in a temp directory
pub fn setup_workspace() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper to create a case and return its file path
pub fn create_case(tmp: &TempDir, title: &str, initial_monthly: &str, extra: &[&str]) -> PathBuf {
    let before = case_files(tmp.path());

    let mut args = vec![
        "case",
        "new",
        ".",
        "--title",
        title,
        "--patient",
        "HC-1042",
        "--diagnosis",
        "Artritis reumatoidea",
        "--initial-monthly",
        initial_monthly,
        "--months",
        "6",
    ];
    args.extend_from_slice(extra);

    cst(tmp.path())
        .current_dir(tmp.path())
        .args(&args)
        .assert()
        .success();

    case_files(tmp.path())
        .into_iter()
        .find(|p| !before.contains(p))
        .expect("case file created")
}

/// All case files directly inside `dir`
pub fn case_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.to_string_lossy().ends_with(".case.yaml"))
        .collect();
    files.sort();
    files
}

/// Read a case file as text
pub fn read_case(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
