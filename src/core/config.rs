//! Configuration management
//!
//! Settings are layered, later layers winning:
//! 1. built-in defaults
//! 2. user config (`<config dir>/cst/config.yaml`)
//! 3. project config (`.cst/config.yaml`, searched upward from the cwd)
//! 4. environment (`CST_AUTHOR`)

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::savings::SavingsThresholds;

/// Name of the per-project configuration directory
pub const PROJECT_DIR: &str = ".cst";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// One configuration file; every field optional so layers can merge
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    author: Option<String>,
    default_format: Option<String>,
    savings: Option<SavingsThresholds>,
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Name recorded as actor/author
    pub author: Option<String>,
    /// Default output format name (yaml, json, human, ...)
    pub default_format: Option<String>,
    pub savings: SavingsThresholds,
}

impl Config {
    /// Load configuration from every layer, skipping missing files.
    ///
    /// A malformed file is reported through `tracing` and ignored, so a bad
    /// user config never blocks read-only commands.
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut paths = Vec::new();
        if let Some(user) = user_config_path() {
            paths.push(user);
        }
        if let Some(project) = find_project_config(&cwd) {
            paths.push(project);
        }

        let mut config = Self::default();
        for path in paths {
            match read_layer(&path) {
                Ok(Some(layer)) => config.merge(layer),
                Ok(None) => {}
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if let Ok(author) = std::env::var("CST_AUTHOR") {
            if !author.trim().is_empty() {
                config.author = Some(author);
            }
        }
        config
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if layer.author.is_some() {
            self.author = layer.author;
        }
        if layer.default_format.is_some() {
            self.default_format = layer.default_format;
        }
        if let Some(savings) = layer.savings {
            self.savings = savings;
        }
    }

    /// Author for new records: config, then `$USER`, then "unknown"
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cst").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Find `.cst/config.yaml` in `start` or any ancestor
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR).join("config.yaml"))
        .find(|candidate| candidate.is_file())
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Some(ConfigLayer::default()));
    }
    serde_yml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
