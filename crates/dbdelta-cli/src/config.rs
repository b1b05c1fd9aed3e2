//! Configuration file (dbdelta.toml)

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Defaults for the diff command; command-line flags take precedence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffDefaults {
    /// Schema pairs as `REFERENCE=TARGET`
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Object kinds to compare (e.g. "table", "view")
    #[serde(default)]
    pub types: Vec<String>,

    /// Include patterns for object names
    #[serde(default)]
    pub include_objects: Option<String>,

    /// Exclude patterns for object names
    #[serde(default)]
    pub exclude_objects: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for `dbdelta diff`
    #[serde(default)]
    pub diff: DiffDefaults,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
