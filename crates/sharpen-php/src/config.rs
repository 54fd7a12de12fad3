//! Analysis configuration.
//!
//! Flags are read from TOML, either at the top level of the document or
//! under an `[analysis]` section:
//!
//! ```toml
//! [analysis]
//! ignore_internal_falsable_issues = true
//! taint_tracking_enabled = true
//! ```
//!
//! Every flag defaults to `false`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Flags consumed by the resolver and the taint engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Mark "may be false" results of built-ins as suppressible.
    #[serde(default)]
    pub ignore_internal_falsable_issues: bool,

    /// Mark "may be null" results of the array-replace built-ins as suppressible.
    #[serde(default)]
    pub ignore_internal_nullable_issues: bool,

    /// Propagate taint through built-in string functions.
    #[serde(default)]
    pub taint_tracking_enabled: bool,
}

impl AnalysisConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;

        match table.remove("analysis") {
            Some(section @ toml::Value::Table(_)) => Ok(section.try_into()?),
            _ => Ok(toml::Value::Table(table).try_into()?),
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded analysis config");
        Ok(config)
    }
}
