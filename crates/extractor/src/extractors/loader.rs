// ABOUTME: Loads the selector configuration from a JSON document on disk or in memory.
// ABOUTME: Any read, decode or selector failure is returned as a fatal ConfigError.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::extractors::rules::{SelectorConfig, SiteRule};

impl SelectorConfig {
    /// Reads a JSON object mapping hostname to [`SiteRule`] from `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), hosts = config.len(), "selector config loaded");
        Ok(config)
    }

    /// Decodes and compiles a JSON object mapping hostname to [`SiteRule`].
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let rules: HashMap<String, SiteRule> = serde_json::from_str(raw)?;
        Self::from_rules(rules)
    }
}
