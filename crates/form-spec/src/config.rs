use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::options::{ALL_OPTIONS, is_known_option};
use crate::spec::InputOptions;
use crate::validate::Diagnostic;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML form config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON form config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Form-level settings shared by every input the form resolves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FormConfig {
    /// Forces every input into read-only, read mode.
    pub read_only: bool,
    /// Inputs start in read mode until the form enters edit mode.
    pub read_mode: bool,
    /// Options applied under every input spec, keyed like spec options.
    pub defaults: InputOptions,
}

impl FormConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads `.json` files as JSON and everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_toml_str(&raw),
        }
    }

    /// Findings for option keys under `defaults` that no input recognizes.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let keys: Vec<String> = self
            .defaults
            .other
            .keys()
            .filter(|key| !is_known_option(key))
            .cloned()
            .collect();
        if keys.is_empty() {
            return Vec::new();
        }
        let defaults_json = Value::Object(Map::from(self.defaults.clone()));
        warn!(
            invalid = ?keys,
            allowed = ?ALL_OPTIONS.as_slice(),
            defaults = %defaults_json,
            "Invalid form defaults"
        );
        vec![Diagnostic::UnknownKeys { keys }]
    }
}
