//! Format settings and checker configuration.
//!
//! Two JSON documents are consumed, never produced, by the core:
//!
//! - `format.json` describes one document format (at least its file
//!   extension), and lives at `<format root>/<ext>/format.json`;
//! - `config.json` maps bundle name → checker id → arbitrary
//!   checker-specific settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Settings of one document format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// File extension of the format, e.g. "xodr"
    pub extension: String,
    /// Human-readable format name
    #[serde(default)]
    pub name: Option<String>,
    /// Format specification version the checks target
    #[serde(default)]
    pub version: Option<String>,
}

impl FormatSettings {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: FormatSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.extension.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "extension".to_string(),
                value: self.extension.clone(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Name of the identifying bundle param for this format, e.g.
    /// "XodrFile"
    pub fn file_param_name(&self) -> String {
        let mut chars = self.extension.chars();
        match chars.next() {
            Some(first) => format!("{}{}File", first.to_uppercase(), chars.as_str()),
            None => "File".to_string(),
        }
    }
}

/// Checker configuration: bundle name → checker id → settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckerConfig {
    bundles: serde_json::Map<String, Value>,
}

impl CheckerConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        match value {
            Value::Object(bundles) => Ok(Self { bundles }),
            other => Err(ConfigError::InvalidValue {
                field: "config".to_string(),
                value: other.to_string(),
                reason: "expected a bundle-name to checker-settings mapping".to_string(),
            }),
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(bundles) => Self { bundles },
            _ => Self::default(),
        }
    }

    /// Configuration slice for one checker.
    ///
    /// Returns `config[bundle][checker]` when present, the bundle-wide
    /// mapping when only the bundle is configured, and `Value::Null` when
    /// neither exists.
    pub fn for_checker(&self, bundle: &str, checker_id: &str) -> Value {
        match self.bundles.get(bundle) {
            Some(bundle_config) => match bundle_config.get(checker_id) {
                Some(slice) => slice.clone(),
                None => bundle_config.clone(),
            },
            None => Value::Null,
        }
    }
}
