use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report output error: {path} - {details}")]
    ReportOutput { path: PathBuf, details: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Plugin resolution and execution error types.
///
/// These never abort a whole run on their own: the execution engine logs
/// them and skips the affected bundle or checker (see `validator`).
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Could not load checker bundle manifest: {path} - {details}")]
    BundleManifest { path: PathBuf, details: String },

    #[error("No checker registered for '{unit}' in bundle '{bundle}'")]
    UnknownChecker { bundle: String, unit: String },

    #[error("Checker '{unit}' has no required capability '{capability}'")]
    MissingCapability { unit: String, capability: String },

    #[error("Check '{checker_id}' failed: {details}")]
    CheckFailed { checker_id: String, details: String },
}

// Error conversion implementations
impl From<ConfigError> for ValidationError {
    fn from(err: ConfigError) -> Self {
        ValidationError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
