//! Plugin contract and checker registry.
//!
//! A checker bundle is a directory: its `bundle.toml` manifest carries the
//! bundle metadata and an optional checker ordering, and each checker unit
//! is represented on disk by a `check_*.toml` descriptor file. The check
//! implementations themselves are registered in code: the registry maps a
//! `(bundle directory name, checker unit name)` pair to a
//! `CheckerRegistration`.
//!
//! Each registration exposes exactly three capabilities: an identifier
//! accessor, a description accessor, and a check function. They are held
//! individually so that an incomplete registration can be detected and
//! skipped instead of aborting the run.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::context::CheckerContext;
use crate::error::PluginError;

/// Outcome a check function reports on normal completion.
///
/// `Fatal` is the explicit non-success signal: the document cannot be
/// meaningfully checked any further, distinct from the check itself
/// failing with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check ran to completion; any findings were attached as issues
    Completed,
    /// Abort all remaining checkers and bundles for this document
    Fatal,
}

impl CheckStatus {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckStatus::Fatal)
    }
}

/// A check function takes the shared execution context and either
/// completes with a status or fails with an arbitrary plugin-defined error.
pub type CheckFn = Box<dyn Fn(&mut CheckerContext<'_>) -> anyhow::Result<CheckStatus>>;

/// One registered checker unit: the capability surface a checker must
/// expose to be executed.
pub struct CheckerRegistration {
    checker_id: Option<String>,
    description: Option<String>,
    check: Option<CheckFn>,
}

impl CheckerRegistration {
    /// Create a complete registration
    pub fn new<F>(
        checker_id: impl Into<String>,
        description: impl Into<String>,
        check: F,
    ) -> Self
    where
        F: Fn(&mut CheckerContext<'_>) -> anyhow::Result<CheckStatus> + 'static,
    {
        Self {
            checker_id: Some(checker_id.into()),
            description: Some(description.into()),
            check: Some(Box::new(check)),
        }
    }

    /// Create an empty registration; capabilities are attached with the
    /// `with_*` builders. Useful for exercising capability verification.
    pub fn empty() -> Self {
        Self {
            checker_id: None,
            description: None,
            check: None,
        }
    }

    pub fn with_checker_id(mut self, checker_id: impl Into<String>) -> Self {
        self.checker_id = Some(checker_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&mut CheckerContext<'_>) -> anyhow::Result<CheckStatus> + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }

    pub fn checker_id(&self) -> Option<&str> {
        self.checker_id.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn check(&self) -> Option<&CheckFn> {
        self.check.as_ref()
    }

    /// Name of the first missing required capability, if any
    pub fn missing_capability(&self) -> Option<&'static str> {
        if self.checker_id.is_none() {
            return Some("checker_id");
        }
        if self.description.is_none() {
            return Some("description");
        }
        if self.check.is_none() {
            return Some("check");
        }
        None
    }

    /// The full capability surface, or the name of the first missing
    /// capability
    pub fn capabilities(&self) -> Result<(&str, &str, &CheckFn), &'static str> {
        match (&self.checker_id, &self.description, &self.check) {
            (Some(checker_id), Some(description), Some(check)) => {
                Ok((checker_id, description, check))
            }
            _ => Err(self.missing_capability().unwrap_or("check")),
        }
    }
}

/// Registry of check implementations, keyed by bundle directory name and
/// checker unit name (the descriptor file stem, e.g. `check_road_ids`).
#[derive(Default)]
pub struct CheckerRegistry {
    bundles: HashMap<String, HashMap<String, CheckerRegistration>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checker unit for a bundle directory name.
    ///
    /// A later registration for the same pair replaces the earlier one.
    pub fn register(
        &mut self,
        bundle: impl Into<String>,
        unit: impl Into<String>,
        registration: CheckerRegistration,
    ) {
        self.bundles
            .entry(bundle.into())
            .or_default()
            .insert(unit.into(), registration);
    }

    /// Resolve the registration for one checker unit
    pub fn resolve(&self, bundle: &str, unit: &str) -> Option<&CheckerRegistration> {
        self.bundles.get(bundle)?.get(unit)
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

/// Bundle metadata manifest, `bundle.toml` in the bundle directory.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_bundle_version")]
    pub version: String,
    /// Optional checker ordering: bare unit names or full file names
    #[serde(default)]
    pub order: Vec<String>,
}

fn default_bundle_version() -> String {
    "0.0.0".to_string()
}

impl BundleManifest {
    /// File name of the manifest inside a bundle directory
    pub const FILE_NAME: &'static str = "bundle.toml";

    /// Load the manifest of one bundle directory
    pub fn load(bundle_dir: &Path) -> Result<Self, PluginError> {
        let path = bundle_dir.join(Self::FILE_NAME);
        let contents = std::fs::read_to_string(&path).map_err(|e| PluginError::BundleManifest {
            path: path.clone(),
            details: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| PluginError::BundleManifest {
            path,
            details: e.to_string(),
        })
    }
}
