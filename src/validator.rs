//! Validation engine.
//!
//! Drives one validation pass over one document: discovery of checker
//! bundles, bundle metadata resolution, capability verification, and the
//! isolated execution of each check. Failure handling is tiered:
//!
//! - a bundle whose manifest cannot be resolved is skipped whole;
//! - a checker that cannot be resolved, or lacks a required capability,
//!   is skipped alone;
//! - a check that panics or returns an error gets one synthesized
//!   Error-level issue and the run continues;
//! - a check that completes with the explicit fatal signal aborts all
//!   remaining checkers and bundles for this document.
//!
//! Documents are fully independent: each gets a fresh report and context,
//! and a fatal outcome in one has no effect on any other.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{CheckerConfig, FormatSettings};
use crate::context::{CheckerContext, DocumentHandle};
use crate::discovery::{self, checker_unit_name};
use crate::error::PluginError;
use crate::logger::Logger;
use crate::plugin::{BundleManifest, CheckerRegistry};
use crate::report::{IssueLevel, ResultReport};

/// Result of validating one document.
///
/// When `valid` is false the caller must not write a report file; issues
/// recorded before an abort remain in the report for inspection.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub report: ResultReport,
    pub valid: bool,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Synchronous validation engine for checker-bundle runs
pub struct ValidationEngine {
    registry: CheckerRegistry,
    format_root: PathBuf,
    additional_roots: Vec<PathBuf>,
    // One discovery pass per format extension per engine instance
    discovery_cache: HashMap<String, Vec<PathBuf>>,
}

impl ValidationEngine {
    /// Create an engine over a checker registry and a format root
    /// directory (the directory holding one subdirectory per format).
    pub fn new(registry: CheckerRegistry, format_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            format_root: format_root.into(),
            additional_roots: Vec::new(),
            discovery_cache: HashMap::new(),
        }
    }

    /// Additional checks roots searched after the format's default root
    pub fn with_additional_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.additional_roots = roots;
        self
    }

    /// Validate one document.
    ///
    /// `config_path` overrides the format's default `config.json`;
    /// `format_override` forces the format instead of deriving it from the
    /// file extension. Configuration problems mark the document invalid
    /// with an empty report; they never panic and never escape as errors.
    pub fn validate_file(
        &mut self,
        file: &Path,
        config_path: Option<&Path>,
        format_override: Option<&str>,
        logger: &dyn Logger,
    ) -> ValidationOutcome {
        let mut report = ResultReport::new(file);

        let extension = match format_override {
            Some(format) => format.to_string(),
            None => file
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string(),
        };
        if extension.is_empty() {
            logger.error(&format!(
                "Cannot determine a format for {}; pass one explicitly.",
                file.display()
            ));
            return ValidationOutcome {
                report,
                valid: false,
            };
        }

        let format_dir = self.format_root.join(&extension);
        let format = match FormatSettings::load(&format_dir.join("format.json")) {
            Ok(format) => format,
            Err(e) => {
                logger.error(&format!("Could not load format settings: {}", e));
                return ValidationOutcome {
                    report,
                    valid: false,
                };
            }
        };

        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => format_dir.join("config.json"),
        };
        let config = match CheckerConfig::load(&config_file) {
            Ok(config) => config,
            Err(e) => {
                logger.error(&format!("Could not load checker configuration: {}", e));
                return ValidationOutcome {
                    report,
                    valid: false,
                };
            }
        };

        let document = DocumentHandle::new(match file.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => file.to_path_buf(),
        });

        let valid = self.run_checks(&document, &format, &config, &mut report, logger);
        ValidationOutcome { report, valid }
    }

    /// Execute all discovered bundles against one document.
    ///
    /// Returns false when a check reported the fatal signal.
    fn run_checks(
        &mut self,
        document: &DocumentHandle,
        format: &FormatSettings,
        config: &CheckerConfig,
        report: &mut ResultReport,
        logger: &dyn Logger,
    ) -> bool {
        let bundle_dirs = self.discover_cached(&format.extension, logger);
        logger.debug(&format!("Found {} checker bundles", bundle_dirs.len()));

        for bundle_dir in &bundle_dirs {
            let manifest = match BundleManifest::load(bundle_dir) {
                Ok(manifest) => manifest,
                Err(e) => {
                    logger.error(&e.to_string());
                    continue;
                }
            };
            logger.debug(&format!("Running checker bundle {{{}}}", manifest.name));

            let bundle = report.gen_checker_bundle(
                &manifest.name,
                &manifest.description,
                &manifest.version,
            );
            bundle.set_param(format.file_param_name(), document.path().display().to_string());
            let bundle_index = report.bundle_count() - 1;

            let bundle_dir_name = bundle_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            let checker_files =
                discovery::discover_checker_files(bundle_dir, &manifest.order, logger);

            for checker_file in &checker_files {
                let Some(unit) = checker_unit_name(checker_file) else {
                    continue;
                };
                logger.debug(&format!("Loading checker {{{}}}", unit));

                let Some(registration) = self.registry.resolve(&bundle_dir_name, unit) else {
                    logger.error(
                        &PluginError::UnknownChecker {
                            bundle: bundle_dir_name.clone(),
                            unit: unit.to_string(),
                        }
                        .to_string(),
                    );
                    continue;
                };

                let (checker_id, description, check) = match registration.capabilities() {
                    Ok(capabilities) => capabilities,
                    Err(capability) => {
                        logger.error(
                            &PluginError::MissingCapability {
                                unit: unit.to_string(),
                                capability: capability.to_string(),
                            }
                            .to_string(),
                        );
                        continue;
                    }
                };

                let checker_index = {
                    let bundle = report
                        .bundle_mut(bundle_index)
                        .expect("bundle registered above");
                    bundle.gen_checker(checker_id, description);
                    bundle.checkers().len() - 1
                };

                let slice: Value = config.for_checker(&manifest.name, checker_id);

                let mut ctx = CheckerContext::new(
                    document,
                    format,
                    &slice,
                    report,
                    bundle_index,
                    checker_index,
                    logger,
                );
                let result = panic::catch_unwind(AssertUnwindSafe(|| check(&mut ctx)));

                match result {
                    Ok(Ok(status)) => {
                        if status.is_fatal() {
                            logger.error(&format!(
                                "Cancel checks for the file: {}",
                                checker_id
                            ));
                            return false;
                        }
                    }
                    Ok(Err(e)) => {
                        logger.error(
                            &PluginError::CheckFailed {
                                checker_id: checker_id.to_string(),
                                details: e.to_string(),
                            }
                            .to_string(),
                        );
                        self.synthesize_failure_issue(
                            document,
                            format,
                            &slice,
                            report,
                            bundle_index,
                            checker_index,
                            description,
                            logger,
                        );
                    }
                    Err(payload) => {
                        let details = panic_details(payload.as_ref());
                        logger.error(
                            &PluginError::CheckFailed {
                                checker_id: checker_id.to_string(),
                                details,
                            }
                            .to_string(),
                        );
                        self.synthesize_failure_issue(
                            document,
                            format,
                            &slice,
                            report,
                            bundle_index,
                            checker_index,
                            description,
                            logger,
                        );
                    }
                }
            }
        }
        true
    }

    /// One Error-level issue attributed to a checker whose check raised
    #[allow(clippy::too_many_arguments)]
    fn synthesize_failure_issue(
        &self,
        document: &DocumentHandle,
        format: &FormatSettings,
        slice: &Value,
        report: &mut ResultReport,
        bundle_index: usize,
        checker_index: usize,
        description: &str,
        logger: &dyn Logger,
    ) {
        let mut ctx = CheckerContext::new(
            document,
            format,
            slice,
            report,
            bundle_index,
            checker_index,
            logger,
        );
        ctx.gen_issue(
            IssueLevel::Error,
            format!("Could not {}", description),
            vec![],
        );
    }

    fn discover_cached(&mut self, extension: &str, logger: &dyn Logger) -> Vec<PathBuf> {
        if let Some(cached) = self.discovery_cache.get(extension) {
            return cached.clone();
        }

        let mut roots = vec![self.format_root.join(extension).join("checks")];
        roots.extend(self.additional_roots.iter().cloned());
        let bundles = discovery::discover_bundles(&roots, logger);

        self.discovery_cache
            .insert(extension.to_string(), bundles.clone());
        bundles
    }
}

fn panic_details(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}
