//! # validate-doc Library
//!
//! A harness for validating structured documents against pluggable
//! checker bundles. Bundles and the checkers inside them are discovered
//! on disk and ordered by manifests; check implementations are registered
//! in code through a [`plugin::CheckerRegistry`]; findings accumulate in a
//! [`report::ResultReport`] that serializes to canonical XQAR XML, a
//! generic JSON dump, or an indented text listing.
//!
//! The engine is single-threaded and fully synchronous: one document at a
//! time, checkers strictly sequential, with per-checker failure isolation
//! and an explicit fatal signal for aborting a document.

pub mod cli;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod file_discovery;
pub mod logger;
pub mod output;
pub mod plugin;
pub mod report;
pub mod serialize;
pub mod validator;

pub use cli::{Cli, ExitType, OutputType};
pub use config::{CheckerConfig, FormatSettings};
pub use context::{CheckerContext, DocumentHandle};
pub use discovery::{discover_bundles, discover_checker_files};
pub use error::{ConfigError, PluginError, ValidationError};
pub use file_discovery::FileDiscovery;
pub use logger::{LogLevel, Logger, MemoryLogger, StderrLogger, VerbosityLevel};
pub use output::Output;
pub use plugin::{BundleManifest, CheckFn, CheckStatus, CheckerRegistration, CheckerRegistry};
pub use report::{Checker, CheckerBundle, Issue, IssueLevel, Location, ResultReport};
pub use validator::{ValidationEngine, ValidationOutcome};
