//! Shared per-document execution context.
//!
//! One `DocumentHandle` and one report accumulator exist per validated
//! document; a fresh `CheckerContext` borrowing both is handed to every
//! check invocation, pointing at the checker the engine is currently
//! executing. The context's issue-write primitives are the only way a
//! check reaches the report.

use std::cell::{Cell, OnceCell, Ref, RefCell};
use std::path::{Path, PathBuf};

use serde_json::Value;
use uuid::Uuid;

use crate::config::FormatSettings;
use crate::error::Result;
use crate::logger::Logger;
use crate::report::{Checker, Issue, IssueLevel, Location, ResultReport};

/// Opaque handle to the document under validation.
///
/// The raw text is read lazily and at most once. The `data` and `version`
/// slots are cross-checker scratch space: an early checker typically
/// parses the document and stores the result for the checkers behind it.
pub struct DocumentHandle {
    path: PathBuf,
    contents: OnceCell<String>,
    data: RefCell<Option<Value>>,
    version: Cell<Option<(u32, u32)>>,
}

impl DocumentHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: OnceCell::new(),
            data: RefCell::new(None),
            version: Cell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw document text, read on first access
    pub fn text(&self) -> Result<&str> {
        if self.contents.get().is_none() {
            let contents = std::fs::read_to_string(&self.path)?;
            let _ = self.contents.set(contents);
        }
        Ok(self.contents.get().unwrap().as_str())
    }

    /// Parsed payload stored by an earlier checker, if any
    pub fn data(&self) -> Ref<'_, Option<Value>> {
        self.data.borrow()
    }

    pub fn set_data(&self, data: Value) {
        *self.data.borrow_mut() = Some(data);
    }

    /// Document format version detected by an earlier checker, if any
    pub fn version(&self) -> Option<(u32, u32)> {
        self.version.get()
    }

    pub fn set_version(&self, major: u32, minor: u32) {
        self.version.set(Some((major, minor)));
    }
}

/// The execution context passed to every check function.
pub struct CheckerContext<'a> {
    document: &'a DocumentHandle,
    format: &'a FormatSettings,
    config: &'a Value,
    report: &'a mut ResultReport,
    bundle_index: usize,
    checker_index: usize,
    logger: &'a dyn Logger,
}

impl<'a> CheckerContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        document: &'a DocumentHandle,
        format: &'a FormatSettings,
        config: &'a Value,
        report: &'a mut ResultReport,
        bundle_index: usize,
        checker_index: usize,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            document,
            format,
            config,
            report,
            bundle_index,
            checker_index,
            logger,
        }
    }

    /// Path of the document under validation
    pub fn file(&self) -> &Path {
        self.document.path()
    }

    pub fn document(&self) -> &DocumentHandle {
        self.document
    }

    pub fn format(&self) -> &FormatSettings {
        self.format
    }

    /// Configuration slice resolved for the active checker
    pub fn config(&self) -> &Value {
        self.config
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger
    }

    /// Read access to the report built so far
    pub fn report(&self) -> &ResultReport {
        self.report
    }

    fn active_checker(&self) -> &Checker {
        &self.report.bundles()[self.bundle_index].checkers()[self.checker_index]
    }

    fn active_checker_mut(&mut self) -> &mut Checker {
        self.report
            .bundle_mut(self.bundle_index)
            .and_then(|bundle| bundle.checker_mut(self.checker_index))
            .expect("active checker indices out of bounds")
    }

    /// Id of the checker this context is executing
    pub fn checker_id(&self) -> &str {
        &self.report.bundles()[self.bundle_index].checkers()[self.checker_index].checker_id
    }

    /// Attach a pre-built issue to the active checker
    pub fn add_issue(&mut self, issue: Issue) {
        self.logger.info(&format!(
            "  {}: {}",
            self.active_checker().checker_id,
            issue.description
        ));
        self.active_checker_mut().add_issue(issue);
    }

    /// Construct an issue on the active checker and return its fresh
    /// identifier
    pub fn gen_issue(
        &mut self,
        level: IssueLevel,
        description: impl Into<String>,
        locations: Vec<Location>,
    ) -> Uuid {
        let description = description.into();
        self.logger.info(&format!(
            "  {}: {}",
            self.active_checker().checker_id,
            description
        ));
        self.active_checker_mut()
            .gen_issue(level, description, locations)
    }
}
