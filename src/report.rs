//! Issue/report data model.
//!
//! The tree `ResultReport` → `CheckerBundle` → `Checker` → `Issue` is built
//! during one validation pass and is append-only; serializers take it by
//! shared reference once execution completes. Issue totals are always
//! computed by summation over the tree, never tracked separately.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a validation issue.
///
/// The discriminants are the numeric levels used by the XQAR serialization
/// (Error=1, Warning=2, Information=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueLevel {
    Error = 1,
    Warning = 2,
    Information = 3,
}

impl IssueLevel {
    /// Numeric encoding used in XQAR output
    pub fn numeric(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IssueLevel::Error => "Error",
            IssueLevel::Warning => "Warning",
            IssueLevel::Information => "Info",
        };
        f.write_str(s)
    }
}

impl FromStr for IssueLevel {
    type Err = std::convert::Infallible;

    /// Case-insensitive; anything that is not an error or warning reads as
    /// informational.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let level = match s.to_ascii_lowercase().as_str() {
            "error" => IssueLevel::Error,
            "warning" => IssueLevel::Warning,
            _ => IssueLevel::Information,
        };
        Ok(level)
    }
}

/// Where a finding occurred.
///
/// Several kinds may coexist on one issue, describing the same finding from
/// different angles. Each variant carries a fixed rank used only for
/// canonical ordering: file < xml < road.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// Row/column coordinate in the source file
    File {
        row: u64,
        column: u64,
        file_type: String,
    },
    /// XPath expression into the document tree
    Xml { xpath: String },
    /// Domain coordinate: road id plus s/t offsets along it
    Road {
        road_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        s: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        t: Option<String>,
    },
}

impl Location {
    pub fn file(row: u64, column: u64) -> Self {
        Location::File {
            row,
            column,
            file_type: "1".to_string(),
        }
    }

    pub fn xml(xpath: impl Into<String>) -> Self {
        Location::Xml {
            xpath: xpath.into(),
        }
    }

    pub fn road(road_id: impl Into<String>, s: Option<String>, t: Option<String>) -> Self {
        Location::Road {
            road_id: road_id.into(),
            s,
            t,
        }
    }

    /// Canonical ordering rank of this location kind
    pub fn rank(&self) -> u8 {
        match self {
            Location::File { .. } => 0,
            Location::Xml { .. } => 1,
            Location::Road { .. } => 2,
        }
    }
}

/// One reported finding.
///
/// The identifier is assigned when the issue is constructed and is immutable
/// afterwards; it is the sort and tie-break key of the canonical
/// serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    identifier: Uuid,
    pub level: IssueLevel,
    pub description: String,
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<serde_json::Value>,
}

impl Issue {
    /// Create an issue with a fresh unique identifier
    pub fn new(level: IssueLevel, description: impl Into<String>, locations: Vec<Location>) -> Self {
        Self::with_identifier(Uuid::new_v4(), level, description, locations)
    }

    /// Create an issue with a caller-controlled identifier
    pub fn with_identifier(
        identifier: Uuid,
        level: IssueLevel,
        description: impl Into<String>,
        locations: Vec<Location>,
    ) -> Self {
        Self {
            identifier,
            level,
            description: description.into(),
            locations,
            external: None,
        }
    }

    /// Attach an opaque external reference
    pub fn with_external(mut self, external: serde_json::Value) -> Self {
        self.external = Some(external);
        self
    }

    pub fn identifier(&self) -> Uuid {
        self.identifier
    }
}

/// One validation rule and the issues it reported.
///
/// A checker is owned by exactly one bundle; its issue sequence is
/// append-only and is only reordered transiently at serialization time.
#[derive(Debug, Clone, Serialize)]
pub struct Checker {
    pub checker_id: String,
    pub description: String,
    issues: Vec<Issue>,
}

impl Checker {
    pub fn new(checker_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            checker_id: checker_id.into(),
            description: description.into(),
            issues: Vec::new(),
        }
    }

    /// Append a pre-built issue
    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Construct an issue from field values, append it, and return its
    /// identifier
    pub fn gen_issue(
        &mut self,
        level: IssueLevel,
        description: impl Into<String>,
        locations: Vec<Location>,
    ) -> Uuid {
        let issue = Issue::new(level, description, locations);
        let id = issue.identifier();
        self.issues.push(issue);
        id
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Summary text, e.g. "Found 2 issues"
    pub fn summary(&self) -> String {
        format_issue_summary(self.issues.len())
    }
}

/// Named group of related checkers sharing version and metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CheckerBundle {
    pub name: String,
    pub description: String,
    pub version: String,
    checkers: Vec<Checker>,
    pub params: BTreeMap<String, String>,
}

impl CheckerBundle {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            checkers: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    /// Append a checker to this bundle
    pub fn add_checker(&mut self, checker: Checker) {
        self.checkers.push(checker);
    }

    /// Construct a checker, append it, and return a handle to it
    pub fn gen_checker(
        &mut self,
        checker_id: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Checker {
        self.checkers.push(Checker::new(checker_id, description));
        self.checkers.last_mut().unwrap()
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn checkers(&self) -> &[Checker] {
        &self.checkers
    }

    pub(crate) fn checker_mut(&mut self, index: usize) -> Option<&mut Checker> {
        self.checkers.get_mut(index)
    }

    /// Total issues over all checkers in this bundle
    pub fn issue_count(&self) -> usize {
        self.checkers.iter().map(Checker::issue_count).sum()
    }

    /// Summary text over all checkers, e.g. "Found 1 issue"
    pub fn summary(&self) -> String {
        format_issue_summary(self.issue_count())
    }

    /// Build date stamped on the bundle element in XQAR output
    pub fn build_date(&self) -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Root of the report model: one instance per validated document.
///
/// Discarded after serialization, never persisted across runs.
#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub checked_file: PathBuf,
    bundles: Vec<CheckerBundle>,
    pub meta: BTreeMap<String, String>,
}

impl ResultReport {
    pub fn new(checked_file: impl Into<PathBuf>) -> Self {
        Self {
            checked_file: checked_file.into(),
            bundles: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Append a checker bundle to this report
    pub fn add_checker_bundle(&mut self, bundle: CheckerBundle) {
        self.bundles.push(bundle);
    }

    /// Construct a bundle, append it, and return a handle to it
    pub fn gen_checker_bundle(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> &mut CheckerBundle {
        self.bundles.push(CheckerBundle::new(name, description, version));
        self.bundles.last_mut().unwrap()
    }

    pub fn bundles(&self) -> &[CheckerBundle] {
        &self.bundles
    }

    pub(crate) fn bundle_mut(&mut self, index: usize) -> Option<&mut CheckerBundle> {
        self.bundles.get_mut(index)
    }

    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }

    /// Total issues over all bundles and checkers
    pub fn issue_count(&self) -> usize {
        self.bundles.iter().map(CheckerBundle::issue_count).sum()
    }
}

fn format_issue_summary(count: usize) -> String {
    if count == 1 {
        format!("Found {} issue", count)
    } else {
        format!("Found {} issues", count)
    }
}
