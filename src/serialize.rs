//! Report serializers.
//!
//! Three renderings of a finished `ResultReport`:
//!
//! - canonical XQAR XML: bundles, checkers, issues, and locations are
//!   emitted in sorted order so the same issue set always produces
//!   byte-identical output, regardless of execution order;
//! - a generic JSON dump that preserves insertion order (no canonical
//!   sort, intentionally);
//! - an indented plain-text listing.
//!
//! All serializers take the report by shared reference; sorting happens
//! over borrowed slices, never in the model itself.

use std::path::Path;

use crate::error::{Result, ValidationError};
use crate::report::{Checker, CheckerBundle, Issue, Location, ResultReport};

/// Schema version stamped on the XQAR root element
const XQAR_VERSION: &str = "1.0.0";

fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    result
}

/// Render the report as canonical XQAR XML.
///
/// Bundles are sorted by name, checkers by id, issues by identifier, and
/// locations by rank, which makes the output reproducible for a given
/// issue set.
pub fn to_xqar_string(report: &ResultReport) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<CheckerResults version=\"{}\">\n", XQAR_VERSION));

    let mut bundles: Vec<&CheckerBundle> = report.bundles().iter().collect();
    bundles.sort_by(|a, b| a.name.cmp(&b.name));

    for bundle in bundles {
        write_bundle(&mut out, bundle);
    }

    out.push_str("</CheckerResults>\n");
    out
}

fn write_bundle(out: &mut String, bundle: &CheckerBundle) {
    let open = format!(
        "  <CheckerBundle name=\"{}\" description=\"{}\" version=\"{}\" build_date=\"{}\" summary=\"{}\"",
        escape_xml(&bundle.name),
        escape_xml(&bundle.description),
        escape_xml(&bundle.version),
        bundle.build_date(),
        escape_xml(&bundle.summary()),
    );

    if bundle.params.is_empty() && bundle.checkers().is_empty() {
        out.push_str(&open);
        out.push_str("/>\n");
        return;
    }
    out.push_str(&open);
    out.push_str(">\n");

    // BTreeMap iteration keeps params in key order
    for (name, value) in &bundle.params {
        out.push_str(&format!(
            "    <Param name=\"{}\" value=\"{}\"/>\n",
            escape_xml(name),
            escape_xml(value)
        ));
    }

    let mut checkers: Vec<&Checker> = bundle.checkers().iter().collect();
    checkers.sort_by(|a, b| a.checker_id.cmp(&b.checker_id));
    for checker in checkers {
        write_checker(out, checker);
    }

    out.push_str("  </CheckerBundle>\n");
}

fn write_checker(out: &mut String, checker: &Checker) {
    let open = format!(
        "    <Checker checkerId=\"{}\" description=\"{}\" summary=\"{}\"",
        escape_xml(&checker.checker_id),
        escape_xml(&checker.description),
        escape_xml(&checker.summary()),
    );

    if checker.issues().is_empty() {
        out.push_str(&open);
        out.push_str("/>\n");
        return;
    }
    out.push_str(&open);
    out.push_str(">\n");

    let mut issues: Vec<&Issue> = checker.issues().iter().collect();
    issues.sort_by_key(|issue| issue.identifier());
    for issue in issues {
        write_issue(out, issue);
    }

    out.push_str("    </Checker>\n");
}

fn write_issue(out: &mut String, issue: &Issue) {
    out.push_str(&format!(
        "      <Issue description=\"{}\" issueId=\"{}\" level=\"{}\">\n",
        escape_xml(&issue.description),
        issue.identifier(),
        issue.level.numeric(),
    ));

    out.push_str(&format!(
        "        <Locations description=\"{}\"",
        escape_xml(&issue.description)
    ));
    if issue.locations.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push_str(">\n");

        let mut locations: Vec<&Location> = issue.locations.iter().collect();
        locations.sort_by_key(|location| location.rank());
        for location in locations {
            write_location(out, location);
        }

        out.push_str("        </Locations>\n");
    }

    out.push_str("      </Issue>\n");
}

fn write_location(out: &mut String, location: &Location) {
    match location {
        Location::File {
            row,
            column,
            file_type,
        } => {
            out.push_str(&format!(
                "          <FileLocation row=\"{}\" column=\"{}\" fileType=\"{}\"/>\n",
                row,
                column,
                escape_xml(file_type)
            ));
        }
        Location::Xml { xpath } => {
            out.push_str(&format!(
                "          <XMLLocation xpath=\"{}\"/>\n",
                escape_xml(xpath)
            ));
        }
        Location::Road { road_id, s, t } => {
            out.push_str(&format!(
                "          <RoadLocation roadId=\"{}\"",
                escape_xml(road_id)
            ));
            if let Some(s) = s {
                out.push_str(&format!(" s=\"{}\"", escape_xml(s)));
            }
            if let Some(t) = t {
                out.push_str(&format!(" t=\"{}\"", escape_xml(t)));
            }
            out.push_str("/>\n");
        }
    }
}

/// Render the report as a generic JSON dump.
///
/// The tree serializes in insertion order, as it was appended during
/// execution; the canonical sort of the XQAR form is deliberately not
/// applied here.
pub fn to_json_string(report: &ResultReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| ValidationError::Serialization(e.to_string()))
}

/// Render the report as an indented plain-text listing.
pub fn to_text_lines(report: &ResultReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("CheckerResults:".to_string());

    for bundle in report.bundles() {
        lines.push(format!("bundle {}", bundle.name));

        for checker in bundle.checkers() {
            lines.push(format!(
                "  check = {} - {}",
                checker.checker_id, checker.description
            ));

            if checker.issues().is_empty() {
                lines.push("    ok".to_string());
            } else {
                for issue in checker.issues() {
                    lines.push(format!("    {}: {}", issue.level, issue.description));
                }
            }
        }
    }

    lines
}

/// Render the report as plain text with a trailing newline
pub fn to_text_string(report: &ResultReport) -> String {
    let mut text = to_text_lines(report).join("\n");
    text.push('\n');
    text
}

/// Write the canonical XQAR serialization to a file
pub fn write_xqar(report: &ResultReport, path: &Path) -> Result<()> {
    write_report_file(path, &to_xqar_string(report))
}

/// Write the JSON dump to a file
pub fn write_json(report: &ResultReport, path: &Path) -> Result<()> {
    write_report_file(path, &to_json_string(report)?)
}

/// Write the plain-text listing to a file
pub fn write_text(report: &ResultReport, path: &Path) -> Result<()> {
    write_report_file(path, &to_text_string(report))
}

fn write_report_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| ValidationError::ReportOutput {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}
