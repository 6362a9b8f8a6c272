//! Console output formatting for validation runs.

use std::path::Path;

use crate::logger::VerbosityLevel;
use crate::validator::ValidationOutcome;

/// Output formatter for human-readable run results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// One status line per validated document
    pub fn format_outcome_line(&self, file: &Path, outcome: &ValidationOutcome) -> String {
        if outcome.valid {
            format!(
                "{}  {} - {}",
                self.colorize("✓ VALID", "32"),
                file.display(),
                issue_count_text(outcome.report.issue_count()),
            )
        } else {
            format!(
                "{}  {}",
                self.colorize("✗ INVALID", "31"),
                file.display()
            )
        }
    }

    /// Closing summary over all documents of one invocation
    pub fn format_summary(
        &self,
        total_files: usize,
        valid_files: usize,
        invalid_files: usize,
        total_issues: usize,
    ) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            valid_files
        ));
        if invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                invalid_files
            ));
        }
        output.push_str(&format!("  Issues: {}\n", total_issues));
        output
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == VerbosityLevel::Quiet
    }
}

fn issue_count_text(count: usize) -> String {
    if count == 1 {
        "1 issue".to_string()
    } else {
        format!("{} issues", count)
    }
}
