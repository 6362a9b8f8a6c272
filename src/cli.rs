use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::logger::VerbosityLevel;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
    /// Canonical XQAR XML report
    Xqar,
    /// Generic JSON dump
    Json,
    /// Indented plain-text listing
    Txt,
}

impl OutputType {
    /// File extension appended to the report file name
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Xqar => "xqar",
            OutputType::Json => "json",
            OutputType::Txt => "txt",
        }
    }
}

/// Behavior after an invalid document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExitType {
    /// Keep validating the remaining documents
    NoExit,
    /// Terminate with a non-zero code at the first invalid document
    ExitIfError,
}

/// Validate structured documents with pluggable checker bundles
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-doc")]
#[command(about = "Validate structured documents against checker bundles and write result reports")]
#[command(version)]
pub struct Cli {
    /// File(s) or folder to validate
    #[arg(required = true, help = "File(s) or folder to validate")]
    pub input_files: Vec<PathBuf>,

    /// Path to the validation report folder
    #[arg(
        short = 'o',
        long = "output-directory",
        default_value = "reports",
        help = "Path to the validation report folder"
    )]
    pub output_directory: PathBuf,

    /// Output format of the result report
    #[arg(
        short = 't',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Xqar,
        help = "Output format of the result report"
    )]
    pub output_type: OutputType,

    /// Whether to terminate after an invalid document
    #[arg(
        short = 'e',
        long = "exit-type",
        value_enum,
        default_value_t = ExitType::NoExit,
        help = "Whether to terminate after an invalid document"
    )]
    pub exit_type: ExitType,

    /// Additional directories with validation check bundles
    #[arg(
        short = 'a',
        long = "additional-check-dirs",
        action = clap::ArgAction::Append,
        help = "Additional directories with validation check bundles"
    )]
    pub additional_check_dirs: Vec<PathBuf>,

    /// Path to a checker configuration file; defaults to the config.json
    /// of the format folder
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Format to check against (e.g. xodr); defaults to each file's
    /// extension
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Root directory holding one subdirectory per format
    #[arg(long = "format-root")]
    pub format_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Format root: explicit flag, or the user data directory
    pub fn get_format_root(&self) -> PathBuf {
        self.format_root.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("validate-doc")
                .join("formats")
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        for input in &self.input_files {
            if !input.exists() {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
        }
        Ok(())
    }
}
