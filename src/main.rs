use std::process;

use anyhow::Context;

use validate_doc::cli::{Cli, ExitType, OutputType};
use validate_doc::file_discovery::FileDiscovery;
use validate_doc::logger::{Logger, StderrLogger};
use validate_doc::output::Output;
use validate_doc::plugin::CheckerRegistry;
use validate_doc::serialize;
use validate_doc::validator::ValidationEngine;

fn main() {
    let cli = Cli::parse_args();
    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(2);
    }
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let logger = StderrLogger::new(cli.verbosity());
    let output = Output::new(cli.verbosity());

    let output_directory = &cli.output_directory;
    if !output_directory.exists() {
        std::fs::create_dir_all(output_directory).with_context(|| {
            format!(
                "could not create output folder {}",
                output_directory.display()
            )
        })?;
    } else if !output_directory.is_dir() {
        anyhow::bail!(
            "Output folder exists and is not a directory: {}",
            output_directory.display()
        );
    }

    let files = FileDiscovery::new()
        .discover_all(&cli.input_files)
        .context("could not enumerate input files")?;

    // The stock binary ships no check implementations; embedders register
    // their own against the library's `CheckerRegistry`.
    let registry = CheckerRegistry::new();
    let mut engine = ValidationEngine::new(registry, cli.get_format_root())
        .with_additional_roots(cli.additional_check_dirs.clone());

    let mut issue_counter: Vec<String> = Vec::new();
    let mut valid_files = 0usize;
    let mut invalid_files = 0usize;
    let mut total_issues = 0usize;

    for file in &files {
        let outcome =
            engine.validate_file(file, cli.config.as_deref(), cli.format.as_deref(), &logger);

        if !output.is_quiet() {
            println!("{}", output.format_outcome_line(file, &outcome));
        }

        if outcome.valid {
            valid_files += 1;
            total_issues += outcome.report.issue_count();

            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            let output_file =
                output_directory.join(format!("{}.{}", file_name, cli.output_type.extension()));

            match cli.output_type {
                OutputType::Xqar => serialize::write_xqar(&outcome.report, &output_file)?,
                OutputType::Json => serialize::write_json(&outcome.report, &output_file)?,
                OutputType::Txt => serialize::write_text(&outcome.report, &output_file)?,
            }
            logger.info(&format!("write to {}", output_file.display()));

            issue_counter.push(format!(
                "{} issues in {}",
                outcome.report.issue_count(),
                file_name
            ));
        } else {
            // Invalid documents produce no report file
            invalid_files += 1;
            if cli.exit_type == ExitType::ExitIfError {
                process::exit(1);
            }
        }
    }

    for line in &issue_counter {
        println!("{}", line);
    }
    if !output.is_quiet() {
        print!(
            "{}",
            output.format_summary(files.len(), valid_files, invalid_files, total_issues)
        );
    }

    Ok(())
}
