//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use invariant_gate_core::types::Report;
use invariant_gate_core::OutputFormat;
use std::path::Path;

use crate::error::CliResult;

/// Report format for `validate`
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ReportFormat {
    /// Full report as JSON
    Json,
    /// SARIF 2.1.0 for code-scanning dashboards
    Sarif,
    /// Human-readable summary
    #[default]
    Text,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Sarif => OutputFormat::Sarif,
            ReportFormat::Text => OutputFormat::Text,
        }
    }
}

/// Format for listings (`invariants`, `trace-check`)
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ListFormat {
    /// JSON format
    Json,
    /// Human-readable text
    #[default]
    Text,
}

/// Write a rendered artifact to `path`, or to stdout when no path is given.
pub fn emit(rendered: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered)?;
            eprintln!("{} report written to {}", "✓".green(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// One-line gate outcome on stderr.
pub fn print_gate_status(report: &Report) {
    let summary = &report.summary;
    let counts = format!(
        "{} files, {} errors, {} warnings",
        summary.total_files_scanned, summary.errors, summary.warnings
    );
    if report.passed() {
        eprintln!("{} {}", "Gate PASS".green().bold(), counts.dimmed());
    } else {
        let reason = summary.gate_reason.as_deref().unwrap_or("gate failed");
        eprintln!("{} {} ({})", "Gate FAIL".red().bold(), reason, counts.dimmed());
    }
}
