//! Invariant Gate CLI - scan artifacts against the constitutional invariants
//!
//! This CLI lets CI pipelines and operators:
//! - Validate a directory or file and gate on the result
//! - Emit the report as JSON, SARIF 2.1.0 or a text summary
//! - List the invariant catalogue
//! - Check trace logs against their schema

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use invariant_gate_core::trace_log::{self, Rejected};
use invariant_gate_core::types::InvariantId;
use invariant_gate_core::{
    build_report, emit, ConfigStore, GitMetadata, Validator, DEFAULT_CONFIG_PATH,
};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod output;

pub use error::{CliError, CliResult};
use output::{ListFormat, ReportFormat};

/// Invariant Gate CLI application
#[derive(Parser)]
#[command(name = "invariant-gate")]
#[command(about = "Invariant Gate - validates model outputs against the I1-I6 invariants", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate a directory or file and decide the gate
    Validate(ValidateArgs),

    /// List the invariants and their descriptions
    Invariants {
        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },

    /// Check a trace log against the trace-entry schema
    TraceCheck {
        /// Trace log (a JSON object or an array of objects)
        file: PathBuf,

        /// Accept flawed entries with a warning instead of rejecting them
        #[arg(long)]
        no_strict: bool,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },
}

#[derive(Args)]
struct ValidateArgs {
    /// Directory or file to validate
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, env = "INVARIANT_GATE_FORMAT", default_value = "text")]
    format: ReportFormat,

    /// Policy file (embedded defaults are used when missing or malformed)
    #[arg(short, long, env = "INVARIANT_GATE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads for directory scans
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Skip the git metadata probe
    #[arg(long)]
    no_git: bool,
}

/// Run using the current process arguments. Returns the process exit code.
pub fn run() -> CliResult<i32> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Diagnostics go to stderr so stdout stays machine-readable.
    let filter = if cli.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match cli.command {
        Commands::Validate(args) => validate(args),
        Commands::Invariants { format } => show_invariants(format),
        Commands::TraceCheck {
            file,
            no_strict,
            format,
        } => trace_check(&file, !no_strict, format),
    }
}

fn validate(args: ValidateArgs) -> CliResult<i32> {
    if args.workers == 0 {
        return Err(CliError::InvalidArgument(
            "--workers must be at least 1".to_string(),
        ));
    }
    let started = Instant::now();

    let store = ConfigStore::new();
    let config = store.load(&args.config);
    let validator = Validator::new(config).with_workers(args.workers);
    let results = validator.validate_path(&args.path);

    let git_context = if args.no_git {
        None
    } else {
        Some(GitMetadata::probe(&git_dir(&args.path)).into_context())
    };
    let config_path = args.config.display().to_string();
    let mut report = build_report(&results, validator.config(), git_context, Some(&config_path));
    report.summary.execution_time_ms =
        Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

    info!(
        report_id = %report.report_id,
        elapsed_ms = ?report.summary.execution_time_ms,
        "validation finished"
    );

    let rendered = emit::render(&report, args.format.into())?;
    output::emit(&rendered, args.output.as_deref())?;
    output::print_gate_status(&report);

    Ok(report.gate_result().exit_code())
}

/// Directory the git probe runs in: the target itself, or its parent for a file.
fn git_dir(target: &Path) -> PathBuf {
    if target.is_dir() {
        return target.to_path_buf();
    }
    match target.parent() {
        Some(parent) if parent.is_dir() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn show_invariants(format: ListFormat) -> CliResult<i32> {
    let descriptors: Vec<_> = InvariantId::all().map(|id| id.descriptor()).collect();

    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        ListFormat::Text => {
            println!("{}", "Constitutional Invariants".bold().cyan());
            println!("{}", "=".repeat(70));
            println!();
            for d in &descriptors {
                println!("  {} {}", format!("{:<7}", d.id.as_str()).bold().yellow(), d.name.bold());
                println!("          {}", d.description.dimmed());
            }
        }
    }

    Ok(0)
}

#[derive(Serialize)]
struct TraceCheckSummary {
    strict: bool,
    total: usize,
    accepted: usize,
    complete_traces: usize,
    rejected: Vec<Rejected>,
}

fn trace_check(file: &Path, strict: bool, format: ListFormat) -> CliResult<i32> {
    let entries = trace_log::load(file)?;
    let total = entries.len();
    let (accepted, rejected) = trace_log::partition(entries, strict);
    let summary = TraceCheckSummary {
        strict,
        total,
        accepted: accepted.len(),
        complete_traces: accepted.iter().filter(|e| trace_log::trace_complete(e)).count(),
        rejected,
    };

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ListFormat::Text => {
            println!("{}", "Trace Log Check".bold().cyan());
            println!("{}", "=".repeat(70));
            println!("File: {}", file.display());
            println!("Mode: {}", if strict { "strict" } else { "lenient" });
            println!("Entries: {}", summary.total);
            println!("Accepted: {}", summary.accepted.to_string().green());
            println!("Complete trace chains: {}", summary.complete_traces);
            if !summary.rejected.is_empty() {
                println!("Rejected: {}", summary.rejected.len().to_string().red());
                for r in &summary.rejected {
                    println!("  {} entry {}:", "✗".red(), r.index);
                    for err in &r.errors {
                        println!("      {err}");
                    }
                }
            }
        }
    }

    Ok(if summary.rejected.is_empty() { 0 } else { 1 })
}
