//! Validation orchestrator
//!
//! Runs the checker suite over one file or over every discovered file.
//! Input failures (missing target, unreadable file, walk error) never
//! escape: they become `SYSTEM`/`ERROR` violations so the gate fails closed.

use invariant_gate_types::{InvariantId, Location, Severity, ValidationResult, Violation};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

use crate::checks::{standard_suite, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::discovery::{discover, TargetFilter};
use crate::error::{GateError, Result};
use crate::patterns;

/// Applies a fixed checker suite under one configuration.
pub struct Validator {
    config: Arc<GateConfig>,
    checks: Vec<Box<dyn InvariantCheck>>,
    workers: usize,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field(
                "checks",
                &self.checks.iter().map(|c| c.invariant()).collect::<Vec<_>>(),
            )
            .field("workers", &self.workers)
            .finish()
    }
}

impl Validator {
    /// Validator running the standard I1→I6 suite.
    pub fn new(config: Arc<GateConfig>) -> Self {
        let checks = standard_suite(&config);
        Self::with_checks(config, checks)
    }

    /// Validator running a caller-supplied suite, in the given order.
    pub fn with_checks(config: Arc<GateConfig>, checks: Vec<Box<dyn InvariantCheck>>) -> Self {
        Self {
            config,
            checks,
            workers: 1,
        }
    }

    /// Validate directory scans on `workers` threads. Results are still
    /// returned in discovery order.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run every checker over in-memory text.
    pub fn check_text(&self, text: &str, path: &str, workspace: &Path) -> Vec<Violation> {
        let doc = Document::new(text, path, workspace);
        self.checks
            .iter()
            .filter(|check| check.is_enabled())
            .flat_map(|check| check.check(&doc))
            .collect()
    }

    /// Validate one file. Never fails; input problems become `SYSTEM`
    /// violations.
    pub fn validate_file(&self, path: &Path, workspace: &Path) -> ValidationResult {
        let shown = path.display().to_string();
        match read_document(path) {
            Ok(text) => {
                let violations = self.check_text(&text, &shown, workspace);
                debug!(file = %shown, violations = violations.len(), "validated file");
                ValidationResult::new(shown, violations)
            }
            Err(err) => {
                warn!(file = %shown, error = %err, "cannot validate file");
                let message = match &err {
                    GateError::FileNotFound(_) => format!("File not found: {shown}"),
                    GateError::Unreadable { source, .. } => format!("Error reading file: {source}"),
                    other => format!("Error reading file: {other}"),
                };
                ValidationResult::new(shown.clone(), vec![system_violation(&shown, message)])
            }
        }
    }

    /// Validate `root` with the configured target policy.
    pub fn validate_path(&self, root: &Path) -> Vec<ValidationResult> {
        let filter = TargetFilter::from_policy(&self.config.validation_targets);
        self.validate_with_filter(root, &filter)
    }

    /// Validate `root` with explicit include/exclude globs.
    pub fn validate_directory(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Vec<ValidationResult> {
        self.validate_with_filter(root, &TargetFilter::new(include, exclude))
    }

    fn validate_with_filter(&self, root: &Path, filter: &TargetFilter) -> Vec<ValidationResult> {
        let discovery = match discover(root, filter) {
            Ok(discovery) => discovery,
            Err(err) => {
                let shown = root.display().to_string();
                warn!(root = %shown, error = %err, "cannot scan target");
                let message = match err {
                    GateError::TargetNotFound(_) => format!("Directory not found: {shown}"),
                    other => other.to_string(),
                };
                return vec![ValidationResult::new(
                    shown.clone(),
                    vec![system_violation(&shown, message)],
                )];
            }
        };

        let mut results = self.validate_files(&discovery.files, &discovery.workspace);
        results.extend(discovery.walk_errors.into_iter().map(|failure| {
            let shown = failure.path.display().to_string();
            let message = format!("Error reading directory entry: {}", failure.message);
            ValidationResult::new(shown.clone(), vec![system_violation(&shown, message)])
        }));
        results
    }

    fn validate_files(&self, files: &[PathBuf], workspace: &Path) -> Vec<ValidationResult> {
        if self.workers <= 1 || files.len() <= 1 {
            return files
                .iter()
                .map(|file| self.validate_file(file, workspace))
                .collect();
        }

        let chunk_size = files.len().div_ceil(self.workers);
        thread::scope(|scope| {
            let handles: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|file| self.validate_file(file, workspace))
                            .collect::<Vec<_>>()
                    });
                    (chunk, handle)
                })
                .collect();

            // Joined in spawn order, so results keep discovery order.
            handles
                .into_iter()
                .flat_map(|(chunk, handle)| match handle.join() {
                    Ok(results) => results,
                    Err(_) => chunk
                        .iter()
                        .map(|file| {
                            let shown = file.display().to_string();
                            warn!(file = %shown, "validation worker panicked");
                            ValidationResult::new(
                                shown.clone(),
                                vec![system_violation(&shown, "Validation worker panicked")],
                            )
                        })
                        .collect(),
                })
                .collect()
        })
    }
}

/// Read a target file as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(GateError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| GateError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// `SYSTEM`/`ERROR` violation describing an input failure.
pub fn system_violation(file: &str, message: impl Into<String>) -> Violation {
    Violation::new(
        patterns::violation_id(),
        InvariantId::System,
        Severity::Error,
        Location::file(file),
        message,
    )
}
