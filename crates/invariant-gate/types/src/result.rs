use serde::{Deserialize, Serialize};

use crate::{Severity, Violation};

/// Outcome of validating one file; violations are kept in detection order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub file_path: String,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn new(file_path: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            file_path: file_path.into(),
            violations,
        }
    }

    pub fn clean(file_path: impl Into<String>) -> Self {
        Self::new(file_path, Vec::new())
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(Violation::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity() == severity)
            .count()
    }
}
