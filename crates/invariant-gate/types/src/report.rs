use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::Violation;

/// Version-control metadata embedded verbatim in a report
/// (`commit_sha`, `branch`, `repository` when available).
pub type GitContext = BTreeMap<String, String>;

/// Pass/fail outcome of the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateResult {
    Pass,
    Fail,
}

impl GateResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateResult::Pass)
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            GateResult::Pass => 0,
            GateResult::Fail => 1,
        }
    }
}

impl fmt::Display for GateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateResult::Pass => f.write_str("PASS"),
            GateResult::Fail => f.write_str("FAIL"),
        }
    }
}

/// Provenance of the policy that produced a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUsed {
    pub config_path: String,
    /// Sorted ids of enabled invariants.
    pub enabled_invariants: Vec<String>,
    pub fail_on_warning: bool,
    pub warning_threshold: usize,
}

/// Aggregate counts and the gate decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_files_scanned: usize,
    pub files_with_violations: usize,
    pub total_violations: usize,
    pub errors: usize,
    pub warnings: usize,
    pub by_invariant: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub gate_result: GateResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

/// Per-run aggregate over every validated file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub timestamp: DateTime<Utc>,
    pub validator_version: String,
    #[serde(default)]
    pub git_context: GitContext,
    pub config_used: ConfigUsed,
    pub violations: Vec<Violation>,
    pub summary: Summary,
}

impl Report {
    pub fn gate_result(&self) -> GateResult {
        self.summary.gate_result
    }

    pub fn passed(&self) -> bool {
        self.summary.gate_result.is_pass()
    }
}
