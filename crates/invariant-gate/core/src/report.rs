//! Report builder and gate decision.

use chrono::Utc;
use invariant_gate_types::{
    ConfigUsed, GateResult, GitContext, Report, Severity, Summary, ValidationResult,
};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::{GateConfig, GatePolicy, DEFAULT_CONFIG_PATH};
use crate::patterns;

/// Decide the gate from severity counts. The first matching rule wins:
/// errors, then any warning under `fail_on_warning`, then the warning
/// threshold.
pub fn evaluate_gate(
    errors: usize,
    warnings: usize,
    policy: &GatePolicy,
) -> (GateResult, Option<String>) {
    if policy.fail_on_error && errors > 0 {
        (
            GateResult::Fail,
            Some(format!("{errors} ERROR-level violations found")),
        )
    } else if policy.fail_on_warning && warnings > 0 {
        (
            GateResult::Fail,
            Some(format!("{warnings} WARNING-level violations found")),
        )
    } else if warnings > policy.warning_threshold {
        (
            GateResult::Fail,
            Some(format!(
                "Warning count ({warnings}) exceeds threshold ({})",
                policy.warning_threshold
            )),
        )
    } else {
        (GateResult::Pass, None)
    }
}

/// Aggregate per-file results into a report.
///
/// Violations are flattened in result order, so identical inputs give
/// identical summaries.
pub fn build_report(
    results: &[ValidationResult],
    config: &GateConfig,
    git_context: Option<GitContext>,
    config_path: Option<&str>,
) -> Report {
    let violations: Vec<_> = results
        .iter()
        .flat_map(|r| r.violations.iter().cloned())
        .collect();
    let files_with_violations = results.iter().filter(|r| !r.violations.is_empty()).count();

    let mut by_invariant: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_severity: BTreeMap<String, usize> = [Severity::Error, Severity::Warning, Severity::Info]
        .into_iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for v in &violations {
        *by_invariant.entry(v.invariant().to_string()).or_default() += 1;
        *by_severity.entry(v.severity().to_string()).or_default() += 1;
    }

    let errors = by_severity[Severity::Error.as_str()];
    let warnings = by_severity[Severity::Warning.as_str()];
    let (gate_result, gate_reason) = evaluate_gate(errors, warnings, &config.gate);

    let mut enabled_invariants: Vec<String> = config
        .invariants
        .enabled()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    enabled_invariants.sort();

    info!(
        files = results.len(),
        violations = violations.len(),
        errors,
        warnings,
        gate = %gate_result,
        "report built"
    );

    Report {
        report_id: patterns::report_id(),
        timestamp: Utc::now(),
        validator_version: config.validator.version.clone(),
        git_context: git_context.unwrap_or_default(),
        config_used: ConfigUsed {
            config_path: config_path.unwrap_or(DEFAULT_CONFIG_PATH).to_string(),
            enabled_invariants,
            fail_on_warning: config.gate.fail_on_warning,
            warning_threshold: config.gate.warning_threshold,
        },
        summary: Summary {
            total_files_scanned: results.len(),
            files_with_violations,
            total_violations: violations.len(),
            errors,
            warnings,
            by_invariant,
            by_severity,
            gate_result,
            gate_reason,
            execution_time_ms: None,
        },
        violations,
    }
}
