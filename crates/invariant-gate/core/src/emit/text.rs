use chrono::SecondsFormat;
use invariant_gate_types::Report;
use std::fmt::{self, Write};

/// Violations listed before the remainder is summarized.
pub const MAX_LISTED_VIOLATIONS: usize = 20;

const RULE_WIDTH: usize = 60;

/// Console summary: gate outcome, counts, per-invariant breakdown and the
/// first [`MAX_LISTED_VIOLATIONS`] violations.
pub fn to_text(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut impl Write, report: &Report) -> fmt::Result {
    let summary = &report.summary;
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    writeln!(out, "\n{heavy}")?;
    writeln!(out, "PROACTIVE Constitutional Validator Report")?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "\nReport ID: {}", report.report_id)?;
    writeln!(
        out,
        "Timestamp: {}",
        report.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    )?;
    writeln!(out, "\nGate Result: {}", summary.gate_result)?;
    if let Some(reason) = &summary.gate_reason {
        writeln!(out, "Gate Reason: {reason}")?;
    }
    writeln!(out, "\nFiles Scanned: {}", summary.total_files_scanned)?;
    writeln!(out, "Files with Violations: {}", summary.files_with_violations)?;
    writeln!(out, "Total Violations: {}", summary.total_violations)?;
    writeln!(out, "  Errors: {}", summary.errors)?;
    writeln!(out, "  Warnings: {}", summary.warnings)?;
    if let Some(ms) = summary.execution_time_ms {
        writeln!(out, "Execution Time: {ms} ms")?;
    }

    if !summary.by_invariant.is_empty() {
        writeln!(out, "\nBy Invariant:")?;
        for (invariant, count) in &summary.by_invariant {
            writeln!(out, "  {invariant}: {count}")?;
        }
    }

    if !report.violations.is_empty() {
        writeln!(out, "\n{light}\nViolations:\n{light}")?;
        for v in report.violations.iter().take(MAX_LISTED_VIOLATIONS) {
            writeln!(out, "\n[{}] {}: {}", v.severity(), v.invariant(), v.message())?;
            let location = v.location();
            match location.line {
                Some(line) => writeln!(out, "  File: {}:{line}", location.file)?,
                None => writeln!(out, "  File: {}", location.file)?,
            }
            if let Some(fix) = v.suggested_fix() {
                writeln!(out, "  Fix: {fix}")?;
            }
        }
        if report.violations.len() > MAX_LISTED_VIOLATIONS {
            writeln!(
                out,
                "\n... and {} more violations",
                report.violations.len() - MAX_LISTED_VIOLATIONS
            )?;
        }
    }

    writeln!(out, "\n{heavy}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::report::build_report;
    use invariant_gate_types::{InvariantId, Location, Severity, ValidationResult, Violation};

    fn report_with(n: usize) -> Report {
        let violations = (0..n)
            .map(|i| {
                Violation::new(
                    format!("V-{i:04X}"),
                    InvariantId::I1,
                    Severity::Error,
                    Location::at_line("a.md", i + 1),
                    format!("finding {i}"),
                )
                .with_suggested_fix("tag it")
            })
            .collect();
        build_report(
            &[ValidationResult::new("a.md", violations)],
            &GateConfig::default(),
            None,
            None,
        )
    }

    #[test]
    fn lists_at_most_twenty() {
        let text = to_text(&report_with(23));
        assert!(text.contains("Gate Result: FAIL"));
        assert!(text.contains("Gate Reason: 23 ERROR-level violations found"));
        assert!(text.contains("  I1: 23"));
        assert!(text.contains("finding 19"));
        assert!(!text.contains("finding 20"));
        assert!(text.contains("... and 3 more violations"));
        assert!(text.contains("  File: a.md:1\n  Fix: tag it"));
    }

    #[test]
    fn clean_run() {
        let text = to_text(&report_with(0));
        assert!(text.contains("Gate Result: PASS"));
        assert!(!text.contains("Gate Reason"));
        assert!(!text.contains("Violations:\n"));
    }
}
