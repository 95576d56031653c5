use invariant_gate_types::{InvariantId, Severity, Violation};

use super::{compile_rules, evidence, CompiledRule, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::patterns;

/// I6: Fail Closed.
///
/// Flags suppressed errors and silent handlers. Patterns run with `.`
/// matching newlines so multi-line `try`/`catch` bodies are caught.
#[derive(Debug)]
pub struct FailClosed {
    enabled: bool,
    severity: Severity,
    rules: Vec<CompiledRule>,
    max_context: usize,
}

impl FailClosed {
    pub const RULE_ID: &'static str = "I6_fail_closed";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.fail_closed;
        Self {
            enabled: section.enabled,
            severity: section.severity,
            rules: compile_rules(
                InvariantId::I6,
                &section.patterns,
                "Detected attempt to bypass failure",
                true,
            ),
            max_context: config.logging.max_context_length,
        }
    }
}

impl InvariantCheck for FailClosed {
    fn invariant(&self) -> InvariantId {
        InvariantId::I6
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        if !self.enabled {
            return Vec::new();
        }
        let text = doc.text;
        let mut violations = Vec::new();
        for rule in &self.rules {
            for m in rule.regex.find_iter(text) {
                violations.push(
                    Violation::new(
                        patterns::violation_id(),
                        InvariantId::I6,
                        self.severity,
                        patterns::locate(text, doc.path, m.start(), m.end(), self.max_context),
                        format!("I6 Violation: {}", rule.message),
                    )
                    .with_suggested_fix("Surface the error to user instead of suppressing")
                    .with_evidence(evidence([
                        ("matched_pattern", rule.source.clone()),
                        ("matched_text", patterns::truncate_chars(m.as_str(), 200).to_string()),
                    ]))
                    .with_rule_id(Self::RULE_ID),
                );
            }
        }
        violations
    }
}
