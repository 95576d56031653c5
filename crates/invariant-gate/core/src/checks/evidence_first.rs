use invariant_gate_types::{InvariantId, Severity, Violation};
use regex::Regex;

use super::{compile_rules, evidence, found_nearby, CompiledRule, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::patterns;

/// I1: Evidence-First Outputs.
///
/// Absolute or certainty claims are flagged unless an epistemic tag such as
/// `[OBSERVED]` appears within [`EvidenceFirst::TAG_WINDOW`] characters.
/// Every match stands alone: overlapping windows do not merge violations.
#[derive(Debug)]
pub struct EvidenceFirst {
    enabled: bool,
    severity: Severity,
    rules: Vec<CompiledRule>,
    tags: Vec<String>,
    tag_regex: Option<Regex>,
    max_context: usize,
}

impl EvidenceFirst {
    pub const TAG_WINDOW: usize = 300;
    pub const RULE_ID: &'static str = "I1_evidence_first";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.evidence_first;
        Self {
            enabled: section.enabled,
            severity: section.severity,
            rules: compile_rules(InvariantId::I1, &section.patterns, "I1 violation detected", false),
            tags: section.required_tags.clone(),
            tag_regex: patterns::epistemic_tag_regex(&section.required_tags),
            max_context: config.logging.max_context_length,
        }
    }

    fn suggested_fix(&self) -> String {
        let tags: Vec<String> = self.tags.iter().map(|t| format!("[{t}]")).collect();
        match tags.as_slice() {
            [] => "Add an epistemic tag".to_string(),
            [only] => format!("Add epistemic tag: {only}"),
            [init @ .., last] => format!("Add epistemic tag: {}, or {last}", init.join(", ")),
        }
    }
}

impl InvariantCheck for EvidenceFirst {
    fn invariant(&self) -> InvariantId {
        InvariantId::I1
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
                if found_nearby(self.tag_regex.as_ref(), text, m.start(), m.end(), Self::TAG_WINDOW) {
                    continue;
                }
                violations.push(
                    Violation::new(
                        patterns::violation_id(),
                        InvariantId::I1,
                        self.severity,
                        patterns::locate(text, doc.path, m.start(), m.end(), self.max_context),
                        format!("I1 Violation: {}", rule.message),
                    )
                    .with_suggested_fix(self.suggested_fix())
                    .with_evidence(evidence([
                        ("matched_pattern", rule.source.clone()),
                        ("matched_text", patterns::truncate_chars(m.as_str(), 100).to_string()),
                    ]))
                    .with_rule_id(Self::RULE_ID),
                );
            }
        }
        violations
    }
}
