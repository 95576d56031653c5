use invariant_gate_types::{InvariantId, Severity, Violation};

use super::{compile_rules, evidence, CompiledRule, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::patterns;

/// I5: Safety Over Fluency.
///
/// Flags text that hedges and asserts certainty in the same breath. The
/// patterns themselves encode the adjacency; there is no proximity window.
#[derive(Debug)]
pub struct SafetyOverFluency {
    enabled: bool,
    severity: Severity,
    rules: Vec<CompiledRule>,
    max_context: usize,
}

impl SafetyOverFluency {
    pub const RULE_ID: &'static str = "I5_fluency_conflict";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.safety_over_fluency;
        Self {
            enabled: section.enabled,
            severity: section.severity,
            rules: compile_rules(
                InvariantId::I5,
                &section.patterns,
                "Hedging language inconsistent with confidence claim",
                false,
            ),
            max_context: config.logging.max_context_length,
        }
    }
}

impl InvariantCheck for SafetyOverFluency {
    fn invariant(&self) -> InvariantId {
        InvariantId::I5
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        if !self.enabled {
            return Vec::new();
        }
        let text = doc.text;
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.regex.find_iter(text).map(move |m| {
                    Violation::new(
                        patterns::violation_id(),
                        InvariantId::I5,
                        self.severity,
                        patterns::locate(text, doc.path, m.start(), m.end(), self.max_context),
                        format!("I5 Violation: {}", rule.message),
                    )
                    .with_suggested_fix("Choose either hedged or confident language, not both")
                    .with_evidence(evidence([
                        ("matched_pattern", rule.source.clone()),
                        ("matched_text", patterns::truncate_chars(m.as_str(), 100).to_string()),
                    ]))
                    .with_rule_id(Self::RULE_ID)
                })
            })
            .collect()
    }
}
