use invariant_gate_types::{InvariantId, Severity, Violation};
use regex::Regex;

use super::{compile_rules, evidence, found_nearby, CompiledRule, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::patterns;

/// I3: Confidence Requires Verification.
///
/// The first capture group of each match is read as a confidence value.
/// Values at or above the threshold need a verification keyword within
/// [`ConfidenceRequiresVerification::VERIFICATION_WINDOW`] characters.
/// Matches whose value does not parse are skipped.
#[derive(Debug)]
pub struct ConfidenceRequiresVerification {
    enabled: bool,
    severity: Severity,
    threshold: f64,
    rules: Vec<CompiledRule>,
    verification_regex: Option<Regex>,
    max_context: usize,
}

impl ConfidenceRequiresVerification {
    pub const VERIFICATION_WINDOW: usize = 300;
    pub const RULE_ID: &'static str = "I3_confidence_verification";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.confidence;
        Self {
            enabled: section.enabled,
            severity: section.severity,
            threshold: section.confidence_threshold,
            rules: compile_rules(InvariantId::I3, &section.patterns, "", false),
            verification_regex: patterns::keyword_regex(&section.verification_keywords, true),
            max_context: config.logging.max_context_length,
        }
    }
}

impl InvariantCheck for ConfidenceRequiresVerification {
    fn invariant(&self) -> InvariantId {
        InvariantId::I3
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
            for caps in rule.regex.captures_iter(text) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Ok(confidence) = value.as_str().parse::<f64>() else {
                    continue;
                };
                if confidence.is_nan() || confidence < self.threshold {
                    continue;
                }
                if found_nearby(
                    self.verification_regex.as_ref(),
                    text,
                    whole.start(),
                    whole.end(),
                    Self::VERIFICATION_WINDOW,
                ) {
                    continue;
                }
                violations.push(
                    Violation::new(
                        patterns::violation_id(),
                        InvariantId::I3,
                        self.severity,
                        patterns::locate(text, doc.path, whole.start(), whole.end(), self.max_context),
                        format!(
                            "I3 Violation: High confidence ({confidence:?}) without verification reference"
                        ),
                    )
                    .with_suggested_fix("Add reference to verification artifact or reduce confidence")
                    .with_evidence(evidence([
                        ("confidence_value", confidence),
                        ("threshold", self.threshold),
                    ]))
                    .with_rule_id(Self::RULE_ID),
                );
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::doc;

    fn checker() -> ConfidenceRequiresVerification {
        ConfidenceRequiresVerification::from_config(&GateConfig::default())
    }

    #[test]
    fn high_unverified_confidence_warns() {
        let violations = checker().check(&doc("Answer given with confidence: 0.95"));
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.severity(), Severity::Warning);
        assert_eq!(
            v.message(),
            "I3 Violation: High confidence (0.95) without verification reference"
        );
        assert_eq!(v.evidence().unwrap()["threshold"], 0.8);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(checker().check(&doc("confidence 0.8")).len(), 1);
        assert_eq!(checker().check(&doc("confidence 1")).len(), 1);
    }

    #[test]
    fn below_threshold_never_flags() {
        assert!(checker().check(&doc("confidence: 0.79")).is_empty());
        assert!(checker().check(&doc("confidence: 0.3, not verified")).is_empty());
    }

    #[test]
    fn verification_keyword_suppresses() {
        assert!(checker()
            .check(&doc("confidence: 0.99 — validated against the holdout set"))
            .is_empty());
    }

    #[test]
    fn verification_window_edge() {
        let at = |gap: usize| format!("confidence: 0.95{}verified", " ".repeat(gap));
        let window = ConfidenceRequiresVerification::VERIFICATION_WINDOW;
        assert!(checker().check(&doc(&at(window - "verified".len()))).is_empty());
        assert_eq!(checker().check(&doc(&at(window - "verified".len() + 1))).len(), 1);
    }

    #[test]
    fn unparseable_value_is_skipped() {
        let yaml = r#"
invariants:
  I3_confidence_requires_verification:
    patterns:
      - pattern: 'certainty=(\w+)'
      - pattern: 'no group here'
"#;
        let config = GateConfig::from_yaml_str(yaml).unwrap();
        let checker = ConfidenceRequiresVerification::from_config(&config);
        assert!(checker
            .check(&doc("certainty=high and no group here"))
            .is_empty());
    }
}
