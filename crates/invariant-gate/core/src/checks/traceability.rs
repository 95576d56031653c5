use invariant_gate_types::{InvariantId, Location, Severity, Violation};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::warn;

use super::{compile_rules, evidence, found_nearby, CompiledRule, Document, InvariantCheck};
use crate::config::GateConfig;
use crate::patterns;

/// I4: Traceability Is Mandatory.
///
/// Two independent sub-checks:
/// - a trace document (one mentioning a trace marker) must spell out every
///   required field as a key (`"REQ_id":` or `REQ_id=`); each missing field
///   is reported against line 1
/// - a decision statement needs a trace token within
///   [`TraceabilityMandatory::TRACE_WINDOW`] characters
#[derive(Debug)]
pub struct TraceabilityMandatory {
    enabled: bool,
    severity: Severity,
    markers: Vec<String>,
    required_fields: Vec<String>,
    field_keys: Vec<(String, Regex)>,
    rules: Vec<CompiledRule>,
    trace_regex: Option<Regex>,
    max_context: usize,
}

impl TraceabilityMandatory {
    pub const TRACE_WINDOW: usize = 400;
    pub const MISSING_FIELD_RULE: &'static str = "I4_missing_trace_field";
    pub const DECISION_RULE: &'static str = "I4_decision_without_trace";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.traceability;
        let field_keys = section
            .required_trace_fields
            .iter()
            .filter_map(|field| {
                let key = format!(r#"["']?{}["']?\s*[:=]"#, regex::escape(field));
                match RegexBuilder::new(&key).case_insensitive(true).build() {
                    Ok(regex) => Some((field.clone(), regex)),
                    Err(err) => {
                        warn!(%field, error = %err, "skipping unusable trace field");
                        None
                    }
                }
            })
            .collect();
        Self {
            enabled: section.enabled,
            severity: section.severity,
            markers: section
                .trace_markers
                .iter()
                .filter(|m| !m.is_empty())
                .map(|m| m.to_lowercase())
                .collect(),
            required_fields: section.required_trace_fields.clone(),
            field_keys,
            rules: compile_rules(
                InvariantId::I4,
                &section.patterns,
                "Decision statement without trace chain reference",
                false,
            ),
            trace_regex: patterns::keyword_regex(&section.trace_reference_tokens, true),
            max_context: config.logging.max_context_length,
        }
    }

    /// Whether `text` presents itself as a trace document.
    pub fn is_trace_document(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }

    fn missing_fields(&self, doc: &Document<'_>, out: &mut Vec<Violation>) {
        let required: Vec<Value> = self
            .required_fields
            .iter()
            .map(|f| Value::String(f.clone()))
            .collect();
        for (field, key) in &self.field_keys {
            if key.is_match(doc.text) {
                continue;
            }
            out.push(
                Violation::new(
                    patterns::violation_id(),
                    InvariantId::I4,
                    self.severity,
                    Location::at_line(doc.path, 1),
                    format!("I4 Violation: Missing required trace field '{field}'"),
                )
                .with_suggested_fix(format!("Add {field} to complete the trace chain"))
                .with_evidence(evidence([
                    ("missing_field", Value::String(field.clone())),
                    ("required_fields", Value::Array(required.clone())),
                ]))
                .with_rule_id(Self::MISSING_FIELD_RULE),
            );
        }
    }

    fn untraced_decisions(&self, doc: &Document<'_>, out: &mut Vec<Violation>) {
        let text = doc.text;
        for rule in &self.rules {
            for m in rule.regex.find_iter(text) {
                if found_nearby(self.trace_regex.as_ref(), text, m.start(), m.end(), Self::TRACE_WINDOW)
                {
                    continue;
                }
                out.push(
                    Violation::new(
                        patterns::violation_id(),
                        InvariantId::I4,
                        self.severity,
                        patterns::locate(text, doc.path, m.start(), m.end(), self.max_context),
                        format!("I4 Violation: {}", rule.message),
                    )
                    .with_suggested_fix("Add trace chain (REQ → CTRL → TEST → EVID → DECISION)")
                    .with_evidence(evidence([("matched_text", m.as_str().to_string())]))
                    .with_rule_id(Self::DECISION_RULE),
                );
            }
        }
    }
}

impl InvariantCheck for TraceabilityMandatory {
    fn invariant(&self) -> InvariantId {
        InvariantId::I4
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        if !self.enabled {
            return Vec::new();
        }
        let mut violations = Vec::new();
        if self.is_trace_document(doc.text) {
            self.missing_fields(doc, &mut violations);
        }
        self.untraced_decisions(doc, &mut violations);
        violations
    }
}
