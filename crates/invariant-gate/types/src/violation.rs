use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::InvariantId;

/// Free-form diagnostic payload attached to a violation.
pub type Evidence = BTreeMap<String, serde_json::Value>;

/// Severity of a violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a violation was found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    /// 1-indexed line of the match start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Whitespace-normalized snippet around the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Location {
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            context: None,
        }
    }

    pub fn at_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// One detected policy breach.
///
/// Built once through the `with_*` builders and read through accessors
/// afterwards; nothing mutates a violation after it joins a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    id: String,
    invariant: InvariantId,
    severity: Severity,
    location: Location,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule_id: Option<String>,
}

impl Violation {
    pub fn new(
        id: impl Into<String>,
        invariant: InvariantId,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            invariant,
            severity,
            location,
            message: message.into(),
            suggested_fix: None,
            evidence: None,
            rule_id: None,
        }
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn invariant(&self) -> InvariantId {
        self.invariant
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggested_fix(&self) -> Option<&str> {
        self.suggested_fix.as_deref()
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_optionals_are_omitted() {
        let v = Violation::new(
            "V-00AF",
            InvariantId::System,
            Severity::Error,
            Location::file("missing.json"),
            "File not found: missing.json",
        );
        let json = serde_json::to_value(&v).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["invariant"], "SYSTEM");
        assert_eq!(obj["severity"], "ERROR");
        assert!(!obj.contains_key("suggested_fix"));
        assert!(!obj.contains_key("evidence"));
        assert!(!obj.contains_key("rule_id"));
        assert!(!obj["location"].as_object().unwrap().contains_key("line"));
    }

    #[test]
    fn builder_sets_optionals() {
        let mut evidence = Evidence::new();
        evidence.insert("matched_text".into(), "always".into());
        let v = Violation::new(
            "V-1234",
            InvariantId::I1,
            Severity::Error,
            Location::at_line("a.md", 3).with_context("is always right"),
            "I1 Violation: Absolute claim",
        )
        .with_suggested_fix("Add epistemic tag")
        .with_evidence(evidence)
        .with_rule_id("I1_evidence_first");

        assert_eq!(v.rule_id(), Some("I1_evidence_first"));
        assert_eq!(v.location().line, Some(3));
        assert!(v.is_error());
        let back: Violation = serde_json::from_str(&serde_json::to_string(&v).unwrap()).unwrap();
        assert_eq!(back, v);
    }
}
