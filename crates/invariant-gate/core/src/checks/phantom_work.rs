use invariant_gate_types::{InvariantId, Severity, Violation};
use regex::Regex;
use tracing::debug;

use super::{compile_one, evidence, found_nearby, Document, InvariantCheck};
use crate::config::{GateConfig, PhantomCheckKind};
use crate::patterns;

#[derive(Debug)]
enum PhantomRule {
    /// First capture group names a file that must exist in the workspace.
    FileExistence { regex: Regex, source: String },
    /// Completion claim that needs an evidence keyword nearby.
    ArtifactVerification { regex: Regex, source: String },
}

/// I2: No Phantom Work.
///
/// Work may not be claimed as done unless its artifact exists. This is the
/// only checker that touches the filesystem; a missing or inaccessible
/// path simply counts as absent.
#[derive(Debug)]
pub struct NoPhantomWork {
    enabled: bool,
    severity: Severity,
    rules: Vec<PhantomRule>,
    evidence_regex: Option<Regex>,
    max_context: usize,
}

impl NoPhantomWork {
    pub const EVIDENCE_WINDOW: usize = 150;
    pub const FILE_EXISTENCE_RULE: &'static str = "I2_file_existence";
    pub const ARTIFACT_VERIFICATION_RULE: &'static str = "I2_artifact_verification";

    pub fn from_config(config: &GateConfig) -> Self {
        let section = &config.invariants.no_phantom_work;
        let mut rules = Vec::new();
        for validator in &section.validators {
            for pattern in validator.patterns.iter().filter(|p| !p.is_empty()) {
                let Some(regex) = compile_one(InvariantId::I2, pattern, false) else {
                    continue;
                };
                let source = pattern.clone();
                match validator.kind {
                    PhantomCheckKind::FileExistence => {
                        rules.push(PhantomRule::FileExistence { regex, source })
                    }
                    PhantomCheckKind::ArtifactVerification => {
                        rules.push(PhantomRule::ArtifactVerification { regex, source })
                    }
                    PhantomCheckKind::Unknown => {
                        debug!(%pattern, "ignoring I2 validator of unknown type");
                    }
                }
            }
        }
        Self {
            enabled: section.enabled,
            severity: section.severity,
            rules,
            evidence_regex: patterns::keyword_regex(&section.evidence_keywords, true),
            max_context: config.logging.max_context_length,
        }
    }

    fn check_file_existence(
        &self,
        doc: &Document<'_>,
        regex: &Regex,
        source: &str,
        out: &mut Vec<Violation>,
    ) {
        let text = doc.text;
        for caps in regex.captures_iter(text) {
            let (Some(whole), Some(claimed)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let claimed_file = claimed.as_str();
            let checked_path = doc.workspace.join(claimed_file);
            if checked_path.exists() {
                continue;
            }
            out.push(
                Violation::new(
                    patterns::violation_id(),
                    InvariantId::I2,
                    self.severity,
                    patterns::locate(text, doc.path, whole.start(), whole.end(), self.max_context),
                    format!("I2 Violation: Claimed file '{claimed_file}' does not exist"),
                )
                .with_suggested_fix(format!(
                    "Create the file '{claimed_file}' or remove the completion claim"
                ))
                .with_evidence(evidence([
                    ("claimed_file", claimed_file.to_string()),
                    ("checked_path", checked_path.display().to_string()),
                    ("matched_pattern", source.to_string()),
                    ("validation_type", "file_existence".to_string()),
                ]))
                .with_rule_id(Self::FILE_EXISTENCE_RULE),
            );
        }
    }

    fn check_artifact_verification(
        &self,
        doc: &Document<'_>,
        regex: &Regex,
        source: &str,
        out: &mut Vec<Violation>,
    ) {
        let text = doc.text;
        for m in regex.find_iter(text) {
            if found_nearby(
                self.evidence_regex.as_ref(),
                text,
                m.start(),
                m.end(),
                Self::EVIDENCE_WINDOW,
            ) {
                continue;
            }
            out.push(
                Violation::new(
                    patterns::violation_id(),
                    InvariantId::I2,
                    self.severity,
                    patterns::locate(text, doc.path, m.start(), m.end(), self.max_context),
                    "I2 Violation: Completion claim without evidence reference",
                )
                .with_suggested_fix("Add reference to verification artifact")
                .with_evidence(evidence([
                    ("matched_pattern", source.to_string()),
                    ("matched_text", patterns::truncate_chars(m.as_str(), 100).to_string()),
                    ("validation_type", "artifact_verification".to_string()),
                ]))
                .with_rule_id(Self::ARTIFACT_VERIFICATION_RULE),
            );
        }
    }
}

impl InvariantCheck for NoPhantomWork {
    fn invariant(&self) -> InvariantId {
        InvariantId::I2
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        if !self.enabled {
            return Vec::new();
        }
        let mut violations = Vec::new();
        for rule in &self.rules {
            match rule {
                PhantomRule::FileExistence { regex, source } => {
                    self.check_file_existence(doc, regex, source, &mut violations)
                }
                PhantomRule::ArtifactVerification { regex, source } => {
                    self.check_artifact_verification(doc, regex, source, &mut violations)
                }
            }
        }
        violations
    }
}
