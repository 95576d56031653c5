//! Policy configuration
//!
//! A strongly typed view of the gate policy document. Every section carries
//! `#[serde(default)]`, so a partial document only overrides what it names
//! and unknown keys are ignored. The full default rule set is embedded here;
//! nothing is expected on disk.

use invariant_gate_types::{InvariantId, Severity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::error::{GateError, Result};

/// Conventional policy file name looked up when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "validator_config.yaml";

/// Root of the policy document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub validator: ValidatorInfo,
    pub invariants: InvariantsConfig,
    pub gate: GatePolicy,
    pub validation_targets: TargetPolicy,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorInfo {
    pub name: String,
    pub version: String,
}

impl Default for ValidatorInfo {
    fn default() -> Self {
        Self {
            name: "PROACTIVE Constitutional Safety Gate".into(),
            version: "1.0.0".into(),
        }
    }
}

/// A regex with the message reported when it matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: Some(message.into()),
        }
    }

    pub fn bare(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvariantsConfig {
    #[serde(rename = "I1_evidence_first")]
    pub evidence_first: EvidenceFirstConfig,
    #[serde(rename = "I2_no_phantom_work")]
    pub no_phantom_work: NoPhantomWorkConfig,
    #[serde(rename = "I3_confidence_requires_verification")]
    pub confidence: ConfidenceConfig,
    #[serde(rename = "I4_traceability_mandatory")]
    pub traceability: TraceabilityConfig,
    #[serde(rename = "I5_safety_over_fluency")]
    pub safety_over_fluency: SafetyOverFluencyConfig,
    #[serde(rename = "I6_fail_closed")]
    pub fail_closed: FailClosedConfig,
}

impl InvariantsConfig {
    pub fn is_enabled(&self, invariant: InvariantId) -> bool {
        match invariant {
            InvariantId::I1 => self.evidence_first.enabled,
            InvariantId::I2 => self.no_phantom_work.enabled,
            InvariantId::I3 => self.confidence.enabled,
            InvariantId::I4 => self.traceability.enabled,
            InvariantId::I5 => self.safety_over_fluency.enabled,
            InvariantId::I6 => self.fail_closed.enabled,
            InvariantId::System => true,
        }
    }

    /// Enabled checkable invariants in id order.
    pub fn enabled(&self) -> Vec<InvariantId> {
        InvariantId::CHECKED
            .into_iter()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }
}

/// I1: absolute claims need an epistemic tag nearby.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceFirstConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub patterns: Vec<PatternRule>,
    pub required_tags: Vec<String>,
}

impl Default for EvidenceFirstConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Error,
            patterns: vec![
                PatternRule::new(
                    r"\b(certainly|definitely|absolutely|guaranteed|always|never)\b",
                    "Absolute claim without epistemic qualification",
                ),
                PatternRule::new(
                    r"\b(I am sure|I am certain|there is no doubt)\b",
                    "Certainty expression without evidence reference",
                ),
            ],
            required_tags: vec!["OBSERVED".into(), "INFERRED".into(), "SPECULATED".into()],
        }
    }
}

/// Kind of I2 validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhantomCheckKind {
    /// Captured filename must exist under the workspace root.
    FileExistence,
    /// Completion claims need an evidence keyword nearby.
    ArtifactVerification,
    /// Unrecognized kinds are ignored.
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhantomCheck {
    #[serde(rename = "type")]
    pub kind: PhantomCheckKind,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// I2: claimed work must exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoPhantomWorkConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub validators: Vec<PhantomCheck>,
    pub evidence_keywords: Vec<String>,
}

impl Default for NoPhantomWorkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Error,
            validators: vec![
                PhantomCheck {
                    kind: PhantomCheckKind::FileExistence,
                    patterns: vec![
                        r#"(?:created|generated|wrote|saved|output).*?["']([^"']+\.[a-zA-Z]{2,5})["']"#
                            .into(),
                        r#"(?:file|document|report)\s+["']([^"']+\.[a-zA-Z]{2,5})["'].*?(?:created|ready|complete)"#
                            .into(),
                    ],
                },
                PhantomCheck {
                    kind: PhantomCheckKind::ArtifactVerification,
                    patterns: vec![
                        r"\b(completed|finished|done|implemented)\b.*\b(all|every|entire)\b".into(),
                    ],
                },
            ],
            evidence_keywords: ["evidence", "proof", "verified", "tested", "see", "ref", "artifact"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// I3: high confidence needs a verification reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub confidence_threshold: f64,
    pub patterns: Vec<PatternRule>,
    pub verification_keywords: Vec<String>,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            confidence_threshold: 0.8,
            patterns: vec![PatternRule::bare(r"confidence[:\s]*([01]\.?\d*)")],
            verification_keywords: [
                "verified",
                "tested",
                "validated",
                "confirmed",
                "evidence",
                "proof",
                "artifact",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// I4: decisions must be traceable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceabilityConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub required_trace_fields: Vec<String>,
    pub patterns: Vec<PatternRule>,
    /// Case-insensitive substrings marking a document as a trace document.
    pub trace_markers: Vec<String>,
    /// Tokens that count as a trace reference near a decision statement.
    pub trace_reference_tokens: Vec<String>,
}

impl Default for TraceabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Error,
            required_trace_fields: ["REQ_id", "CTRL_id", "TEST_id", "EVID_id", "DECISION_id"]
                .into_iter()
                .map(String::from)
                .collect(),
            patterns: vec![PatternRule::new(
                r"\b(decided|decision|approved|rejected|selected)\b",
                "Decision statement without trace chain reference",
            )],
            trace_markers: vec!["trace_chain".into(), "decision_id".into()],
            trace_reference_tokens: ["REQ", "CTRL", "TEST", "EVID", "DECISION", "trace_chain", "trace"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// I5: hedging and certainty must not be mixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyOverFluencyConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub patterns: Vec<PatternRule>,
}

impl Default for SafetyOverFluencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            patterns: vec![
                PatternRule::new(
                    r"(?:seems? like|probably|might|could be|appears to).*?(?:certain|definite|high confidence)",
                    "Hedging language combined with certainty",
                ),
                PatternRule::new(
                    r"(?:certain|definite|high confidence).*?(?:seems? like|probably|might|could be|appears to)",
                    "Certainty combined with hedging language",
                ),
            ],
        }
    }
}

/// I6: failures must be surfaced, not suppressed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailClosedConfig {
    pub enabled: bool,
    pub severity: Severity,
    pub patterns: Vec<PatternRule>,
}

impl Default for FailClosedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Error,
            patterns: vec![
                PatternRule::new(
                    r"(?:ignore|suppress|skip|bypass|work around).*?(?:error|exception|failure|warning)",
                    "Attempting to bypass error instead of fail-closed behavior",
                ),
                PatternRule::new(
                    r"(?:error|exception|failure).*?(?:ignore|suppress|skip|continue anyway)",
                    "Continuing despite error instead of fail-closed behavior",
                ),
                PatternRule::new(
                    r"try\s*:.*?except\s*:?\s*pass",
                    "Silent exception handling - should surface error",
                ),
                PatternRule::new(
                    r"catch.*?\{\s*(?://.*?continue|/\*.*?\*/\s*\})",
                    "Empty catch block - should surface error",
                ),
            ],
        }
    }
}

/// Gate decision policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePolicy {
    pub fail_on_error: bool,
    pub fail_on_warning: bool,
    pub warning_threshold: usize,
    pub output_format: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            fail_on_error: true,
            fail_on_warning: false,
            warning_threshold: 5,
            output_format: "sarif".into(),
        }
    }
}

/// Which files a directory scan considers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPolicy {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            include: ["**/*.json", "**/*.yaml", "**/*.yml", "**/outputs/*.md", "**/claims/*.txt"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude: [
                "node_modules/**",
                ".git/**",
                "**/*.test.*",
                "**/test_cases/**",
                "**/__pycache__/**",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub max_context_length: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_context_length: 200,
        }
    }
}

impl GateConfig {
    /// Parse a YAML policy document.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Read and parse a policy file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Err(GateError::EmptyConfig(path.to_path_buf()));
        }
        Self::from_yaml_str(&contents)
    }

    /// Load a policy file, degrading to the embedded defaults when the file
    /// is missing or malformed. Never fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "policy file not found, using embedded defaults");
            return Self::default();
        }
        match Self::from_path(path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded policy file");
                config
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "could not load policy file, using embedded defaults"
                );
                Self::default()
            }
        }
    }
}

/// Loads the policy once and hands out the same instance until reset.
///
/// Construct one per run (or per test) and share it by reference; there is
/// no process-wide state.
#[derive(Debug, Default)]
pub struct ConfigStore {
    cached: OnceLock<Arc<GateConfig>>,
    source: OnceLock<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a fixed configuration; `load` ignores its path.
    pub fn with_config(config: GateConfig) -> Self {
        let store = Self::new();
        let _ = store.cached.set(Arc::new(config));
        store
    }

    /// Return the cached configuration, loading it from `path` on first use.
    pub fn load(&self, path: impl AsRef<Path>) -> Arc<GateConfig> {
        let path = path.as_ref();
        self.cached
            .get_or_init(|| {
                let _ = self.source.set(path.to_path_buf());
                Arc::new(GateConfig::load_or_default(path))
            })
            .clone()
    }

    /// Path the cached configuration was loaded from, if it came from `load`.
    pub fn source(&self) -> Option<&Path> {
        self.source.get().map(PathBuf::as_path)
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Drop the cached configuration so the next `load` reads again.
    pub fn reset(&mut self) {
        self.cached.take();
        self.source.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_complete() {
        let config = GateConfig::default();
        assert_eq!(config.invariants.enabled().len(), 6);
        assert_eq!(config.invariants.confidence.confidence_threshold, 0.8);
        assert_eq!(config.invariants.evidence_first.required_tags.len(), 3);
        assert_eq!(config.invariants.traceability.required_trace_fields.len(), 5);
        assert!(config.gate.fail_on_error);
        assert!(!config.gate.fail_on_warning);
        assert_eq!(config.gate.warning_threshold, 5);
        assert_eq!(config.logging.max_context_length, 200);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let yaml = r#"
invariants:
  I3_confidence_requires_verification:
    confidence_threshold: 0.95
  I5_safety_over_fluency:
    enabled: false
gate:
  warning_threshold: 2
unknown_section:
  anything: true
"#;
        let config = GateConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.invariants.confidence.confidence_threshold, 0.95);
        assert_eq!(config.invariants.confidence.verification_keywords.len(), 7);
        assert!(!config.invariants.safety_over_fluency.enabled);
        assert_eq!(config.gate.warning_threshold, 2);
        assert!(config.gate.fail_on_error);
        assert_eq!(
            config.invariants.enabled(),
            vec![
                InvariantId::I1,
                InvariantId::I2,
                InvariantId::I3,
                InvariantId::I4,
                InvariantId::I6
            ]
        );
    }

    #[test]
    fn test_unknown_phantom_kind_is_tolerated() {
        let yaml = r#"
invariants:
  I2_no_phantom_work:
    validators:
      - type: checksum_match
        patterns: ["x"]
"#;
        let config = GateConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.invariants.no_phantom_work.validators[0].kind,
            PhantomCheckKind::Unknown
        );
    }

    #[test]
    fn test_load_missing_config_falls_back() {
        let config = GateConfig::load_or_default("/nonexistent/path/validator_config.yaml");
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_load_malformed_config_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gate: [unclosed").unwrap();
        assert!(GateConfig::from_path(file.path()).is_err());
        assert_eq!(GateConfig::load_or_default(file.path()), GateConfig::default());
    }

    #[test]
    fn test_store_caches_until_reset() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "gate:\n  warning_threshold: 1").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "gate:\n  warning_threshold: 9").unwrap();

        let mut store = ConfigStore::new();
        assert!(!store.is_loaded());
        let a = store.load(first.path());
        let b = store.load(second.path());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.gate.warning_threshold, 1);
        assert_eq!(store.source(), Some(first.path()));

        store.reset();
        let c = store.load(second.path());
        assert_eq!(c.gate.warning_threshold, 9);
    }

    #[test]
    fn test_injected_config_wins() {
        let mut config = GateConfig::default();
        config.gate.fail_on_warning = true;
        let store = ConfigStore::with_config(config);
        assert!(store.load(DEFAULT_CONFIG_PATH).gate.fail_on_warning);
        assert!(store.source().is_none());
    }
}
