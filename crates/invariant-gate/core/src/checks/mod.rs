//! Invariant checkers I1–I6
//!
//! Each checker is built once from the policy (compiling its patterns) and
//! then applied to any number of documents. Checkers only read the policy;
//! the suite order fixes the order of violations within a file.
//!
//! Adding an invariant means implementing [`InvariantCheck`] and passing the
//! checker to [`crate::Validator::with_checks`]; the orchestrator does not
//! change.

mod confidence;
mod evidence_first;
mod fail_closed;
mod fluency;
mod phantom_work;
mod traceability;

pub use confidence::ConfidenceRequiresVerification;
pub use evidence_first::EvidenceFirst;
pub use fail_closed::FailClosed;
pub use fluency::SafetyOverFluency;
pub use phantom_work::NoPhantomWork;
pub use traceability::TraceabilityMandatory;

use invariant_gate_types::{Evidence, InvariantId, Violation};
use regex::Regex;
use std::path::Path;
use tracing::warn;

use crate::config::{GateConfig, PatternRule};
use crate::patterns;

/// One document handed to the checkers.
#[derive(Clone, Copy, Debug)]
pub struct Document<'a> {
    pub text: &'a str,
    /// Path reported in violation locations.
    pub path: &'a str,
    /// Root that relative artifact claims are resolved against.
    pub workspace: &'a Path,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str, path: &'a str, workspace: &'a Path) -> Self {
        Self {
            text,
            path,
            workspace,
        }
    }
}

/// A pluggable invariant checker.
pub trait InvariantCheck: Send + Sync {
    fn invariant(&self) -> InvariantId;

    fn is_enabled(&self) -> bool;

    /// Violations found in `doc`, in detection order. Disabled checkers
    /// return nothing.
    fn check(&self, doc: &Document<'_>) -> Vec<Violation>;
}

/// The six standard checkers in evaluation order I1→I6.
pub fn standard_suite(config: &GateConfig) -> Vec<Box<dyn InvariantCheck>> {
    vec![
        Box::new(EvidenceFirst::from_config(config)),
        Box::new(NoPhantomWork::from_config(config)),
        Box::new(ConfidenceRequiresVerification::from_config(config)),
        Box::new(TraceabilityMandatory::from_config(config)),
        Box::new(SafetyOverFluency::from_config(config)),
        Box::new(FailClosed::from_config(config)),
    ]
}

/// A configured pattern after compilation.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub regex: Regex,
    pub source: String,
    pub message: String,
}

/// Compile configured rules, skipping blank and invalid patterns.
pub(crate) fn compile_rules(
    invariant: InvariantId,
    rules: &[PatternRule],
    default_message: &str,
    dot_all: bool,
) -> Vec<CompiledRule> {
    rules
        .iter()
        .filter(|rule| !rule.pattern.is_empty())
        .filter_map(|rule| {
            compile_one(invariant, &rule.pattern, dot_all).map(|regex| CompiledRule {
                regex,
                source: rule.pattern.clone(),
                message: rule
                    .message
                    .clone()
                    .unwrap_or_else(|| default_message.to_string()),
            })
        })
        .collect()
}

/// Compile one pattern, logging and dropping it when invalid.
pub(crate) fn compile_one(invariant: InvariantId, pattern: &str, dot_all: bool) -> Option<Regex> {
    match patterns::compile_pattern(invariant, pattern, dot_all) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(%invariant, %pattern, error = %err, "skipping invalid pattern");
            None
        }
    }
}

/// Evidence map from key/value pairs.
pub(crate) fn evidence<I, K, V>(entries: I) -> Evidence
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Whether `proximity` finds anything within `radius` characters of a match.
pub(crate) fn found_nearby(
    proximity: Option<&Regex>,
    text: &str,
    start: usize,
    end: usize,
    radius: usize,
) -> bool {
    proximity.is_some_and(|re| re.is_match(patterns::window(text, start, end, radius)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_runs_in_invariant_order() {
        let suite = standard_suite(&GateConfig::default());
        let order: Vec<_> = suite.iter().map(|c| c.invariant()).collect();
        assert_eq!(order, InvariantId::CHECKED.to_vec());
        assert!(suite.iter().all(|c| c.is_enabled()));
    }

    #[test]
    fn invalid_rules_are_skipped_not_fatal() {
        let rules = vec![
            PatternRule::new("(broken", "bad"),
            PatternRule::bare(""),
            PatternRule::new(r"\bok\b", "fine"),
        ];
        let compiled = compile_rules(InvariantId::I5, &rules, "default", false);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].message, "fine");
    }

    #[test]
    fn empty_document_is_clean() {
        let config = GateConfig::default();
        let doc = test_support::doc("");
        for check in standard_suite(&config) {
            assert!(check.check(&doc).is_empty(), "{}", check.invariant());
        }
    }
}
