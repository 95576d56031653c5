//! Trace-log schema checks.
//!
//! A trace log is a JSON document holding one entry object or an array of
//! them. Each entry records a claim, the per-invariant validator verdicts
//! and the final decision. Entries are kept as raw JSON so unknown fields
//! survive untouched.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use crate::error::{GateError, Result};

pub const REQUIRED_FIELDS: [&str; 6] = [
    "claim_id",
    "timestamp",
    "claim_text",
    "confidence_score",
    "validator_results",
    "final_decision",
];

pub const VALIDATOR_KEYS: [&str; 6] = [
    "I1_check", "I2_check", "I3_check", "I4_check", "I5_check", "I6_check",
];

pub const TRACE_FIELDS: [&str; 5] = ["REQ_id", "CTRL_id", "TEST_id", "EVID_id", "DECISION_id"];

const CHECK_VALUES: [&str; 3] = ["PASS", "FAIL", "SKIP"];
const DECISIONS: [&str; 3] = ["EMIT", "BLOCK", "ESCALATE"];
const EPISTEMIC_TAGS: [&str; 3] = ["OBSERVED", "INFERRED", "SPECULATED"];
const FAILURE_MODES: [&str; 5] = ["F1", "F2", "F3", "F4", "F5"];

/// An entry rejected by [`partition`] in strict mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    pub index: usize,
    pub entry: Value,
    pub errors: Vec<String>,
}

/// Read a trace log; a single object is returned as a one-entry list.
pub fn load(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Err(GateError::FileNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| GateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

/// Parse trace-log text.
pub fn parse(contents: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(contents)? {
        Value::Array(entries) => Ok(entries),
        entry @ Value::Object(_) => Ok(vec![entry]),
        other => Err(GateError::TraceLog(format!(
            "expected an object or an array of objects, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings print bare; everything else prints as JSON.
fn shown(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|s| allowed.contains(&s))
}

fn is_set(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// Schema problems in one entry; empty when the entry is valid.
pub fn validate_entry(entry: &Value) -> Vec<String> {
    let Some(fields) = entry.as_object() else {
        return vec![format!("Entry is {}, not an object", kind(entry))];
    };
    let mut errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !fields.contains_key(**f))
        .map(|f| format!("Missing required field: {f}"))
        .collect();

    if let Some(results) = fields.get("validator_results") {
        for key in VALIDATOR_KEYS {
            match results.get(key) {
                None => errors.push(format!("Missing validator key: {key}")),
                Some(verdict) if !one_of(verdict, &CHECK_VALUES) => {
                    errors.push(format!("Invalid {key} value: {}", shown(verdict)))
                }
                Some(_) => {}
            }
        }
    }

    if let Some(score) = fields.get("confidence_score") {
        let in_range = score.as_f64().is_some_and(|s| (0.0..=1.0).contains(&s));
        if !in_range {
            errors.push(format!(
                "Invalid confidence_score: {} (must be 0.0-1.0)",
                shown(score)
            ));
        }
    }

    if let Some(decision) = fields.get("final_decision") {
        if !one_of(decision, &DECISIONS) {
            errors.push(format!("Invalid final_decision: {}", shown(decision)));
        }
    }

    if let Some(tag) = is_set(fields.get("epistemic_tag")) {
        if !one_of(tag, &EPISTEMIC_TAGS) {
            errors.push(format!("Invalid epistemic_tag: {}", shown(tag)));
        }
    }

    if let Some(mode) = is_set(fields.get("failure_mode")) {
        if !one_of(mode, &FAILURE_MODES) {
            errors.push(format!("Invalid failure_mode: {}", shown(mode)));
        }
    }

    errors
}

/// Split entries into accepted and rejected.
///
/// In non-strict mode flawed entries are accepted anyway and a warning is
/// logged for each.
pub fn partition(entries: Vec<Value>, strict: bool) -> (Vec<Value>, Vec<Rejected>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let errors = validate_entry(&entry);
        if errors.is_empty() {
            accepted.push(entry);
        } else if strict {
            rejected.push(Rejected {
                index,
                entry,
                errors,
            });
        } else {
            warn!(index, ?errors, "trace entry has validation issues");
            accepted.push(entry);
        }
    }
    (accepted, rejected)
}

/// Whether every link of the entry's trace chain is filled in.
pub fn trace_complete(entry: &Value) -> bool {
    let Some(chain) = entry.get("trace_chain") else {
        return false;
    };
    TRACE_FIELDS
        .iter()
        .all(|field| is_set(chain.get(*field)).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_entry() -> Value {
        json!({
            "claim_id": "C-001",
            "timestamp": "2026-01-01T00:00:00Z",
            "claim_text": "[OBSERVED] latency dropped",
            "confidence_score": 0.72,
            "validator_results": {
                "I1_check": "PASS", "I2_check": "PASS", "I3_check": "SKIP",
                "I4_check": "PASS", "I5_check": "PASS", "I6_check": "FAIL"
            },
            "final_decision": "ESCALATE",
            "epistemic_tag": "OBSERVED",
            "failure_mode": null,
            "trace_chain": {
                "REQ_id": "R1", "CTRL_id": "C1", "TEST_id": "T1",
                "EVID_id": "E1", "DECISION_id": "D1"
            }
        })
    }

    #[test]
    fn valid_entry_has_no_errors() {
        assert!(validate_entry(&valid_entry()).is_empty());
        assert!(trace_complete(&valid_entry()));
    }

    #[test]
    fn reports_each_problem() {
        let mut entry = valid_entry();
        let fields = entry.as_object_mut().unwrap();
        fields.remove("claim_text");
        fields["confidence_score"] = json!(1.5);
        fields["final_decision"] = json!("SHIP");
        fields["failure_mode"] = json!("F9");
        fields["validator_results"]["I2_check"] = json!("MAYBE");
        fields["validator_results"]
            .as_object_mut()
            .unwrap()
            .remove("I6_check");

        let errors = validate_entry(&entry);
        assert_eq!(
            errors,
            vec![
                "Missing required field: claim_text",
                "Invalid I2_check value: MAYBE",
                "Missing validator key: I6_check",
                "Invalid confidence_score: 1.5 (must be 0.0-1.0)",
                "Invalid final_decision: SHIP",
                "Invalid failure_mode: F9",
            ]
        );
    }

    #[test]
    fn non_numeric_confidence_is_invalid() {
        let mut entry = valid_entry();
        entry["confidence_score"] = json!("high");
        assert_eq!(
            validate_entry(&entry),
            vec!["Invalid confidence_score: high (must be 0.0-1.0)"]
        );
    }

    #[test]
    fn partition_strict_and_lenient() {
        let entries = vec![valid_entry(), json!({"claim_id": "x"}), valid_entry()];
        let (accepted, rejected) = partition(entries.clone(), true);
        assert_eq!(accepted.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].errors.len(), 5);

        let (accepted, rejected) = partition(entries, false);
        assert_eq!(accepted.len(), 3);
        assert!(rejected.is_empty());
    }

    #[test]
    fn parse_accepts_object_or_array() {
        assert_eq!(parse("{\"claim_id\": \"a\"}").unwrap().len(), 1);
        assert_eq!(parse("[{}, {}]").unwrap().len(), 2);
        assert!(matches!(parse("42"), Err(GateError::TraceLog(_))));
        assert!(matches!(parse("{oops"), Err(GateError::Serialization(_))));
    }

    #[test]
    fn incomplete_trace_chain() {
        let mut entry = valid_entry();
        entry["trace_chain"]["TEST_id"] = json!("");
        assert!(!trace_complete(&entry));
        assert!(!trace_complete(&json!({"claim_id": "x"})));
    }

    #[test]
    fn load_missing_file() {
        let err = load(Path::new("/no/such/trace.json")).unwrap_err();
        assert!(matches!(err, GateError::FileNotFound(_)));
    }
}
