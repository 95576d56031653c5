use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn gate() -> Command {
    let mut cmd = Command::cargo_bin("invariant-gate").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("INVARIANT_GATE_CONFIG")
        .env_remove("INVARIANT_GATE_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, body) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, body).unwrap();
    }
    dir
}

fn no_config(dir: &Path) -> String {
    dir.join("absent.yaml").display().to_string()
}

#[test]
fn clean_tree_passes() {
    let dir = workspace(&[("outputs/answer.md", "[OBSERVED] Latency dropped after the change.")]);
    gate()
        .args(["validate", "--no-git", "--config", &no_config(dir.path())])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Gate Result: PASS"))
        .stdout(predicate::str::contains("Files Scanned: 1"));
}

#[test]
fn violations_fail_with_exit_code_one() {
    let dir = workspace(&[("claims/c1.txt", "The model is always correct.")]);
    let output = gate()
        .args(["validate", "--no-git", "--format", "json", "--config", &no_config(dir.path())])
        .arg(dir.path())
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["summary"]["gate_result"], "FAIL");
    assert_eq!(report["summary"]["errors"], 1);
    assert_eq!(report["violations"][0]["invariant"], "I1");
    assert!(report["summary"]["execution_time_ms"].is_u64());
}

#[test]
fn sarif_output_to_file() {
    let dir = workspace(&[("a.json", "Just bypass the error.")]);
    let target = dir.path().join("report.sarif");
    gate()
        .args(["validate", "--no-git", "-f", "sarif", "--config", &no_config(dir.path())])
        .arg(dir.path().join("a.json"))
        .arg("--output")
        .arg(&target)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Gate FAIL"));

    let sarif: serde_json::Value = serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    assert_eq!(sarif["runs"][0]["results"][0]["ruleId"], "I6");
    assert_eq!(sarif["runs"][0]["results"][0]["level"], "error");
}

#[test]
fn policy_from_environment() {
    let dir = workspace(&[
        ("policy.yaml", "invariants:\n  I1_evidence_first:\n    enabled: false\n"),
        ("data/a.json", "It always works."),
    ]);
    gate()
        .env("INVARIANT_GATE_CONFIG", dir.path().join("policy.yaml"))
        .env("INVARIANT_GATE_FORMAT", "json")
        .args(["validate", "--no-git"])
        .arg(dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gate_result\": \"PASS\""));
}

#[test]
fn missing_policy_file_is_reported() {
    let dir = workspace(&[("a.json", "[OBSERVED] fine")]);
    gate()
        .args(["validate", "--no-git", "--config"])
        .arg(dir.path().join("typo.yaml"))
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("policy file not found, using embedded defaults"))
        .stderr(predicate::str::contains("typo.yaml"));
}

#[test]
fn missing_target_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    gate()
        .args(["validate", "--no-git", "--config", &no_config(dir.path())])
        .arg(dir.path().join("nowhere"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Directory not found"));
}

#[test]
fn zero_workers_is_a_setup_error() {
    gate()
        .args(["validate", "--no-git", "--workers", "0", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--workers must be at least 1"));
}

#[test]
fn invariant_catalogue() {
    let output = gate()
        .args(["invariants", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 7);
    assert_eq!(list[0]["id"], "I1");
    assert_eq!(list[6]["name"], "System Error");

    gate()
        .arg("invariants")
        .assert()
        .success()
        .stdout(predicate::str::contains("Traceability Is Mandatory"));
}

#[test]
fn trace_check_strict_and_lenient() {
    let dir = workspace(&[(
        "trace.json",
        r#"[
            {"claim_id": "C1", "timestamp": "2026-01-01T00:00:00Z", "claim_text": "x",
             "confidence_score": 0.4, "final_decision": "EMIT",
             "validator_results": {"I1_check": "PASS", "I2_check": "PASS", "I3_check": "PASS",
                                   "I4_check": "PASS", "I5_check": "PASS", "I6_check": "PASS"}},
            {"claim_id": "C2", "final_decision": "SHIP"}
        ]"#,
    )]);
    let file = dir.path().join("trace.json");

    gate()
        .arg("trace-check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid final_decision: SHIP"));

    gate()
        .arg("trace-check")
        .arg(&file)
        .arg("--no-strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted: 2"));
}

#[test]
fn missing_trace_log_is_a_setup_error() {
    gate()
        .args(["trace-check", "/no/such/trace.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}
