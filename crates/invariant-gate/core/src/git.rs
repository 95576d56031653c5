//! Best-effort version-control metadata for report annotation.
//!
//! Every probe is optional: a missing `git` binary, a directory outside a
//! repository or a repository without an `origin` remote just leaves the
//! corresponding field empty. Nothing here influences the gate decision.

use invariant_gate_types::GitContext;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitMetadata {
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub repository: Option<String>,
}

impl GitMetadata {
    /// Query `git` in `dir`.
    pub fn probe(dir: &Path) -> Self {
        Self {
            commit_sha: git(dir, &["rev-parse", "HEAD"]),
            branch: git(dir, &["branch", "--show-current"]),
            repository: git(dir, &["remote", "get-url", "origin"]),
        }
    }

    pub fn into_context(self) -> GitContext {
        [
            ("commit_sha", self.commit_sha),
            ("branch", self.branch),
            ("repository", self.repository),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(output) if output.status.success() => {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!value.is_empty()).then_some(value)
        }
        Ok(output) => {
            debug!(?args, status = %output.status, "git query failed");
            None
        }
        Err(err) => {
            debug!(?args, error = %err, "git unavailable");
            None
        }
    }
}
