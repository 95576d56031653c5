//! File discovery
//!
//! Walks a target root and yields the files the gate should scan. Glob
//! policies are compiled once with `globset`; `**` crosses directory
//! separators and `*` stays within one segment. A path is tested both as a
//! `/`-separated path relative to the root and by its basename. Exclusion
//! always wins over inclusion.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::TargetPolicy;
use crate::error::{GateError, Result};

/// Compiled include/exclude policy.
#[derive(Debug, Clone)]
pub struct TargetFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl TargetFilter {
    /// Build a filter, skipping globs that do not compile.
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: build_set(include).unwrap_or_else(|_| GlobSet::empty()),
            exclude: build_set(exclude).unwrap_or_else(|_| GlobSet::empty()),
        }
    }

    pub fn from_policy(policy: &TargetPolicy) -> Self {
        Self::new(&policy.include, &policy.exclude)
    }

    /// Whether a root-relative path should be scanned.
    pub fn accepts(&self, relative: &Path) -> bool {
        let full = to_slash(relative);
        let base = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let hit = |set: &GlobSet| set.is_match(&full) || set.is_match(&base);
        if hit(&self.exclude) {
            return false;
        }
        hit(&self.include)
    }
}

fn build_set(globs: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs.iter().filter(|g| !g.is_empty()) {
        match GlobBuilder::new(glob).literal_separator(true).build() {
            Ok(compiled) => {
                builder.add(compiled);
            }
            Err(err) => warn!(%glob, error = %err, "skipping invalid glob"),
        }
    }
    builder.build().map_err(|source| GateError::InvalidGlob {
        glob: globs.join(", "),
        source,
    })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A directory entry the walk could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Files selected for a run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Root that relative artifact claims resolve against.
    pub workspace: PathBuf,
    /// Candidate files in walk order (sorted by name at every level).
    pub files: Vec<PathBuf>,
    pub walk_errors: Vec<WalkFailure>,
}

/// Enumerate candidate files under `root`.
///
/// A single file is its own only candidate and its parent directory becomes
/// the workspace. Unreadable entries are collected rather than dropped.
pub fn discover(root: &Path, filter: &TargetFilter) -> Result<Discovery> {
    if !root.exists() {
        return Err(GateError::TargetNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        let workspace = match root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return Ok(Discovery {
            workspace,
            files: vec![root.to_path_buf()],
            walk_errors: Vec::new(),
        });
    }

    let mut discovery = Discovery {
        workspace: root.to_path_buf(),
        ..Discovery::default()
    };
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %err, "directory walk error");
                discovery.walk_errors.push(WalkFailure {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if filter.accepts(relative) {
            discovery.files.push(entry.into_path());
        }
    }
    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        walk_errors = discovery.walk_errors.len(),
        "discovery complete"
    );
    Ok(discovery)
}
