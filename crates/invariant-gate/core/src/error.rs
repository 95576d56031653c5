use std::path::PathBuf;

use invariant_gate_types::InvariantId;
use thiserror::Error;

/// Errors raised by the gate engine.
///
/// Input failures never escape the orchestrator; they are turned into
/// `SYSTEM` violations there. The remaining variants surface only from the
/// fallible building blocks (config parsing, pattern compilation, rendering).
#[derive(Error, Debug)]
pub enum GateError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("config document is empty: {0}")]
    EmptyConfig(PathBuf),

    #[error("invalid regex pattern in {invariant} config: {pattern}: {source}")]
    InvalidPattern {
        invariant: InvariantId,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob {glob:?}: {source}")]
    InvalidGlob {
        glob: String,
        #[source]
        source: globset::Error,
    },

    #[error("target not found: {0}")]
    TargetNotFound(PathBuf),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("error reading file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("trace log error: {0}")]
    TraceLog(String),
}

pub type Result<T> = std::result::Result<T, GateError>;
