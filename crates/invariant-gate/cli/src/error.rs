//! CLI error types

use invariant_gate_core::GateError;
use thiserror::Error;

/// Setup failures; any of these ends the process with exit code 2.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    pub const EXIT_CODE: i32 = 2;
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
