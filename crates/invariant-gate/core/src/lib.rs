//! # invariant-gate-core
//!
//! Policy-compliance engine that scans model outputs, decision logs and
//! claim files for breaches of the six constitutional invariants and turns
//! the findings into a pass/fail gate.
//!
//! ## Pipeline
//!
//! 1. [`ConfigStore`] loads the YAML policy once (embedded defaults on any
//!    failure).
//! 2. [`discovery::discover`] walks the target and applies include/exclude
//!    globs.
//! 3. [`Validator`] runs the checker suite (I1→I6) over every file.
//! 4. [`build_report`] aggregates results and decides the gate.
//! 5. [`emit::render`] produces JSON, SARIF 2.1.0 or a text summary.
//!
//! ## Failure model
//!
//! The engine fails closed. A missing target, an unreadable file or a
//! directory entry the walk cannot read becomes a `SYSTEM`/`ERROR`
//! violation, so the gate can never pass over input it did not evaluate.
//! An invalid pattern in the policy is skipped with a warning; the rest of
//! the suite still runs.

#![deny(unsafe_code)]

pub mod checks;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod git;
pub mod patterns;
pub mod report;
pub mod trace_log;
pub mod validator;

pub use checks::{standard_suite, Document, InvariantCheck};
pub use config::{ConfigStore, GateConfig, GatePolicy, DEFAULT_CONFIG_PATH};
pub use discovery::{discover, Discovery, TargetFilter};
pub use emit::{render, OutputFormat};
pub use error::{GateError, Result};
pub use git::GitMetadata;
pub use report::{build_report, evaluate_gate};
pub use validator::Validator;

pub use invariant_gate_types as types;
