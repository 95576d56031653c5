//! # invariant-gate-types
//!
//! Data model shared by the invariant gate engine and its front ends.
//!
//! - [`Violation`]: one detected breach of a constitutional invariant
//! - [`ValidationResult`]: all violations found in one file
//! - [`Report`]: per-run aggregate with summary counts and the gate decision
//!
//! ## Invariants
//!
//! | Id | Name |
//! |----|------|
//! | I1 | Evidence-First Outputs |
//! | I2 | No Phantom Work |
//! | I3 | Confidence Requires Verification |
//! | I4 | Traceability Is Mandatory |
//! | I5 | Safety Over Fluency |
//! | I6 | Fail Closed |
//!
//! `SYSTEM` is reserved for input failures (missing or unreadable targets).

#![deny(unsafe_code)]

pub mod invariant;
pub mod report;
pub mod result;
pub mod violation;

pub use invariant::{InvariantDescriptor, InvariantId};
pub use report::{ConfigUsed, GateResult, GitContext, Report, Summary};
pub use result::ValidationResult;
pub use violation::{Evidence, Location, Severity, Violation};
