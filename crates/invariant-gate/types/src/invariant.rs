use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a constitutional invariant, or `SYSTEM` for input failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvariantId {
    I1,
    I2,
    I3,
    I4,
    I5,
    I6,
    #[serde(rename = "SYSTEM")]
    System,
}

impl InvariantId {
    /// The six checkable invariants, in evaluation order.
    pub const CHECKED: [InvariantId; 6] = [
        InvariantId::I1,
        InvariantId::I2,
        InvariantId::I3,
        InvariantId::I4,
        InvariantId::I5,
        InvariantId::I6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvariantId::I1 => "I1",
            InvariantId::I2 => "I2",
            InvariantId::I3 => "I3",
            InvariantId::I4 => "I4",
            InvariantId::I5 => "I5",
            InvariantId::I6 => "I6",
            InvariantId::System => "SYSTEM",
        }
    }

    /// Static name and description for this invariant.
    pub fn descriptor(&self) -> InvariantDescriptor {
        let (name, description) = match self {
            InvariantId::I1 => (
                "Evidence-First Outputs",
                "Every claim must carry an epistemic tag and supporting evidence",
            ),
            InvariantId::I2 => (
                "No Phantom Work",
                "Cannot claim work is complete unless artifact exists",
            ),
            InvariantId::I3 => (
                "Confidence Requires Verification",
                "High confidence requires verification artifacts",
            ),
            InvariantId::I4 => (
                "Traceability Is Mandatory",
                "Every decision must be traceable through REQ → CTRL → TEST → EVID → DECISION",
            ),
            InvariantId::I5 => (
                "Safety Over Fluency",
                "Bounded statements preferred over fluent-but-wrong",
            ),
            InvariantId::I6 => (
                "Fail Closed",
                "Stop and surface failures; do not work around",
            ),
            InvariantId::System => ("System Error", "Validator system error"),
        };
        InvariantDescriptor {
            id: *self,
            name,
            description,
        }
    }

    /// Every identifier including `SYSTEM`.
    pub fn all() -> impl Iterator<Item = InvariantId> {
        Self::CHECKED
            .into_iter()
            .chain(std::iter::once(InvariantId::System))
    }
}

impl fmt::Display for InvariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing name and description of an invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InvariantDescriptor {
    pub id: InvariantId,
    pub name: &'static str,
    pub description: &'static str,
}
