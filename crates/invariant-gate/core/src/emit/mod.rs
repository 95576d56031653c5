//! Report emitters: JSON, SARIF 2.1.0 and a plain-text summary.

mod json;
mod sarif;
mod text;

pub use json::{from_json, to_json};
pub use sarif::{to_sarif, to_sarif_json, SarifLog};
pub use text::to_text;

use invariant_gate_types::Report;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// Rendering of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    Sarif,
    #[default]
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Sarif => "sarif",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Render `report` in `format`.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Sarif => to_sarif_json(report),
        OutputFormat::Text => Ok(to_text(report)),
    }
}
