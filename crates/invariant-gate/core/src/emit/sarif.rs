//! SARIF 2.1.0 log for code-scanning dashboards.
//!
//! Every invariant plus `SYSTEM` is published as a static rule; each
//! violation becomes one result pointing at its file and line.

use invariant_gate_types::{InvariantId, Report, Severity, Violation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
pub const SARIF_VERSION: &str = "2.1.0";
pub const TOOL_NAME: &str = "PROACTIVE Constitutional Validator";
pub const TOOL_INFORMATION_URI: &str = "https://github.com/proactive-toolkit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarifText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifText,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
}

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn rules() -> Vec<SarifRule> {
    InvariantId::all()
        .map(|id| {
            let descriptor = id.descriptor();
            SarifRule {
                id: id.to_string(),
                name: descriptor.name.to_string(),
                short_description: SarifText {
                    text: descriptor.description.to_string(),
                },
            }
        })
        .collect()
}

fn result(violation: &Violation) -> SarifResult {
    let location = violation.location();
    SarifResult {
        rule_id: violation.invariant().to_string(),
        level: level(violation.severity()).to_string(),
        message: SarifText {
            text: violation.message().to_string(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: location.file.clone(),
                },
                region: SarifRegion {
                    start_line: location.line.unwrap_or(1),
                },
            },
        }],
    }
}

pub fn to_sarif(report: &Report) -> SarifLog {
    SarifLog {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: report.validator_version.clone(),
                    information_uri: TOOL_INFORMATION_URI.to_string(),
                    rules: rules(),
                },
            },
            results: report.violations.iter().map(result).collect(),
        }],
    }
}

pub fn to_sarif_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_sarif(report))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::report::build_report;
    use invariant_gate_types::{Location, ValidationResult};

    fn sample() -> Report {
        let violations = vec![
            Violation::new(
                "V-AAAA",
                InvariantId::I1,
                Severity::Error,
                Location::at_line("out/a.md", 7),
                "I1 Violation: Absolute claim without epistemic qualification",
            ),
            Violation::new(
                "V-BBBB",
                InvariantId::I3,
                Severity::Warning,
                Location::at_line("out/a.md", 2),
                "I3",
            ),
            Violation::new(
                "V-CCCC",
                InvariantId::System,
                Severity::Info,
                Location::file("gone.json"),
                "note",
            ),
        ];
        build_report(
            &[ValidationResult::new("out/a.md", violations)],
            &GateConfig::default(),
            None,
            None,
        )
    }

    #[test]
    fn sarif_shape() {
        let value = serde_json::to_value(to_sarif(&sample())).unwrap();
        assert_eq!(value["$schema"], SARIF_SCHEMA);
        assert_eq!(value["version"], "2.1.0");
        let driver = &value["runs"][0]["tool"]["driver"];
        assert_eq!(driver["name"], TOOL_NAME);
        assert_eq!(driver["version"], "1.0.0");
        assert_eq!(driver["informationUri"], TOOL_INFORMATION_URI);
        assert_eq!(driver["rules"].as_array().unwrap().len(), 7);
        assert_eq!(driver["rules"][6]["id"], "SYSTEM");
        assert_eq!(driver["rules"][0]["shortDescription"]["text"], InvariantId::I1.descriptor().description);
    }

    #[test]
    fn results_map_levels_and_lines() {
        let log = to_sarif(&sample());
        let results = &log.runs[0].results;
        let levels: Vec<_> = results.iter().map(|r| r.level.as_str()).collect();
        assert_eq!(levels, vec!["error", "warning", "note"]);
        assert_eq!(results[0].rule_id, "I1");
        assert_eq!(results[0].locations[0].physical_location.region.start_line, 7);
        assert_eq!(results[2].locations[0].physical_location.region.start_line, 1);
        assert_eq!(
            results[2].locations[0].physical_location.artifact_location.uri,
            "gone.json"
        );
    }
}
