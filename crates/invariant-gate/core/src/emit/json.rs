use invariant_gate_types::Report;

use crate::error::Result;

/// Pretty-printed JSON; absent optional fields are omitted.
pub fn to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn from_json(json: &str) -> Result<Report> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::report::build_report;
    use invariant_gate_types::{InvariantId, Location, Severity, ValidationResult, Violation};

    #[test]
    fn optional_fields_are_omitted() {
        let results = vec![ValidationResult::new(
            "a.json",
            vec![Violation::new(
                "V-0001",
                InvariantId::System,
                Severity::Error,
                Location::file("a.json"),
                "File not found: a.json",
            )],
        )];
        let report = build_report(&results, &GateConfig::default(), None, None);
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let v = &value["violations"][0];
        assert_eq!(v["id"], "V-0001");
        assert_eq!(v["invariant"], "SYSTEM");
        assert!(v.get("suggested_fix").is_none());
        assert!(v.get("evidence").is_none());
        assert!(v["location"].get("line").is_none());
        assert!(value["summary"].get("execution_time_ms").is_none());

        let back = from_json(&json).unwrap();
        assert_eq!(back.summary, report.summary);
        assert_eq!(back.violations.len(), 1);
    }
}
