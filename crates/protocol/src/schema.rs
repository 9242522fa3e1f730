use crate::{
    BacklinkSyncReport, Blocker, BurndownReport, CacheClearReport, Dashboard, ErrorEnvelope,
    LinkAuditReport, NextIdReport, ScopeReport, ValidationReport, VelocityReport,
};
use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Names accepted by [`report_schema`]
pub const REPORT_SCHEMAS: &[&str] = &[
    "backlink_sync",
    "blocked",
    "burndown",
    "cache_clear",
    "dashboard",
    "error",
    "link_audit",
    "next_id",
    "scope",
    "validation",
    "velocity",
];

/// JSON Schema of one report shape
pub fn report_schema(name: &str) -> Option<Schema> {
    let schema = match name {
        "backlink_sync" => schema_for!(BacklinkSyncReport),
        "blocked" => schema_for!(Vec<Blocker>),
        "burndown" => schema_for!(BurndownReport),
        "cache_clear" => schema_for!(CacheClearReport),
        "dashboard" => schema_for!(Dashboard),
        "error" => schema_for!(ErrorEnvelope),
        "link_audit" => schema_for!(LinkAuditReport),
        "next_id" => schema_for!(NextIdReport),
        "scope" => schema_for!(ScopeReport),
        "validation" => schema_for!(ValidationReport),
        "velocity" => schema_for!(VelocityReport),
        _ => return None,
    };
    Some(schema)
}

/// Every report schema keyed by name
pub fn report_schemas() -> BTreeMap<&'static str, Schema> {
    REPORT_SCHEMAS
        .iter()
        .filter_map(|&name| report_schema(name).map(|schema| (name, schema)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_has_a_schema() {
        assert_eq!(report_schemas().len(), REPORT_SCHEMAS.len());
        assert!(report_schema("nonsense").is_none());
    }

    #[test]
    fn dashboard_schema_names_contract_fields() {
        let value = serde_json::to_value(report_schema("dashboard").unwrap()).unwrap();
        let properties = &value["properties"];
        for key in ["categories", "agents", "blockers", "velocity", "metrics", "burndown"] {
            assert!(properties.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn validation_schema_requires_severity_lists() {
        let value = serde_json::to_value(report_schema("validation").unwrap()).unwrap();
        let required: Vec<&str> = value["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for key in ["valid", "errors", "warnings", "info", "metrics"] {
            assert!(required.contains(&key), "{key} not required");
        }
    }
}
