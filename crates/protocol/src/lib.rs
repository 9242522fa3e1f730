use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod findings;
pub mod schema;

pub use findings::{Finding, FindingDetail, Severity};
pub use schema::{report_schema, report_schemas, REPORT_SCHEMAS};

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

/// Status tally over the item index
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct StatusMetrics {
    pub total_items: usize,
    pub complete: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub pending: usize,
}

/// Output of validate-one-file / validate-all
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub metrics: StatusMetrics,
}

impl ValidationReport {
    /// Split findings by severity; `valid` means no error-severity finding
    pub fn from_findings(findings: Vec<Finding>, metrics: StatusMetrics) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut info = Vec::new();
        for finding in findings {
            match finding.severity() {
                Severity::Error => errors.push(finding),
                Severity::Warning => warnings.push(finding),
                Severity::Info => info.push(finding),
            }
        }
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            info,
            metrics,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CheckpointProgress {
    pub id: String,
    pub title: String,
    pub total: usize,
    pub done: usize,
    pub progress: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CategoryProgress {
    pub id: String,
    pub title: String,
    pub goal: Option<String>,
    pub file: String,
    pub total: usize,
    pub done: usize,
    pub progress: f64,
    pub checkpoints: Vec<CheckpointProgress>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct AgentWorkload {
    pub assigned: usize,
    pub done: usize,
    pub in_progress: usize,
    pub effort_minutes: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct Blocker {
    pub item_id: String,
    pub blocked_by: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, JsonSchema)]
pub struct VelocitySummary {
    pub last_7_days: f64,
    pub trend: Trend,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct VelocityReport {
    pub window_days: u32,
    pub completed: usize,
    pub velocity: f64,
    pub earlier_velocity: f64,
    pub recent_velocity: f64,
    pub trend: Trend,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct BurndownReport {
    pub window_days: u32,
    pub remaining_minutes: u64,
    pub remaining_items: usize,
    pub unestimated_items: usize,
    pub completed_minutes_in_window: u64,
    pub daily_rate: f64,
    pub projected_days: Option<f64>,
    pub projected_completion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Dashboard {
    pub generated_at: String,
    pub metrics: StatusMetrics,
    pub categories: Vec<CategoryProgress>,
    pub agents: BTreeMap<String, AgentWorkload>,
    pub blockers: Vec<Blocker>,
    pub velocity: VelocitySummary,
    pub burndown: BurndownReport,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct BrokenLink {
    pub file: String,
    pub line: usize,
    pub target: String,
    pub resolved: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct LinkAuditReport {
    pub files_scanned: usize,
    pub links_checked: usize,
    pub broken: Vec<BrokenLink>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct BacklinkUpdate {
    pub item_id: String,
    pub target_file: String,
    /// Heading that received the back-reference; `None` for file level
    pub heading_line: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct UnresolvedArtifact {
    pub item_id: String,
    pub file: String,
    pub line: usize,
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct BacklinkSyncReport {
    pub dry_run: bool,
    pub updated: Vec<BacklinkUpdate>,
    pub already_present: usize,
    pub unresolved: Vec<UnresolvedArtifact>,
    pub files_written: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct NextIdReport {
    pub scope: String,
    pub next_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ScopeReport {
    pub file: String,
    pub line: usize,
    pub category: Option<String>,
    pub checkpoint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct CacheClearReport {
    pub agents_dropped: bool,
    pub items_dropped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn findings_serialize_flat_with_severity_tag() {
        let finding = Finding::Error(
            FindingDetail::new("projects/a.org", 4, "valid-depends", "unknown dependency")
                .context("ITEM-009"),
        );
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(
            value,
            json!({
                "severity": "error",
                "file": "projects/a.org",
                "line": 4,
                "rule": "valid-depends",
                "message": "unknown dependency",
                "context": "ITEM-009"
            })
        );
        let back: Finding = serde_json::from_value(value).unwrap();
        assert_eq!(back, finding);
    }

    #[test]
    fn report_is_valid_with_only_warnings_and_info() {
        let findings = vec![
            Finding::Warning(FindingDetail::new("a.org", 1, "test-plan", "no test plan")),
            Finding::Info(FindingDetail::new("a.org", 1, "component-ref", "no component")),
        ];
        let report = ValidationReport::from_findings(findings, StatusMetrics::default());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.info.len(), 1);
    }

    #[test]
    fn report_field_names_are_stable() {
        let report = ValidationReport::from_findings(
            vec![Finding::Error(FindingDetail::new("a.org", 2, "r", "m"))],
            StatusMetrics {
                total_items: 4,
                complete: 1,
                in_progress: 1,
                blocked: 1,
                pending: 1,
            },
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], json!(false));
        assert_eq!(value["metrics"]["total_items"], json!(4));
        assert_eq!(value["metrics"]["in_progress"], json!(1));
        for key in ["errors", "warnings", "info"] {
            assert!(value[key].is_array(), "missing {key}");
        }
    }

    #[test]
    fn trend_serializes_snake_case() {
        assert_eq!(serde_json::to_value(Trend::Increasing).unwrap(), json!("increasing"));
        assert_eq!(serde_json::to_value(Trend::Unknown).unwrap(), json!("unknown"));
    }
}
