use backlog_protocol::{
    BacklinkSyncReport, Blocker, BurndownReport, CacheClearReport, Dashboard, LinkAuditReport,
    NextIdReport, ScopeReport, StatusMetrics, ValidationReport, VelocityReport,
};
use serde_json::Value;

pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    for finding in report
        .errors
        .iter()
        .chain(&report.warnings)
        .chain(&report.info)
    {
        out.push_str(&format!("{finding}\n"));
    }
    out.push_str(&format!(
        "{}: {} errors, {} warnings, {} info across {} items",
        if report.valid { "valid" } else { "INVALID" },
        report.errors.len(),
        report.warnings.len(),
        report.info.len(),
        report.metrics.total_items
    ));
    out
}

fn metrics_line(metrics: &StatusMetrics) -> String {
    format!(
        "{} items: {} done, {} in progress, {} blocked, {} pending",
        metrics.total_items, metrics.complete, metrics.in_progress, metrics.blocked, metrics.pending
    )
}

fn percent(progress: f64) -> String {
    format!("{:.0}%", progress * 100.0)
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&format!("Backlog dashboard ({})\n", dashboard.generated_at));
    out.push_str(&format!("{}\n", metrics_line(&dashboard.metrics)));

    if !dashboard.categories.is_empty() {
        out.push_str("\nCategories\n");
    }
    for category in &dashboard.categories {
        out.push_str(&format!(
            "  {:<10} {:>4} {}/{}  {}\n",
            category.id,
            percent(category.progress),
            category.done,
            category.total,
            category.title
        ));
        for chk in &category.checkpoints {
            out.push_str(&format!(
                "    {:<12} {:>4} {}/{}  {}\n",
                chk.id,
                percent(chk.progress),
                chk.done,
                chk.total,
                chk.title
            ));
        }
    }

    if !dashboard.agents.is_empty() {
        out.push_str("\nAgents\n");
    }
    for (agent, load) in &dashboard.agents {
        out.push_str(&format!(
            "  {:<16} {} assigned, {} done, {} in progress, {}m effort\n",
            agent, load.assigned, load.done, load.in_progress, load.effort_minutes
        ));
    }

    if !dashboard.blockers.is_empty() {
        out.push_str(&format!("\n{}", render_blockers(&dashboard.blockers)));
        out.push('\n');
    }

    out.push_str(&format!(
        "\nVelocity: {:.2} items/day ({:?})\n",
        dashboard.velocity.last_7_days, dashboard.velocity.trend
    ));
    out.push_str(&render_burndown(&dashboard.burndown));
    out
}

pub fn render_blockers(blockers: &[Blocker]) -> String {
    if blockers.is_empty() {
        return "No blocked items".to_string();
    }
    let mut out = format!("Blocked items ({})", blockers.len());
    for blocker in blockers {
        out.push_str(&format!(
            "\n  {} <- {}",
            blocker.item_id,
            blocker.blocked_by.join(", ")
        ));
    }
    out
}

pub fn render_link_audit(report: &LinkAuditReport) -> String {
    let mut out = String::new();
    for link in &report.broken {
        out.push_str(&format!(
            "{}:{}: broken link {} (resolved to {})\n",
            link.file, link.line, link.target, link.resolved
        ));
    }
    out.push_str(&format!(
        "{} links checked in {} files, {} broken",
        report.links_checked,
        report.files_scanned,
        report.broken.len()
    ));
    out
}

pub fn render_backlink_sync(report: &BacklinkSyncReport) -> String {
    let mut out = String::new();
    for update in &report.updated {
        match update.heading_line {
            Some(line) => out.push_str(&format!(
                "{} -> {}:{}\n",
                update.item_id, update.target_file, line
            )),
            None => out.push_str(&format!("{} -> {}\n", update.item_id, update.target_file)),
        }
    }
    for miss in &report.unresolved {
        out.push_str(&format!(
            "{}:{}: {} artifact {}: {}\n",
            miss.file, miss.line, miss.item_id, miss.target, miss.reason
        ));
    }
    out.push_str(&format!(
        "{} added, {} already present, {} unresolved",
        report.updated.len(),
        report.already_present,
        report.unresolved.len()
    ));
    if report.dry_run {
        out.push_str(&format!(
            " (dry run, {} files would change)",
            report.files_written.len()
        ));
    } else if !report.files_written.is_empty() {
        out.push_str(&format!("\nWrote {}", report.files_written.join(", ")));
    }
    out
}

pub fn render_next_id(report: &NextIdReport) -> String {
    report.next_id.clone()
}

pub fn render_velocity(report: &VelocityReport) -> String {
    format!(
        "{} completed in the last {} days: {:.2} items/day\nTrend: {:?} ({:.2} -> {:.2})",
        report.completed,
        report.window_days,
        report.velocity,
        report.trend,
        report.earlier_velocity,
        report.recent_velocity
    )
}

pub fn render_burndown(report: &BurndownReport) -> String {
    let mut out = format!(
        "Remaining: {} items, {}m estimated ({} unestimated)\nRate: {:.1}m/day over {} days",
        report.remaining_items,
        report.remaining_minutes,
        report.unestimated_items,
        report.daily_rate,
        report.window_days
    );
    match (&report.projected_days, &report.projected_completion) {
        (Some(days), Some(date)) => {
            out.push_str(&format!("\nProjected completion: {date} ({days:.1} days)"))
        }
        _ => out.push_str("\nProjected completion: unknown"),
    }
    out
}

pub fn render_cache_clear(report: &CacheClearReport) -> String {
    format!(
        "Caches cleared (agents: {}, items: {})",
        if report.agents_dropped { "dropped" } else { "not built" },
        if report.items_dropped { "dropped" } else { "not built" }
    )
}

pub fn render_scope(report: &ScopeReport) -> String {
    format!(
        "{}:{}: category {}, checkpoint {}",
        report.file,
        report.line,
        report.category.as_deref().unwrap_or("-"),
        report.checkpoint.as_deref().unwrap_or("-")
    )
}

/// Schemas are JSON either way
pub fn render_schema(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_protocol::{Finding, FindingDetail};

    #[test]
    fn validation_summary_lists_findings_first() {
        let report = ValidationReport::from_findings(
            vec![
                Finding::Warning(FindingDetail::new("a.org", 3, "test-plan", "no test plan")),
                Finding::Error(FindingDetail::new("a.org", 2, "valid-agent", "unknown agent")),
            ],
            StatusMetrics {
                total_items: 2,
                ..Default::default()
            },
        );
        let text = render_validation(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "a.org:2: error [valid-agent] unknown agent");
        assert_eq!(lines[1], "a.org:3: warning [test-plan] no test plan");
        assert_eq!(lines[2], "INVALID: 1 errors, 1 warnings, 0 info across 2 items");
    }

    #[test]
    fn empty_blocker_list_says_so() {
        assert_eq!(render_blockers(&[]), "No blocked items");
        let text = render_blockers(&[Blocker {
            item_id: "ITEM-002".to_string(),
            blocked_by: vec!["ITEM-001".to_string()],
        }]);
        assert_eq!(text, "Blocked items (1)\n  ITEM-002 <- ITEM-001");
    }
}
