use crate::blockers::blockers;
use crate::burndown::burndown;
use crate::metrics::{agent_workload, category_progress, status_metrics};
use crate::velocity::velocity;
use backlog_indexer::{BacklogConfig, ItemIndex};
use backlog_protocol::{Dashboard, VelocitySummary};
use chrono::NaiveDateTime;

/// Assemble the full dashboard snapshot as of `now`
pub fn generate_dashboard(index: &ItemIndex, config: &BacklogConfig, now: NaiveDateTime) -> Dashboard {
    let items = index.items();
    let velocity = velocity(items, now, config.velocity_window_days);
    let dashboard = Dashboard {
        generated_at: now.date().format("%Y-%m-%d").to_string(),
        metrics: status_metrics(items),
        categories: category_progress(index),
        agents: agent_workload(items),
        blockers: blockers(index),
        velocity: VelocitySummary {
            last_7_days: velocity.velocity,
            trend: velocity.trend,
        },
        burndown: burndown(items, now, config.burndown_window_days),
    };
    log::info!(
        "Dashboard: {} items, {} categories, {} blockers",
        dashboard.metrics.total_items,
        dashboard.categories.len(),
        dashboard.blockers.len()
    );
    dashboard
}
