//! # Backlog Analytics
//!
//! Aggregates over a built [`ItemIndex`](backlog_indexer::ItemIndex):
//! status tallies, category/checkpoint progress, agent workload, blockers,
//! time-windowed velocity with trend, and burndown projection.
//!
//! Every function is pure: the index and a reference time in, a report out.

mod blockers;
mod burndown;
mod dashboard;
mod metrics;
mod velocity;

#[cfg(test)]
mod fixtures;

pub use blockers::blockers;
pub use burndown::burndown;
pub use dashboard::generate_dashboard;
pub use metrics::{agent_workload, category_progress, status_metrics, UNASSIGNED};
pub use velocity::{classify_trend, completed_between, velocity};
