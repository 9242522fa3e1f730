use backlog_indexer::{parse_effort, Item, ItemIndex, Status};
use backlog_protocol::{AgentWorkload, CategoryProgress, CheckpointProgress, StatusMetrics};
use std::collections::BTreeMap;

/// Workload bucket for items without an `AGENT`
pub const UNASSIGNED: &str = "unassigned";

/// Count items per status bucket
pub fn status_metrics<'a>(items: impl IntoIterator<Item = &'a Item>) -> StatusMetrics {
    let mut metrics = StatusMetrics::default();
    for item in items {
        metrics.total_items += 1;
        match item.status {
            Status::Done => metrics.complete += 1,
            Status::Doing | Status::Review => metrics.in_progress += 1,
            Status::Blocked => metrics.blocked += 1,
            Status::Pending => metrics.pending += 1,
        }
    }
    metrics
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64
    }
}

/// Progress of every category, with nested checkpoint progress
pub fn category_progress(index: &ItemIndex) -> Vec<CategoryProgress> {
    index
        .categories()
        .iter()
        .map(|category| {
            let in_category = |item: &&Item| {
                item.file == category.file
                    && item
                        .scope
                        .category
                        .as_ref()
                        .is_some_and(|c| c.line == category.line)
            };
            let items: Vec<&Item> = index.items().iter().filter(in_category).collect();
            let done = items.iter().filter(|i| i.status.is_done()).count();

            let checkpoints = index
                .checkpoints()
                .iter()
                .filter(|chk| {
                    chk.file == category.file
                        && index
                            .scope_at(&chk.file, chk.line)
                            .and_then(|scope| scope.category)
                            .is_some_and(|c| c.line == category.line)
                })
                .map(|chk| {
                    let scoped: Vec<&&Item> = items
                        .iter()
                        .filter(|item| {
                            item.scope
                                .checkpoint
                                .as_ref()
                                .is_some_and(|c| c.line == chk.line)
                        })
                        .collect();
                    let chk_done = scoped.iter().filter(|i| i.status.is_done()).count();
                    CheckpointProgress {
                        id: chk.id.clone(),
                        title: chk.title.clone(),
                        total: scoped.len(),
                        done: chk_done,
                        progress: fraction(chk_done, scoped.len()),
                    }
                })
                .collect();

            CategoryProgress {
                id: category.id.clone(),
                title: category.title.clone(),
                goal: category.goal.clone(),
                file: category.file.clone(),
                total: items.len(),
                done,
                progress: fraction(done, items.len()),
                checkpoints,
            }
        })
        .collect()
}

/// Agent name without the `@` marker
fn agent_key(item: &Item) -> String {
    item.agent
        .as_deref()
        .map(|a| a.trim().trim_start_matches('@'))
        .filter(|a| !a.is_empty())
        .unwrap_or(UNASSIGNED)
        .to_string()
}

/// Assigned/done/in-progress counts and effort per agent; each agent owns its counters
pub fn agent_workload<'a>(
    items: impl IntoIterator<Item = &'a Item>,
) -> BTreeMap<String, AgentWorkload> {
    let mut agents: BTreeMap<String, AgentWorkload> = BTreeMap::new();
    for item in items {
        let workload = agents.entry(agent_key(item)).or_default();
        workload.assigned += 1;
        if item.status.is_done() {
            workload.done += 1;
        }
        if item.status.is_in_progress() {
            workload.in_progress += 1;
        }
        if let Some(minutes) = item.effort.as_deref().and_then(parse_effort) {
            workload.effort_minutes = workload.effort_minutes.saturating_add(minutes);
        }
    }
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::index_of;
    use pretty_assertions::assert_eq;

    #[test]
    fn four_statuses_one_each() {
        let index = index_of(&[(
            "projects/a.org",
            "\
* PROJ-001 A
** TODO ITEM-001 pending
** DOING ITEM-002 doing
** DONE ITEM-003 done
** BLOCKED ITEM-004 blocked
",
        )]);
        assert_eq!(
            status_metrics(index.items()),
            StatusMetrics {
                total_items: 4,
                complete: 1,
                in_progress: 1,
                blocked: 1,
                pending: 1,
            }
        );
    }

    #[test]
    fn review_counts_as_in_progress() {
        let index = index_of(&[("projects/a.org", "* REVIEW ITEM-001 r\n")]);
        assert_eq!(status_metrics(index.items()).in_progress, 1);
    }

    #[test]
    fn category_and_checkpoint_progress() {
        let index = index_of(&[(
            "projects/a.org",
            "\
* PROJ-001 Parser
:PROPERTIES:
:GOAL: parse
:END:
** CHK-001-01 Lexer
*** DONE ITEM-001 a
*** TODO ITEM-002 b
** DONE ITEM-003 sibling of checkpoint
* PROJ-002 Empty
",
        )]);
        let progress = category_progress(&index);
        assert_eq!(progress.len(), 2);

        let parser = &progress[0];
        assert_eq!((parser.total, parser.done), (3, 2));
        assert!((parser.progress - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(parser.goal.as_deref(), Some("parse"));
        assert_eq!(parser.checkpoints.len(), 1);
        let lexer = &parser.checkpoints[0];
        assert_eq!((lexer.total, lexer.done), (2, 1));
        assert_eq!(lexer.progress, 0.5);

        let empty = &progress[1];
        assert_eq!((empty.total, empty.progress), (0, 0.0));
        assert!(empty.checkpoints.is_empty());
    }

    #[test]
    fn agents_are_counted_independently() {
        let index = index_of(&[(
            "projects/a.org",
            "\
* TODO ITEM-001 a
:PROPERTIES:
:AGENT: @alice
:EFFORT: 2h
:END:
* TODO ITEM-002 b
:PROPERTIES:
:AGENT: alice
:EFFORT: 30m
:END:
* DONE ITEM-003 c
:PROPERTIES:
:AGENT: bob
:END:
* TODO ITEM-004 d
",
        )]);
        let mut agents = agent_workload(index.items());
        assert_eq!(agents["alice"].assigned, 2);
        assert_eq!(agents["alice"].done, 0);
        assert_eq!(agents["alice"].effort_minutes, 150);
        assert_eq!(agents["bob"].assigned, 1);
        assert_eq!(agents["bob"].done, 1);
        assert_eq!(agents[UNASSIGNED].assigned, 1);

        if let Some(alice) = agents.get_mut("alice") {
            alice.assigned += 10;
            alice.done += 10;
        }
        assert_eq!(agents["bob"].assigned, 1);
        assert_eq!(agents["bob"].done, 1);
    }
}
