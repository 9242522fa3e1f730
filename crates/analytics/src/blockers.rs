use backlog_indexer::{Item, ItemIndex, Status};
use backlog_protocol::Blocker;

fn display_id(item: &Item) -> String {
    if item.id.is_empty() {
        format!("{}:{}", item.file, item.line)
    } else {
        item.id.clone()
    }
}

/// Open items that cannot proceed.
///
/// An item is blocked by its unfinished dependencies and by unfinished
/// items that list it under `BLOCKS`; an explicit `BLOCKED` status is
/// reported even when nothing names a cause.
pub fn blockers(index: &ItemIndex) -> Vec<Blocker> {
    let mut out = Vec::new();
    for item in index.items().iter().filter(|item| !item.status.is_done()) {
        let mut blocked_by: Vec<String> = Vec::new();
        let mut push = |id: String| {
            if !blocked_by.contains(&id) {
                blocked_by.push(id);
            }
        };

        for dep in &item.depends {
            if let Some(target) = index.resolve(dep) {
                if !target.status.is_done() {
                    push(display_id(target));
                }
            }
        }

        if !item.id.is_empty() {
            for other in index.items().iter().filter(|o| !o.status.is_done()) {
                let names_item = other
                    .blocks
                    .iter()
                    .filter_map(|b| index.resolve(b))
                    .any(|target| target.id == item.id);
                if names_item {
                    push(display_id(other));
                }
            }
        }

        if item.status == Status::Blocked || !blocked_by.is_empty() {
            out.push(Blocker {
                item_id: display_id(item),
                blocked_by,
            });
        }
    }
    log::debug!("{} blocked items", out.len());
    out
}
