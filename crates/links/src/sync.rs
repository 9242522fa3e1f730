use crate::error::{LinkError, Result};
use crate::paths::{display_relative, resolve_target};
use backlog_indexer::{parse_list, Item, ItemIndex};
use backlog_outline::{extract_links, set_property, LinkFragment, OutlineParser};
use backlog_protocol::{BacklinkSyncReport, BacklinkUpdate, UnresolvedArtifact};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Item property naming an external artifact
pub const ARTIFACT: &str = "ARTIFACT";
/// Back-reference property written into the artifact
pub const REFERENCED_BY: &str = "REFERENCED_BY";

/// Where inside the target document the back-reference goes
enum Anchor {
    File,
    Id(String),
    Title(String),
}

struct Target {
    path: PathBuf,
    written: String,
    anchor: Anchor,
}

fn parse_artifact(raw: &str) -> (String, Anchor) {
    if let Some(link) = extract_links(raw).into_iter().next() {
        let anchor = match link.fragment {
            Some(LinkFragment::Id(id)) => Anchor::Id(id),
            Some(LinkFragment::Heading(title)) => Anchor::Title(title),
            Some(LinkFragment::Other(_)) | None => Anchor::File,
        };
        return (link.path, anchor);
    }
    let raw = raw.trim();
    let raw = raw.strip_prefix("file:").unwrap_or(raw);
    match raw.split_once("::#") {
        Some((path, id)) => (path.to_string(), Anchor::Id(id.to_string())),
        None => (raw.to_string(), Anchor::File),
    }
}

fn target_of(index: &ItemIndex, item: &Item, raw: &str) -> Target {
    let (written, anchor) = parse_artifact(raw);
    let path = resolve_target(&index.absolute(&item.file), &written);
    Target {
        path,
        written,
        anchor,
    }
}

/// Append each item's id to its artifact's `REFERENCED_BY`.
///
/// Targets are patched in memory first and written once per file; with
/// `dry_run` nothing is written.
pub fn sync_backlinks(index: &ItemIndex, dry_run: bool) -> Result<BacklinkSyncReport> {
    let root = index.root();
    let parser = OutlineParser::default();
    let mut pending: BTreeMap<PathBuf, (String, bool)> = BTreeMap::new();
    let mut report = BacklinkSyncReport {
        dry_run,
        updated: Vec::new(),
        already_present: 0,
        unresolved: Vec::new(),
        files_written: Vec::new(),
    };

    for item in index.items().iter().filter(|item| !item.id.is_empty()) {
        let Some(raw) = item.properties.get(ARTIFACT) else {
            continue;
        };
        let target = target_of(index, item, raw);
        let unresolved = |reason: String| UnresolvedArtifact {
            item_id: item.id.clone(),
            file: item.file.clone(),
            line: item.line,
            target: target.written.clone(),
            reason,
        };

        if !pending.contains_key(&target.path) {
            if !target.path.is_file() {
                report
                    .unresolved
                    .push(unresolved(format!("{} does not exist", display_relative(root, &target.path))));
                continue;
            }
            let text = std::fs::read_to_string(&target.path)?;
            pending.insert(target.path.clone(), (text, false));
        }
        let Some((text, dirty)) = pending.get_mut(&target.path) else {
            continue;
        };

        let doc = parser.parse_str(text, &target.path.to_string_lossy());
        let (heading_line, existing) = match &target.anchor {
            Anchor::File => (None, doc.properties.get(REFERENCED_BY)),
            Anchor::Id(id) => match doc.heading_by_id(id) {
                Some(h) => (Some(h.line), h.properties.get(REFERENCED_BY)),
                None => {
                    report.unresolved.push(unresolved(format!("no heading with id {id:?}")));
                    continue;
                }
            },
            Anchor::Title(title) => match doc.heading_by_title(title) {
                Some(h) => (Some(h.line), h.properties.get(REFERENCED_BY)),
                None => {
                    report.unresolved.push(unresolved(format!("no heading titled {title:?}")));
                    continue;
                }
            },
        };

        let mut refs = parse_list(existing);
        if refs.iter().any(|r| r == &item.id) {
            report.already_present += 1;
            continue;
        }
        refs.push(item.id.clone());
        *text = set_property(text, heading_line, REFERENCED_BY, &refs.join(", "))?;
        *dirty = true;

        log::debug!(
            "{} -> {}{}",
            item.id,
            display_relative(root, &target.path),
            heading_line.map(|l| format!(":{l}")).unwrap_or_default()
        );
        report.updated.push(BacklinkUpdate {
            item_id: item.id.clone(),
            target_file: display_relative(root, &target.path),
            heading_line,
        });
    }

    for (path, (text, dirty)) in pending {
        if !dirty {
            continue;
        }
        if !dry_run {
            std::fs::write(&path, text).map_err(|source| LinkError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        }
        report.files_written.push(display_relative(root, &path));
    }

    log::info!(
        "Backlinks: {} added, {} already present, {} unresolved{}",
        report.updated.len(),
        report.already_present,
        report.unresolved.len(),
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(report)
}
