use crate::error::{LinkError, Result};
use crate::paths::{display_relative, resolve_target};
use backlog_indexer::{BacklogConfig, FileScanner};
use backlog_outline::extract_links;
use backlog_protocol::{BrokenLink, LinkAuditReport};
use std::path::Path;

/// Check every `[[file:...]]` link in every document under `root`
pub fn audit_links(root: &Path, config: &BacklogConfig) -> Result<LinkAuditReport> {
    if !root.is_dir() {
        return Err(LinkError::MissingRoot(root.to_path_buf()));
    }

    let mut report = LinkAuditReport {
        files_scanned: 0,
        links_checked: 0,
        broken: Vec::new(),
    };

    for path in FileScanner::new(root, config.extension.as_str()).scan() {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Skipping {}: {err}", path.display());
                continue;
            }
        };
        report.files_scanned += 1;

        for link in extract_links(&text) {
            report.links_checked += 1;
            let resolved = resolve_target(&path, &link.path);
            if !resolved.exists() {
                log::debug!("{}:{} broken link {}", path.display(), link.line, link.path);
                report.broken.push(BrokenLink {
                    file: display_relative(root, &path),
                    line: link.line,
                    target: link.path,
                    resolved: display_relative(root, &resolved),
                });
            }
        }
    }

    log::info!(
        "Checked {} links in {} files: {} broken",
        report.links_checked,
        report.files_scanned,
        report.broken.len()
    );
    Ok(report)
}
