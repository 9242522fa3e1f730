use super::domain::{
    parse_payload, CommandAction, CommandError, CommandOutcome, IdScope, NextIdPayload,
    SchemaPayload, ScopePayload, SyncBacklinksPayload, ValidateFilePayload, ValidatePayload, WindowPayload,
};
use super::Session;
use anyhow::{Context as AnyhowContext, Result};
use backlog_analytics::{blockers, burndown, generate_dashboard, velocity};
use backlog_indexer::{next_category_id, next_checkpoint_id, next_item_id};
use backlog_links::{audit_links, sync_backlinks};
use backlog_protocol::{
    report_schema, report_schemas, CacheClearReport, NextIdReport, ScopeReport, REPORT_SCHEMAS,
};
use backlog_validator::Validator;
use serde_json::Value;
use std::path::{Component, Path};

pub(super) fn route(
    session: &mut Session,
    action: CommandAction,
    payload: Value,
) -> Result<CommandOutcome> {
    match action {
        CommandAction::Validate => {
            let payload: ValidatePayload = parse_payload(action, payload)?;
            match payload.file {
                Some(file) => validate_file(session, &file),
                None => validate_all(session),
            }
        }
        CommandAction::ValidateFile => {
            let payload: ValidateFilePayload = parse_payload(action, payload)?;
            validate_file(session, &payload.file)
        }
        CommandAction::Dashboard => {
            let ctx = session.context()?;
            CommandOutcome::from_value(generate_dashboard(&ctx.snapshot.items, &ctx.config, ctx.now))
        }
        CommandAction::Blocked => {
            let ctx = session.context()?;
            CommandOutcome::from_value(blockers(&ctx.snapshot.items))
        }
        CommandAction::AuditLinks => {
            let config = session.config()?;
            let report = audit_links(session.root(), &config).context("Link audit failed")?;
            CommandOutcome::from_value(report)
        }
        CommandAction::SyncBacklinks => {
            let payload: SyncBacklinksPayload = parse_payload(action, payload)?;
            let ctx = session.context()?;
            let report = sync_backlinks(&ctx.snapshot.items, payload.dry_run)
                .context("Backlink sync failed")?;
            if !payload.dry_run && !report.files_written.is_empty() {
                session.invalidate();
            }
            CommandOutcome::from_value(report)
        }
        CommandAction::NextId => {
            let payload: NextIdPayload = parse_payload(action, payload)?;
            let scope = payload.scope()?;
            let ctx = session.context()?;
            let items = &ctx.snapshot.items;
            let report = match scope {
                IdScope::Category(prefix) => NextIdReport {
                    next_id: next_category_id(items, &ctx.config, &prefix)?,
                    scope: format!("category:{prefix}"),
                },
                IdScope::Item => NextIdReport {
                    next_id: next_item_id(items, &ctx.config)?,
                    scope: "item".to_string(),
                },
                IdScope::Checkpoint(category) => NextIdReport {
                    next_id: next_checkpoint_id(items, &ctx.config, &category)?,
                    scope: format!("checkpoint:{category}"),
                },
            };
            CommandOutcome::from_value(report)
        }
        CommandAction::Velocity => {
            let payload: WindowPayload = parse_payload(action, payload)?;
            let ctx = session.context()?;
            let days = window(action, payload.days, ctx.config.velocity_window_days)?;
            CommandOutcome::from_value(velocity(ctx.snapshot.items.items(), ctx.now, days))
        }
        CommandAction::Burndown => {
            let payload: WindowPayload = parse_payload(action, payload)?;
            let ctx = session.context()?;
            let days = window(action, payload.days, ctx.config.burndown_window_days)?;
            CommandOutcome::from_value(burndown(ctx.snapshot.items.items(), ctx.now, days))
        }
        CommandAction::ClearCaches => {
            let (agents_dropped, items_dropped) = session.invalidate();
            CommandOutcome::from_value(CacheClearReport {
                agents_dropped,
                items_dropped,
            })
        }
        CommandAction::Scope => {
            let payload: ScopePayload = parse_payload(action, payload)?;
            let ctx = session.context()?;
            let file = root_relative(session.root(), &payload.file);
            let scope = ctx
                .snapshot
                .items
                .scope_at(&file, payload.line)
                .ok_or_else(|| CommandError::NotFound(format!("{file} is not an indexed document")))?;
            CommandOutcome::from_value(ScopeReport {
                file,
                line: payload.line,
                category: scope.category.map(|entry| entry.id),
                checkpoint: scope.checkpoint.map(|entry| entry.id),
            })
        }
        CommandAction::Schema => {
            let payload: SchemaPayload = parse_payload(action, payload)?;
            match payload.report {
                Some(name) => {
                    let schema = report_schema(&name).ok_or_else(|| {
                        CommandError::NotFound(format!(
                            "unknown report {name:?}; expected one of {}",
                            REPORT_SCHEMAS.join(", ")
                        ))
                    })?;
                    CommandOutcome::from_value(schema)
                }
                None => CommandOutcome::from_value(report_schemas()),
            }
        }
    }
}

fn validate_all(session: &mut Session) -> Result<CommandOutcome> {
    let ctx = session.context()?;
    let validator = Validator::new(&ctx.snapshot, &ctx.config)?;
    CommandOutcome::from_value(validator.validate_all())
}

fn validate_file(session: &mut Session, file: &str) -> Result<CommandOutcome> {
    let ctx = session.context()?;
    let file = root_relative(session.root(), file);
    let validator = Validator::new(&ctx.snapshot, &ctx.config)?;
    let report = validator
        .validate_file(&file)
        .ok_or_else(|| CommandError::NotFound(format!("{file} is not an indexed document")))?;
    CommandOutcome::from_value(report)
}

fn window(action: CommandAction, requested: Option<u32>, default: u32) -> Result<u32> {
    match requested {
        Some(0) => Err(CommandError::InvalidRequest(format!(
            "{}: days must be > 0",
            action.as_str()
        ))
        .into()),
        Some(days) => Ok(days),
        None => Ok(default),
    }
}

/// Index key of a user-supplied path: absolute paths under the root are
/// stripped, relative ones are taken as root-relative; `.` and `..` are
/// resolved lexically
fn root_relative(root: &Path, file: &str) -> String {
    let path = Path::new(file);
    let canonical_root = path.is_absolute().then(|| root.canonicalize().ok()).flatten();
    let relative = if path.is_absolute() {
        path.strip_prefix(root)
            .ok()
            .or_else(|| canonical_root.as_deref().and_then(|r| path.strip_prefix(r).ok()))
            .unwrap_or(path)
    } else {
        path
    };
    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}
