//! Per-entity checks. Each pushes zero or more findings.

use backlog_indexer::{
    AgentRegistry, BacklogConfig, Category, Checkpoint, IdPatterns, IndexedDocument, Item,
    ItemIndex,
};
use backlog_protocol::{Finding, FindingDetail};

pub const REQUIRED_PROPERTIES: &str = "required-properties";
pub const ID_FORMAT: &str = "id-format";
pub const VALID_AGENT: &str = "valid-agent";
pub const EFFORT_FORMAT: &str = "effort-format";
pub const VALID_DEPENDS: &str = "valid-depends";
pub const VALID_BLOCKS: &str = "valid-blocks";
pub const TEST_PLAN: &str = "test-plan";
pub const COMPONENT_REF: &str = "component-ref";
pub const CHECKPOINT_REQUIRED_PROPERTIES: &str = "checkpoint-required-properties";
pub const CHECKPOINT_ID_FORMAT: &str = "checkpoint-id-format";
pub const CHECKPOINT_DEPTH: &str = "checkpoint-depth";
pub const CHECKPOINT_PARENT: &str = "checkpoint-parent";
pub const CATEGORY_REQUIRED_PROPERTIES: &str = "category-required-properties";
pub const CATEGORY_ID_FORMAT: &str = "category-id-format";
pub const CATEGORY_DEPENDS: &str = "category-depends";
pub const UNIQUE_ID: &str = "unique-id";
pub const DEPENDENCY_CYCLE: &str = "dependency-cycle";
pub const PARSE: &str = "parse";

const TEST_PLAN_KEY: &str = "TEST_PLAN";
const COMPONENT_KEY: &str = "COMPONENT";
const CHECKPOINT_KEYS: &[&str] = &["CRITERIA", "VERIFY"];

/// Read-only view shared by every rule in one run
pub struct RuleContext<'a> {
    pub index: &'a ItemIndex,
    pub agents: &'a AgentRegistry,
    pub config: &'a BacklogConfig,
    pub patterns: &'a IdPatterns,
}

fn label(item: &Item) -> &str {
    if item.id.is_empty() {
        item.title.as_str()
    } else {
        item.id.as_str()
    }
}

pub fn check_item(ctx: &RuleContext<'_>, item: &Item, out: &mut Vec<Finding>) {
    let at = |rule: &str, message: String| FindingDetail::new(&item.file, item.line, rule, message);
    let who = label(item);

    for key in &ctx.config.required_properties {
        let present = if key.eq_ignore_ascii_case("ID") {
            !item.id.is_empty()
        } else {
            item.properties.contains_key(key)
        };
        if !present {
            out.push(Finding::Error(
                at(REQUIRED_PROPERTIES, format!("{who}: missing required property {key}"))
                    .hint(format!("add :{key}: to the item's property drawer"))
                    .context(key.as_str()),
            ));
        }
    }

    if !item.id.is_empty() && !IdPatterns::is_item_id(&item.id) {
        out.push(Finding::Warning(
            at(ID_FORMAT, format!("item id {:?} does not match ITEM-<digits>[-slug]", item.id))
                .hint("use ITEM-123 or ITEM-123-short-slug")
                .context(item.id.as_str()),
        ));
    }

    if let Some(agent) = item.agent.as_deref() {
        if !ctx.agents.contains(agent) {
            out.push(Finding::Error(
                at(VALID_AGENT, format!("{who}: unknown agent {agent:?}"))
                    .hint(format!(
                        "define the agent in {}/ or reference an existing name[:section]",
                        ctx.config.agents_dir
                    ))
                    .context(agent),
            ));
        }
    }

    if let Some(effort) = item.effort.as_deref() {
        if !IdPatterns::is_effort(effort) {
            out.push(Finding::Warning(
                at(EFFORT_FORMAT, format!("{who}: effort {effort:?} is not <digits>h or <digits>m"))
                    .hint("write effort as e.g. 2h or 30m")
                    .context(effort),
            ));
        }
    }

    for dep in &item.depends {
        if ctx.index.resolve(dep).is_none() {
            out.push(Finding::Error(
                at(VALID_DEPENDS, format!("{who}: dependency {dep:?} not found"))
                    .hint("reference an existing item id, or CATEGORY-ID:ITEM-ID across categories")
                    .context(dep.as_str()),
            ));
        }
    }

    for blocked in &item.blocks {
        if ctx.index.resolve(blocked).is_none() {
            out.push(Finding::Warning(
                at(VALID_BLOCKS, format!("{who}: blocked item {blocked:?} not found"))
                    .context(blocked.as_str()),
            ));
        }
    }

    if !item.properties.contains_key(TEST_PLAN_KEY) {
        out.push(Finding::Warning(
            at(TEST_PLAN, format!("{who}: no test plan"))
                .hint(format!("add :{TEST_PLAN_KEY}: describing how the work is verified")),
        ));
    }

    if !item.properties.contains_key(COMPONENT_KEY) {
        out.push(Finding::Info(
            at(COMPONENT_REF, format!("{who}: no component reference"))
                .hint(format!("add :{COMPONENT_KEY}: naming the affected component")),
        ));
    }
}

pub fn check_checkpoint(ctx: &RuleContext<'_>, chk: &Checkpoint, out: &mut Vec<Finding>) {
    let at = |rule: &str, message: String| FindingDetail::new(&chk.file, chk.line, rule, message);
    let who = if chk.id.is_empty() { chk.title.as_str() } else { chk.id.as_str() };

    if chk.id.is_empty() {
        out.push(Finding::Warning(
            at(CHECKPOINT_REQUIRED_PROPERTIES, format!("checkpoint {who:?} has no id"))
                .hint("add :ID: CHK-<category>-<seq>")
                .context("ID"),
        ));
    }
    for key in CHECKPOINT_KEYS {
        if !chk.properties.contains_key(key) {
            out.push(Finding::Warning(
                at(CHECKPOINT_REQUIRED_PROPERTIES, format!("{who}: missing {key}"))
                    .hint(format!("add :{key}: to the checkpoint"))
                    .context(*key),
            ));
        }
    }

    if !chk.id.is_empty() && !IdPatterns::is_checkpoint_id(&chk.id) {
        out.push(Finding::Warning(
            at(CHECKPOINT_ID_FORMAT, format!("checkpoint id {:?} does not match CHK-NNN-NN", chk.id))
                .hint("use CHK-<3+ digit category number>-<2+ digit sequence>[-slug]")
                .context(chk.id.as_str()),
        ));
    }

    if chk.level != ctx.config.checkpoint_depth {
        out.push(Finding::Warning(
            at(
                CHECKPOINT_DEPTH,
                format!(
                    "{who}: checkpoint at heading depth {} (expected {})",
                    chk.level, ctx.config.checkpoint_depth
                ),
            )
            .hint("nest checkpoints directly under their category"),
        ));
    }

    if let Some(parent) = chk.parent_number {
        let has_parent = ctx
            .index
            .categories()
            .iter()
            .filter_map(|c| c.id.rsplit_once('-'))
            .any(|(_, n)| n.parse::<u64>().ok() == Some(parent));
        if !has_parent {
            out.push(Finding::Info(
                at(CHECKPOINT_PARENT, format!("{who}: no category numbered {parent}"))
                    .context(chk.id.as_str()),
            ));
        }
    }
}

pub fn check_category(ctx: &RuleContext<'_>, category: &Category, out: &mut Vec<Finding>) {
    let at = |rule: &str, message: String| {
        FindingDetail::new(&category.file, category.line, rule, message)
    };

    if category.goal.is_none() {
        out.push(Finding::Warning(
            at(CATEGORY_REQUIRED_PROPERTIES, format!("{}: missing GOAL", category.id))
                .hint("add :GOAL: to the category")
                .context("GOAL"),
        ));
    }

    if let Some(declared) = category.declared_id.as_deref() {
        if declared != category.id || !ctx.patterns.is_category_id(declared) {
            out.push(Finding::Warning(
                at(
                    CATEGORY_ID_FORMAT,
                    format!("ID {declared:?} disagrees with heading id {:?}", category.id),
                )
                .context(declared),
            ));
        }
    }

    for dep in &category.depends {
        if ctx.index.category(dep).is_none() {
            out.push(Finding::Error(
                at(CATEGORY_DEPENDS, format!("{}: category dependency {dep:?} not found", category.id))
                    .context(dep.as_str()),
            ));
        }
    }
}

/// Every repeat of an id after its first occurrence
pub fn check_duplicates(ctx: &RuleContext<'_>, keep: impl Fn(&str) -> bool, out: &mut Vec<Finding>) {
    for dup in ctx.index.duplicates().filter(|d| keep(&d.file)) {
        let first = ctx
            .index
            .item(&dup.id)
            .map(|f| format!("{}:{}", f.file, f.line))
            .unwrap_or_default();
        out.push(Finding::Error(
            FindingDetail::new(
                &dup.file,
                dup.line,
                UNIQUE_ID,
                format!("item id {} already defined at {first}", dup.id),
            )
            .hint("renumber one of the items")
            .context(dup.id.as_str()),
        ));
    }
}

pub fn check_notes(doc: &IndexedDocument, out: &mut Vec<Finding>) {
    for note in &doc.notes {
        out.push(Finding::Info(FindingDetail::new(
            &doc.file,
            note.line,
            PARSE,
            note.message.clone(),
        )));
    }
}
