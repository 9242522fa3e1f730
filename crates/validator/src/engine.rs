use crate::cycles::check_cycles;
use crate::rules::{
    check_category, check_checkpoint, check_duplicates, check_item, check_notes, RuleContext,
};
use backlog_analytics::status_metrics;
use backlog_indexer::{BacklogConfig, CacheSnapshot, IdPatterns, Result};
use backlog_protocol::{Finding, ValidationReport};

/// One validation run over a fixed snapshot
pub struct Validator<'a> {
    snapshot: &'a CacheSnapshot,
    config: &'a BacklogConfig,
    patterns: IdPatterns,
}

impl<'a> Validator<'a> {
    pub fn new(snapshot: &'a CacheSnapshot, config: &'a BacklogConfig) -> Result<Self> {
        Ok(Self {
            snapshot,
            config,
            patterns: IdPatterns::new(config)?,
        })
    }

    /// Validate every indexed document
    pub fn validate_all(&self) -> ValidationReport {
        let findings = self.findings(|_| true);
        let metrics = status_metrics(self.snapshot.items.items());
        log::info!("Validated {} items: {} findings", metrics.total_items, findings.len());
        ValidationReport::from_findings(findings, metrics)
    }

    /// Validate the entities of one root-relative file against the full
    /// index; `None` when the file is not indexed
    pub fn validate_file(&self, file: &str) -> Option<ValidationReport> {
        let doc = self.snapshot.items.document(file)?;
        let file = doc.file.as_str();
        let findings = self.findings(|f| f == file);
        let metrics = status_metrics(self.snapshot.items.items().iter().filter(|i| i.file == file));
        log::info!("Validated {file}: {} findings", findings.len());
        Some(ValidationReport::from_findings(findings, metrics))
    }

    /// Findings for entities whose file passes `keep`, sorted by
    /// (file, line, rule)
    pub fn findings(&self, keep: impl Fn(&str) -> bool) -> Vec<Finding> {
        let index = &*self.snapshot.items;
        let ctx = RuleContext {
            index,
            agents: &self.snapshot.agents,
            config: self.config,
            patterns: &self.patterns,
        };

        let mut out = Vec::new();
        for item in index.items().iter().filter(|i| keep(&i.file)) {
            check_item(&ctx, item, &mut out);
        }
        for chk in index.checkpoints().iter().filter(|c| keep(&c.file)) {
            check_checkpoint(&ctx, chk, &mut out);
        }
        for category in index.categories().iter().filter(|c| keep(&c.file)) {
            check_category(&ctx, category, &mut out);
        }
        for doc in index.documents().iter().filter(|d| keep(&d.file)) {
            check_notes(doc, &mut out);
        }
        check_duplicates(&ctx, &keep, &mut out);
        check_cycles(index, &keep, &mut out);

        out.sort_by(|a, b| {
            let (a, b) = (a.detail(), b.detail());
            (&a.file, a.line, &a.rule).cmp(&(&b.file, b.line, &b.rule))
        });
        out
    }
}
