use crate::config::BacklogConfig;
use crate::entities::{Category, Checkpoint, EntityBuilder, Item};
use crate::error::{IndexerError, Result};
use crate::scanner::FileScanner;
use crate::stats::IndexStats;
use backlog_graph::{split_qualified, Scope, ScopeMap};
use backlog_outline::{OutlineParser, ParseNote};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Per-document data kept for position queries
#[derive(Debug, Clone, Default)]
pub struct IndexedDocument {
    /// Root-relative, `/`-separated
    pub file: String,
    pub scopes: ScopeMap,
    pub notes: Vec<ParseNote>,
}

/// Entities of every document in the configured task directories
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    root: PathBuf,
    items: Vec<Item>,
    by_id: HashMap<String, usize>,
    duplicates: Vec<usize>,
    categories: Vec<Category>,
    checkpoints: Vec<Checkpoint>,
    documents: Vec<IndexedDocument>,
    stats: IndexStats,
}

impl ItemIndex {
    /// Scan the task directories under `root`
    pub fn build(root: &Path, config: &BacklogConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(IndexerError::MissingRoot(root.to_path_buf()));
        }
        let start = Instant::now();
        let builder = EntityBuilder::new(config)?;
        let parser = OutlineParser::default();
        let mut index = Self {
            root: root.to_path_buf(),
            ..Default::default()
        };

        for dir in &config.task_dirs {
            for path in FileScanner::new(root.join(dir), config.extension.as_str()).scan() {
                let file = relative_path(root, &path);
                let doc = match parser.parse_file(&path) {
                    Ok(doc) => doc,
                    Err(err) => {
                        log::warn!("Skipping {file}: {err}");
                        index.stats.add_error(format!("{file}: {err}"));
                        continue;
                    }
                };
                index.add(builder.build(&doc, &file));
            }
        }

        index.stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} files: {} items, {} categories, {} checkpoints in {} ms",
            index.stats.files,
            index.stats.items,
            index.stats.categories,
            index.stats.checkpoints,
            index.stats.time_ms
        );
        Ok(index)
    }

    /// Merge one document's entities; ids keep their first occurrence
    pub fn add(&mut self, entities: crate::entities::DocumentEntities) {
        self.stats.add_document(
            entities.items.len(),
            entities.categories.len(),
            entities.checkpoints.len(),
            entities.notes.len(),
        );
        for item in entities.items {
            let pos = self.items.len();
            if !item.id.is_empty() {
                if self.by_id.contains_key(&item.id) {
                    self.duplicates.push(pos);
                } else {
                    self.by_id.insert(item.id.clone(), pos);
                }
            }
            self.items.push(item);
        }
        self.categories.extend(entities.categories);
        self.checkpoints.extend(entities.checkpoints);
        self.documents.push(IndexedDocument {
            file: entities.file,
            scopes: entities.scopes,
            notes: entities.notes,
        });
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    /// Resolve a dependency reference, direct or `CATEGORY:ITEM`
    pub fn resolve(&self, reference: &str) -> Option<&Item> {
        let reference = reference.trim();
        self.item(reference)
            .or_else(|| self.item(split_qualified(reference).1))
    }

    /// Items whose id was already taken by an earlier item
    pub fn duplicates(&self) -> impl Iterator<Item = &Item> {
        self.duplicates.iter().map(|&pos| &self.items[pos])
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    pub fn document(&self, file: &str) -> Option<&IndexedDocument> {
        let file = normalize(file);
        self.documents.iter().find(|d| d.file == file)
    }

    /// Enclosing category/checkpoint of a position; `None` for unindexed files
    pub fn scope_at(&self, file: &str, line: usize) -> Option<Scope> {
        self.document(file).map(|doc| doc.scopes.resolve(line))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Absolute path of an indexed file
    pub fn absolute(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize(&relative.to_string_lossy())
}

fn normalize(file: &str) -> String {
    let file = file.replace('\\', "/");
    file.strip_prefix("./").map(str::to_string).unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn tree() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let projects = temp.path().join("projects");
        let bugs = temp.path().join("bugs");
        fs::create_dir_all(&projects).unwrap();
        fs::create_dir_all(&bugs).unwrap();
        fs::write(
            projects.join("parser.org"),
            "* PROJ-001 Parser\n** TODO ITEM-001 Lex\n** TODO ITEM-002 Parse\n",
        )
        .unwrap();
        fs::write(bugs.join("crash.org"), "* BUG-001 Crash\n** TODO ITEM-001 Again\n").unwrap();
        temp
    }

    #[test]
    fn indexes_task_dirs() {
        let temp = tree();
        let index = ItemIndex::build(temp.path(), &BacklogConfig::default()).unwrap();
        assert_eq!(index.item_count(), 3);
        assert_eq!(index.categories().len(), 2);
        assert_eq!(index.stats().files, 2);
        assert_eq!(
            index.item("ITEM-002").map(|i| i.file.as_str()),
            Some("projects/parser.org")
        );
    }

    #[test]
    fn first_occurrence_wins_and_duplicates_are_kept() {
        let temp = tree();
        let index = ItemIndex::build(temp.path(), &BacklogConfig::default()).unwrap();
        // task_dirs order: projects before bugs
        assert_eq!(index.item("ITEM-001").unwrap().file, "projects/parser.org");
        let dups: Vec<_> = index.duplicates().map(|i| i.file.as_str()).collect();
        assert_eq!(dups, vec!["bugs/crash.org"]);
    }

    #[test]
    fn qualified_references_resolve_by_tail() {
        let temp = tree();
        let index = ItemIndex::build(temp.path(), &BacklogConfig::default()).unwrap();
        assert!(index.resolve("PROJ-001:ITEM-002").is_some());
        assert!(index.resolve("BUG-009:ITEM-002").is_some());
        assert!(index.resolve("PROJ-001:ITEM-404").is_none());
    }

    #[test]
    fn scope_queries() {
        let temp = tree();
        let index = ItemIndex::build(temp.path(), &BacklogConfig::default()).unwrap();
        let scope = index.scope_at("projects/parser.org", 3).unwrap();
        assert_eq!(scope.category.map(|c| c.id), Some("PROJ-001".to_string()));
        assert!(index.scope_at("elsewhere.org", 1).is_none());
    }

    #[test]
    fn missing_root_is_fatal() {
        let temp = tempdir().unwrap();
        let err = ItemIndex::build(&temp.path().join("gone"), &BacklogConfig::default()).unwrap_err();
        assert!(matches!(err, IndexerError::MissingRoot(_)));
    }
}
