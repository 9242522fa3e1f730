use crate::config::BacklogConfig;
use crate::error::Result;
use crate::properties::ID_KEYS;
use crate::scanner::FileScanner;
use backlog_outline::OutlineParser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Lookup from `name` and `name:section` to the defining file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRegistry {
    entries: BTreeMap<String, PathBuf>,
}

impl AgentRegistry {
    /// Scan `<root>/<agents_dir>`; a missing directory gives an empty registry
    pub fn build(root: &Path, config: &BacklogConfig) -> Result<Self> {
        let dir = root.join(&config.agents_dir);
        let mut registry = Self::default();
        if !dir.is_dir() {
            log::warn!(
                "Agent directory {} not found; every agent reference will be unresolved",
                dir.display()
            );
            return Ok(registry);
        }

        let parser = OutlineParser::default();
        for path in FileScanner::new(&dir, config.extension.as_str()).scan() {
            let is_index = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == config.registry_index);
            if is_index {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let doc = match parser.parse_file(&path) {
                Ok(doc) => doc,
                Err(err) => {
                    log::warn!("Skipping agent file {}: {err}", path.display());
                    continue;
                }
            };

            for heading in &doc.headings {
                let section = heading
                    .properties
                    .get_any(ID_KEYS)
                    .map(str::to_string)
                    .unwrap_or_else(|| slugify(&heading.title));
                if !section.is_empty() {
                    registry.insert(format!("{name}:{section}"), path.clone());
                }
            }
            registry.insert(name, path);
        }

        log::info!("Agent registry: {} entries", registry.len());
        Ok(registry)
    }

    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(key.into(), path.into());
    }

    /// Resolve an agent reference: exact key, or a bare name with any section
    pub fn resolve(&self, reference: &str) -> Option<&Path> {
        let reference = reference.trim();
        let reference = reference.strip_prefix('@').unwrap_or(reference);
        if reference.is_empty() {
            return None;
        }
        if let Some(path) = self.entries.get(reference) {
            return Some(path);
        }
        if reference.contains(':') {
            return None;
        }
        let prefix = format!("{reference}:");
        self.entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, path)| path.as_path())
            .next()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.resolve(reference).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lower-case, non-alphanumeric runs collapsed to `-`
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
