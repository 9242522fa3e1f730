use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Scanner for finding outline documents under a directory
pub struct FileScanner {
    root: PathBuf,
    extension: String,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// Documents below `root`, sorted; a missing directory yields nothing
    pub fn scan(&self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            log::debug!("Scan root {} does not exist", self.root.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true) // editor backups and dotfiles are never documents
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::warn!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    if Self::is_noise_file(path) {
                        log::debug!("Skipping editor artifact {}", path.display());
                        continue;
                    }

                    if !self.is_document(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::debug!("Found {} documents under {}", files.len(), self.root.display());
        files
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Emacs lock and autosave files (`.#a.org`, `#a.org#`)
    fn is_noise_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(".#") || name.starts_with('#'))
    }
}

const MAX_FILE_SIZE_BYTES: u64 = 4 * 1_048_576; // 4 MB

#[cfg(test)]
mod tests {
    use super::FileScanner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_documents_recursively_in_order() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("parser");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("b.org"), b"* x").unwrap();
        fs::write(nested.join("a.org"), b"* y").unwrap();
        fs::write(temp.path().join("notes.md"), b"# no").unwrap();

        let files = FileScanner::new(temp.path(), "org").scan();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.org", "parser/a.org"]);
    }

    #[test]
    fn skips_hidden_and_autosave_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".#lock.org"), b"").unwrap();
        fs::write(temp.path().join("#autosave.org#"), b"").unwrap();
        fs::write(temp.path().join("#draft.org"), b"").unwrap();
        fs::write(temp.path().join("real.org"), b"* TODO x").unwrap();

        let files = FileScanner::new(temp.path(), "org").scan();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.org"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = tempdir().unwrap();
        assert!(FileScanner::new(temp.path().join("nope"), "org").scan().is_empty());
    }
}
