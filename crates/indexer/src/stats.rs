use serde::{Deserialize, Serialize};

/// Statistics about one index build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents parsed
    pub files: usize,

    pub items: usize,
    pub categories: usize,
    pub checkpoints: usize,

    /// Malformed drawer lines skipped by the parser
    pub parse_notes: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Files that could not be read
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, items: usize, categories: usize, checkpoints: usize, notes: usize) {
        self.files += 1;
        self.items += items;
        self.categories += categories;
        self.checkpoints += checkpoints;
        self.parse_notes += notes;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}
