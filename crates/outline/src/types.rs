use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw key/value pairs from a property drawer.
///
/// Every non-empty pair is retained, recognised or not. Keys are stored
/// upper-cased so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key (case-insensitive)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// First key in `keys` that carries a value
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a pair; empty values are dropped
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.entries
            .insert(key.as_ref().to_ascii_uppercase(), value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Line span of a property drawer (1-indexed, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawerSpan {
    /// Line holding `:PROPERTIES:`
    pub start_line: usize,

    /// Line holding `:END:`; `None` when the drawer was never closed
    pub end_line: Option<usize>,
}

/// A heading and the metadata directly attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Depth (number of leading stars)
    pub level: usize,

    /// Status keyword, when the first word is a known keyword
    pub keyword: Option<String>,

    /// Title with keyword and tags stripped
    pub title: String,

    /// Trailing `:tag:` markers
    #[serde(default)]
    pub tags: Vec<String>,

    /// Line of the heading itself (1-indexed)
    pub line: usize,

    /// Planning line carrying `CLOSED:` etc.
    pub planning_line: Option<usize>,

    /// Parsed `CLOSED:` timestamp
    pub closed: Option<NaiveDateTime>,

    pub properties: PropertyMap,

    pub drawer: Option<DrawerSpan>,
}

impl Heading {
    pub(crate) fn new(level: usize, line: usize) -> Self {
        Self {
            level,
            keyword: None,
            title: String::new(),
            tags: Vec::new(),
            line,
            planning_line: None,
            closed: None,
            properties: PropertyMap::new(),
            drawer: None,
        }
    }

    /// First whitespace-separated word of the title
    #[must_use]
    pub fn first_token(&self) -> Option<&str> {
        self.title.split_whitespace().next()
    }

    /// Last line that belongs to the heading's own metadata block
    #[must_use]
    pub fn metadata_end_line(&self) -> usize {
        let mut end = self.line;
        if let Some(planning) = self.planning_line {
            end = end.max(planning);
        }
        if let Some(drawer) = self.drawer {
            end = end.max(drawer.end_line.unwrap_or(drawer.start_line));
        }
        end
    }
}

/// Something odd the parser skipped over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNote {
    pub line: usize,
    pub message: String,
}

/// A parsed outline document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineDocument {
    /// Source file path (as given to the parser)
    pub file_path: String,

    /// Drawer that precedes the first heading
    pub properties: PropertyMap,

    pub drawer: Option<DrawerSpan>,

    /// Headings in document order
    pub headings: Vec<Heading>,

    #[serde(default)]
    pub notes: Vec<ParseNote>,
}

impl OutlineDocument {
    /// Heading that starts exactly at `line`
    #[must_use]
    pub fn heading_at(&self, line: usize) -> Option<&Heading> {
        self.headings.iter().find(|h| h.line == line)
    }

    /// Heading whose `ID`/`CUSTOM_ID` property equals `id`
    #[must_use]
    pub fn heading_by_id(&self, id: &str) -> Option<&Heading> {
        self.headings
            .iter()
            .find(|h| h.properties.get_any(&["CUSTOM_ID", "ID"]) == Some(id))
    }

    /// Heading whose title equals `title`
    #[must_use]
    pub fn heading_by_title(&self, title: &str) -> Option<&Heading> {
        self.headings.iter().find(|h| h.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_lookup_is_case_insensitive() {
        let mut props = PropertyMap::new();
        props.insert("Agent", "backend");
        assert_eq!(props.get("AGENT"), Some("backend"));
        assert_eq!(props.get("agent"), Some("backend"));
        assert!(props.contains_key("aGeNt"));
    }

    #[test]
    fn empty_values_are_dropped() {
        let props: PropertyMap = [("EFFORT", "  "), ("PRIORITY", "A")].into_iter().collect();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("EFFORT"), None);
    }

    #[test]
    fn get_any_prefers_first_key() {
        let props: PropertyMap = [("ID", "a"), ("CUSTOM_ID", "b")].into_iter().collect();
        assert_eq!(props.get_any(&["CUSTOM_ID", "ID"]), Some("b"));
        assert_eq!(props.get_any(&["MISSING", "ID"]), Some("a"));
    }
}
