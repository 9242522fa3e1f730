use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FILE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[file:([^\]\[]+)\](?:\[([^\]]*)\])?\]").expect("valid link regex")
});

/// Part of a link after `::`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LinkFragment {
    /// `::#ID` - a heading carrying that id
    Id(String),
    /// `::*Title` - a heading with that title
    Heading(String),
    /// Anything else (line numbers, search strings)
    Other(String),
}

/// A `[[file:...]]` link found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Line the link appears on (1-indexed)
    pub line: usize,

    /// Path part, as written
    pub path: String,

    pub fragment: Option<LinkFragment>,

    pub description: Option<String>,
}

impl Link {
    fn from_target(line: usize, target: &str, description: Option<&str>) -> Self {
        let (path, fragment) = match target.split_once("::") {
            Some((path, frag)) => (path, parse_fragment(frag)),
            None => (target, None),
        };
        Self {
            line,
            path: path.trim().to_string(),
            fragment,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }
}

fn parse_fragment(frag: &str) -> Option<LinkFragment> {
    let frag = frag.trim();
    if frag.is_empty() {
        return None;
    }
    if let Some(id) = frag.strip_prefix('#') {
        return Some(LinkFragment::Id(id.to_string()));
    }
    if let Some(title) = frag.strip_prefix('*') {
        return Some(LinkFragment::Heading(title.trim().to_string()));
    }
    Some(LinkFragment::Other(frag.to_string()))
}

/// Extract every file link from `text`
#[must_use]
pub fn extract_links(text: &str) -> Vec<Link> {
    let mut links = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for caps in FILE_LINK_RE.captures_iter(line) {
            let Some(target) = caps.get(1) else {
                continue;
            };
            links.push(Link::from_target(
                idx + 1,
                target.as_str(),
                caps.get(2).map(|m| m.as_str()),
            ));
        }
    }
    links
}
