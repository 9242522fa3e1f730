use crate::config::BacklogConfig;
use crate::error::{IndexerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static ITEM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ITEM-\d+(-[a-z0-9-]+)?$").expect("valid item id regex"));
static ITEM_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ITEM-\d+").expect("valid item token regex"));
static CHECKPOINT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CHK-\d{3,}-\d{2,}(-[a-z0-9-]+)?$").expect("valid checkpoint id regex")
});
static CHECKPOINT_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CHK-(\d+)-(\d+)(-[a-z0-9-]+)?\b").expect("valid checkpoint title regex")
});
static CHECKPOINT_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CHECKPOINT\b").expect("valid checkpoint marker regex"));
static EFFORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[hm]$").expect("valid effort regex"));

/// Identifier grammars, with the category prefix set taken from config
#[derive(Debug, Clone)]
pub struct IdPatterns {
    category: Regex,
    category_id: Regex,
}

impl IdPatterns {
    pub fn new(config: &BacklogConfig) -> Result<Self> {
        let alternatives = config
            .category_prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let category = Regex::new(&format!(r"^((?:{alternatives})-(\d+))\b"))
            .map_err(|err| IndexerError::InvalidConfig(err.to_string()))?;
        let category_id = Regex::new(&format!(r"^(?:{alternatives})-\d+$"))
            .map_err(|err| IndexerError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            category,
            category_id,
        })
    }

    /// Category id at the start of a heading title (`PROJ-001 ...`)
    pub fn category_in_title<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.category
            .captures(title)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_category_id(&self, id: &str) -> bool {
        self.category_id.is_match(id)
    }

    pub fn is_item_id(id: &str) -> bool {
        ITEM_ID_RE.is_match(id)
    }

    /// First title token when it looks like an item id
    pub fn item_in_title(title: &str) -> Option<&str> {
        title
            .split_whitespace()
            .next()
            .filter(|token| ITEM_TOKEN_RE.is_match(token))
    }

    pub fn is_checkpoint_id(id: &str) -> bool {
        CHECKPOINT_ID_RE.is_match(id)
    }

    /// Checkpoint id at the start of a heading title (`CHK-001-02 ...`)
    pub fn checkpoint_in_title(title: &str) -> Option<&str> {
        CHECKPOINT_TITLE_RE
            .captures(title)
            .and_then(|caps| caps.get(0))
            .map(|m| m.as_str())
    }

    /// Whether a heading title opens a checkpoint: a checkpoint id or the
    /// `CHECKPOINT` marker as the first token
    pub fn is_checkpoint_title(title: &str) -> bool {
        Self::checkpoint_in_title(title).is_some() || CHECKPOINT_MARKER_RE.is_match(title)
    }

    /// Parent category number encoded in a checkpoint id (`CHK-001-02` -> 1)
    pub fn checkpoint_parent(id: &str) -> Option<u64> {
        CHECKPOINT_TITLE_RE
            .captures(id)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Sequence number within the parent (`CHK-001-02` -> 2)
    pub fn checkpoint_sequence(id: &str) -> Option<u64> {
        CHECKPOINT_TITLE_RE
            .captures(id)
            .and_then(|caps| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn is_effort(effort: &str) -> bool {
        EFFORT_RE.is_match(effort.trim())
    }
}

/// Numeric suffix of `PREFIX-123[-slug]`
pub(crate) fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    let rest = id.strip_prefix(prefix)?.strip_prefix('-')?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
