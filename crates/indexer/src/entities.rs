use crate::config::BacklogConfig;
use crate::error::Result;
use crate::patterns::IdPatterns;
use crate::properties::{parse_list, PropertyExtractor, DEPENDS, ID_KEYS};
use backlog_graph::{Scope, ScopeKind, ScopeMap, ScopeMarker};
use backlog_outline::{Heading, OutlineDocument, ParseNote, PropertyMap};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GOAL: &str = "GOAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Doing,
    Review,
    Done,
    Blocked,
}

impl Status {
    /// Map a heading keyword (`TODO`, `DOING`, ...)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "TODO" => Some(Self::Pending),
            "DOING" => Some(Self::Doing),
            "REVIEW" => Some(Self::Review),
            "DONE" => Some(Self::Done),
            "BLOCKED" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Parse a status name as used in requests
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "todo" => Some(Self::Pending),
            "doing" | "in-progress" | "in_progress" => Some(Self::Doing),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Doing => "doing",
            Self::Review => "review",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Doing | Self::Review)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Empty when neither an `ID` property nor an `ITEM-n` title token exists
    pub id: String,
    /// Path relative to the backlog root, `/`-separated
    pub file: String,
    pub line: usize,
    pub title: String,
    pub status: Status,
    pub agent: Option<String>,
    pub effort: Option<String>,
    pub priority: Option<String>,
    pub depends: Vec<String>,
    pub blocks: Vec<String>,
    pub properties: PropertyMap,
    pub closed_time: Option<NaiveDateTime>,
    pub level: usize,
    /// Enclosing category / checkpoint
    pub scope: Scope,
}

impl Item {
    pub fn category_id(&self) -> Option<&str> {
        self.scope.category.as_ref().map(|c| c.id.as_str())
    }

    pub fn checkpoint_id(&self) -> Option<&str> {
        self.scope.checkpoint.as_ref().map(|c| c.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Id taken from the heading title
    pub id: String,
    /// `ID` property, when present
    pub declared_id: Option<String>,
    pub file: String,
    pub line: usize,
    pub level: usize,
    pub title: String,
    pub goal: Option<String>,
    pub depends: Vec<String>,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Empty for generic `CHECKPOINT` headings without an `ID`
    pub id: String,
    pub file: String,
    pub line: usize,
    pub level: usize,
    pub title: String,
    /// Category number encoded in the id
    pub parent_number: Option<u64>,
    pub properties: PropertyMap,
}

/// Everything one document contributes to the index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntities {
    pub file: String,
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub checkpoints: Vec<Checkpoint>,
    pub scopes: ScopeMap,
    pub notes: Vec<ParseNote>,
}

enum Kind<'h> {
    Item(&'h Heading, crate::properties::ExtractedProperties),
    Category(&'h Heading, String),
    Checkpoint(&'h Heading, String),
}

/// Turns parsed headings into typed records
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    patterns: IdPatterns,
}

impl EntityBuilder {
    pub fn new(config: &BacklogConfig) -> Result<Self> {
        Ok(Self {
            patterns: IdPatterns::new(config)?,
        })
    }

    pub fn patterns(&self) -> &IdPatterns {
        &self.patterns
    }

    /// Build the records of one document; `file` is its index-relative path
    pub fn build(&self, doc: &OutlineDocument, file: &str) -> DocumentEntities {
        let kinds: Vec<Kind<'_>> = doc
            .headings
            .iter()
            .filter_map(|heading| self.classify(heading))
            .collect();

        let markers = kinds
            .iter()
            .filter_map(|kind| match kind {
                Kind::Category(h, id) => Some(marker(ScopeKind::Category, id, h)),
                Kind::Checkpoint(h, id) => Some(marker(ScopeKind::Checkpoint, id, h)),
                Kind::Item(..) => None,
            })
            .collect();
        let scopes = ScopeMap::new(markers);

        let mut entities = DocumentEntities {
            file: file.to_string(),
            notes: doc.notes.clone(),
            ..Default::default()
        };

        for kind in kinds {
            match kind {
                Kind::Item(heading, extracted) => {
                    let id = extracted
                        .custom_id
                        .clone()
                        .or_else(|| IdPatterns::item_in_title(&heading.title).map(str::to_string))
                        .unwrap_or_default();
                    let status = heading
                        .keyword
                        .as_deref()
                        .and_then(Status::from_keyword)
                        .unwrap_or(Status::Pending);
                    entities.items.push(Item {
                        id,
                        file: file.to_string(),
                        line: heading.line,
                        title: heading.title.clone(),
                        status,
                        agent: extracted.agent,
                        effort: extracted.effort,
                        priority: extracted.priority,
                        depends: extracted.depends,
                        blocks: extracted.blocks,
                        properties: extracted.properties,
                        closed_time: extracted.closed,
                        level: heading.level,
                        scope: scopes.resolve_heading(heading.line, heading.level),
                    });
                }
                Kind::Category(heading, id) => {
                    let props = &heading.properties;
                    entities.categories.push(Category {
                        id,
                        declared_id: props.get_any(ID_KEYS).map(str::to_string),
                        file: file.to_string(),
                        line: heading.line,
                        level: heading.level,
                        title: heading.title.clone(),
                        goal: props.get(GOAL).map(str::to_string),
                        depends: parse_list(props.get(DEPENDS)),
                        properties: props.clone(),
                    });
                }
                Kind::Checkpoint(heading, id) => {
                    entities.checkpoints.push(Checkpoint {
                        parent_number: IdPatterns::checkpoint_parent(&id),
                        id,
                        file: file.to_string(),
                        line: heading.line,
                        level: heading.level,
                        title: heading.title.clone(),
                        properties: heading.properties.clone(),
                    });
                }
            }
        }

        entities.scopes = scopes;
        log::debug!(
            "{}: {} items, {} categories, {} checkpoints",
            file,
            entities.items.len(),
            entities.categories.len(),
            entities.checkpoints.len()
        );
        entities
    }

    fn classify<'h>(&self, heading: &'h Heading) -> Option<Kind<'h>> {
        if heading
            .keyword
            .as_deref()
            .and_then(Status::from_keyword)
            .is_some()
        {
            return Some(Kind::Item(heading, PropertyExtractor::extract(heading)));
        }
        if let Some(id) = self.patterns.category_in_title(&heading.title) {
            return Some(Kind::Category(heading, id.to_string()));
        }
        if IdPatterns::is_checkpoint_title(&heading.title) {
            let id = heading
                .properties
                .get_any(ID_KEYS)
                .or_else(|| IdPatterns::checkpoint_in_title(&heading.title))
                .unwrap_or_default();
            return Some(Kind::Checkpoint(heading, id.to_string()));
        }
        None
    }
}

fn marker(kind: ScopeKind, id: &str, heading: &Heading) -> ScopeMarker {
    ScopeMarker {
        kind,
        id: id.to_string(),
        line: heading.line,
        level: heading.level,
    }
}
