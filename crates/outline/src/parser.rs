use crate::error::Result;
use crate::types::{DrawerSpan, Heading, OutlineDocument, ParseNote, PropertyMap};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Status keywords recognised when no explicit set is configured
pub const DEFAULT_KEYWORDS: &[&str] = &["TODO", "DOING", "REVIEW", "DONE", "BLOCKED"];

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*+)\s+(.*?)\s*$").expect("valid heading regex"));
static TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s+(:(?:[\w@#%]+:)+)$").expect("valid tags regex"));
pub(crate) static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:([^:\s]+):(?:\s+(.*?))?\s*$").expect("valid property regex"));
static PLANNING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:CLOSED|SCHEDULED|DEADLINE):").expect("valid planning regex"));
static CLOSED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CLOSED:\s*\[([^\]]+)\]").expect("valid closed regex"));

#[derive(Debug, Clone, Copy)]
enum Owner {
    Document,
    Heading(usize),
}

#[derive(Debug, Clone, Copy)]
enum State {
    Preamble,
    /// Directly after a heading (or its planning line)
    Meta(usize),
    Drawer(Owner),
    /// Directly after a heading's drawer; one planning line may follow
    AfterDrawer(usize),
    Body,
}

/// Parser for the outline subset
#[derive(Debug, Clone)]
pub struct OutlineParser {
    keywords: Vec<String>,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl OutlineParser {
    /// Create a parser recognising the given status keywords
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Parse a file from disk
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<OutlineDocument> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse_str(&content, &path.to_string_lossy()))
    }

    /// Parse text; never fails on content
    #[must_use]
    pub fn parse_str(&self, text: &str, file_path: &str) -> OutlineDocument {
        let mut doc = OutlineDocument {
            file_path: file_path.to_string(),
            ..Default::default()
        };
        let mut state = State::Preamble;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;

            if let Some(caps) = HEADING_RE.captures(raw) {
                if let State::Drawer(_) = state {
                    doc.notes.push(ParseNote {
                        line,
                        message: "property drawer not closed before next heading".to_string(),
                    });
                }
                let level = caps.get(1).map_or(0, |m| m.as_str().len());
                let rest = caps.get(2).map_or("", |m| m.as_str());
                doc.headings.push(self.parse_heading(level, rest, line));
                state = State::Meta(doc.headings.len() - 1);
                continue;
            }

            let trimmed = raw.trim();
            state = match state {
                State::Drawer(owner) => {
                    if trimmed.eq_ignore_ascii_case(":END:") {
                        close_drawer(&mut doc, owner, line);
                        match owner {
                            Owner::Document => State::Preamble,
                            Owner::Heading(h) => State::AfterDrawer(h),
                        }
                    } else {
                        read_property(&mut doc, owner, trimmed, line);
                        State::Drawer(owner)
                    }
                }
                State::Preamble => {
                    if trimmed.eq_ignore_ascii_case(":PROPERTIES:") && doc.drawer.is_none() {
                        doc.drawer = Some(DrawerSpan {
                            start_line: line,
                            end_line: None,
                        });
                        State::Drawer(Owner::Document)
                    } else {
                        State::Preamble
                    }
                }
                State::Meta(h) => {
                    if PLANNING_RE.is_match(trimmed) {
                        read_planning(&mut doc.headings[h], trimmed, line);
                        State::Meta(h)
                    } else if trimmed.eq_ignore_ascii_case(":PROPERTIES:") {
                        doc.headings[h].drawer = Some(DrawerSpan {
                            start_line: line,
                            end_line: None,
                        });
                        State::Drawer(Owner::Heading(h))
                    } else if trimmed.is_empty() {
                        State::Meta(h)
                    } else {
                        State::Body
                    }
                }
                State::AfterDrawer(h) => {
                    if PLANNING_RE.is_match(trimmed) && doc.headings[h].planning_line.is_none() {
                        read_planning(&mut doc.headings[h], trimmed, line);
                    }
                    State::Body
                }
                State::Body => State::Body,
            };
        }

        if let State::Drawer(_) = state {
            doc.notes.push(ParseNote {
                line: text.lines().count(),
                message: "property drawer not closed before end of file".to_string(),
            });
        }

        log::debug!(
            "Parsed {}: {} headings, {} notes",
            doc.file_path,
            doc.headings.len(),
            doc.notes.len()
        );
        doc
    }

    fn parse_heading(&self, level: usize, rest: &str, line: usize) -> Heading {
        let mut heading = Heading::new(level, line);

        let mut text = rest;
        if let Some(caps) = TAGS_RE.captures(rest) {
            text = caps.get(1).map_or(rest, |m| m.as_str());
            if let Some(tags) = caps.get(2) {
                heading.tags = tags
                    .as_str()
                    .split(':')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }

        let text = text.trim();
        let (first, remainder) = match text.split_once(char::is_whitespace) {
            Some((first, remainder)) => (first, remainder.trim()),
            None => (text, ""),
        };
        if self.keywords.iter().any(|k| k == first) {
            heading.keyword = Some(first.to_string());
            heading.title = remainder.to_string();
        } else {
            heading.title = text.to_string();
        }
        heading
    }
}

fn close_drawer(doc: &mut OutlineDocument, owner: Owner, line: usize) {
    let span = match owner {
        Owner::Document => doc.drawer.as_mut(),
        Owner::Heading(h) => doc.headings[h].drawer.as_mut(),
    };
    if let Some(span) = span {
        span.end_line = Some(line);
    }
}

fn read_property(doc: &mut OutlineDocument, owner: Owner, trimmed: &str, line: usize) {
    if trimmed.is_empty() {
        return;
    }
    let Some(caps) = PROPERTY_RE.captures(trimmed) else {
        doc.notes.push(ParseNote {
            line,
            message: format!("ignored malformed property line: {trimmed}"),
        });
        return;
    };
    let key = caps.get(1).map_or("", |m| m.as_str());
    let value = caps.get(2).map_or("", |m| m.as_str());
    let props: &mut PropertyMap = match owner {
        Owner::Document => &mut doc.properties,
        Owner::Heading(h) => &mut doc.headings[h].properties,
    };
    props.insert(key, value);
}

fn read_planning(heading: &mut Heading, trimmed: &str, line: usize) {
    heading.planning_line = Some(line);
    if let Some(raw) = CLOSED_RE.captures(trimmed).and_then(|c| c.get(1)) {
        heading.closed = parse_timestamp(raw.as_str());
    }
}

/// Parse the inside of an outline timestamp: `2024-01-15 Mon 10:30`.
///
/// Weekday and time are optional; a missing time means midnight.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let mut parts = raw.split_whitespace();
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y-%m-%d").ok()?;
    let time = parts
        .find_map(|part| NaiveTime::parse_from_str(part, "%H:%M").ok())
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}
