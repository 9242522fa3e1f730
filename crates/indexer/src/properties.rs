use backlog_outline::{Heading, PropertyMap};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const ID_KEYS: &[&str] = &["ID", "CUSTOM_ID"];
pub const AGENT: &str = "AGENT";
pub const EFFORT: &str = "EFFORT";
pub const PRIORITY: &str = "PRIORITY";
pub const DEPENDS: &str = "DEPENDS";
pub const BLOCKS: &str = "BLOCKS";

/// Typed view over one heading's property drawer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProperties {
    pub custom_id: Option<String>,
    pub agent: Option<String>,
    pub effort: Option<String>,
    pub priority: Option<String>,
    pub depends: Vec<String>,
    pub blocks: Vec<String>,

    /// Every non-empty pair, recognised or not
    pub properties: PropertyMap,

    pub closed: Option<NaiveDateTime>,
}

/// Pulls the recognised fields out of a parsed heading
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyExtractor;

impl PropertyExtractor {
    pub fn extract(heading: &Heading) -> ExtractedProperties {
        let props = &heading.properties;
        let owned = |key: &str| props.get(key).map(str::to_string);

        ExtractedProperties {
            custom_id: props.get_any(ID_KEYS).map(str::to_string),
            agent: owned(AGENT),
            effort: owned(EFFORT),
            priority: owned(PRIORITY),
            depends: parse_list(props.get(DEPENDS)),
            blocks: parse_list(props.get(BLOCKS)),
            properties: props.clone(),
            closed: heading.closed,
        }
    }
}

/// Split a comma-separated reference list; absent or blank input is empty
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Effort in minutes for `<digits>h` / `<digits>m`; anything else is `None`
pub fn parse_effort(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, factor) = if let Some(hours) = raw.strip_suffix('h') {
        (hours, 60)
    } else if let Some(minutes) = raw.strip_suffix('m') {
        (minutes, 1)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_outline::OutlineParser;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn effort_units() {
        assert_eq!(parse_effort("2h"), Some(120));
        assert_eq!(parse_effort("30m"), Some(30));
        assert_eq!(parse_effort(" 1h "), Some(60));
        assert_eq!(parse_effort("2 hours"), None);
        assert_eq!(parse_effort("2hrs"), None);
        assert_eq!(parse_effort(""), None);
        assert_eq!(parse_effort("h"), None);
        assert_eq!(parse_effort("-2h"), None);
    }

    #[test]
    fn effort_overflow_is_unparseable() {
        assert_eq!(parse_effort(&format!("{}h", u64::MAX)), None);
    }

    #[test]
    fn lists_are_trimmed_and_compacted() {
        assert_eq!(
            parse_list(Some(" ITEM-001, ,PROJ-002:ITEM-004,, ")),
            vec!["ITEM-001".to_string(), "PROJ-002:ITEM-004".to_string()]
        );
        assert!(parse_list(Some("")).is_empty());
        assert!(parse_list(None).is_empty());
    }

    #[test]
    fn extracts_known_and_unknown_properties() {
        let text = "\
* DONE ITEM-001 Ship it
CLOSED: [2024-03-04 Mon 10:00]
:PROPERTIES:
:ID: ITEM-001
:AGENT: @backend
:EFFORT: 2h
:PRIORITY: A
:DEPENDS: ITEM-002, ITEM-003
:RISK: low
:END:
";
        let doc = OutlineParser::default().parse_str(text, "projects/a.org");
        let extracted = PropertyExtractor::extract(&doc.headings[0]);
        assert_eq!(extracted.custom_id.as_deref(), Some("ITEM-001"));
        assert_eq!(extracted.agent.as_deref(), Some("@backend"));
        assert_eq!(extracted.effort.as_deref(), Some("2h"));
        assert_eq!(extracted.priority.as_deref(), Some("A"));
        assert_eq!(extracted.depends, vec!["ITEM-002", "ITEM-003"]);
        assert!(extracted.blocks.is_empty());
        assert_eq!(extracted.properties.get("RISK"), Some("low"));
        assert!(extracted.closed.is_some());
    }

    proptest! {
        #[test]
        fn effort_parser_never_panics(raw in ".{0,24}") {
            let _ = parse_effort(&raw);
        }

        #[test]
        fn hours_are_sixty_minutes(n in 0u64..10_000) {
            prop_assert_eq!(parse_effort(&format!("{n}h")), Some(n * 60));
        }
    }
}
