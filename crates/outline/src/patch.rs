use crate::error::{OutlineError, Result};
use crate::parser::{OutlineParser, PROPERTY_RE};
use crate::types::DrawerSpan;

/// Set one property value in place and return the patched text.
///
/// `heading_line` selects the heading whose drawer is edited; `None` edits
/// the file-level drawer. A missing drawer is created directly under the
/// heading (after its planning line). All other bytes are preserved.
pub fn set_property(
    text: &str,
    heading_line: Option<usize>,
    key: &str,
    value: &str,
) -> Result<String> {
    if key.is_empty() || key.contains(':') || key.contains(char::is_whitespace) {
        return Err(OutlineError::InvalidKey(key.to_string()));
    }

    let doc = OutlineParser::default().parse_str(text, "");
    let (drawer, insert_after) = match heading_line {
        None => (doc.drawer, 0),
        Some(line) => {
            let heading = doc
                .heading_at(line)
                .ok_or(OutlineError::HeadingNotFound(line))?;
            (heading.drawer, heading.planning_line.unwrap_or(line).max(line))
        }
    };

    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();

    match drawer {
        Some(DrawerSpan {
            start_line,
            end_line: Some(end_line),
        }) => {
            for idx in start_line..end_line.saturating_sub(1) {
                let trimmed = lines[idx].trim();
                let Some(existing) = PROPERTY_RE
                    .captures(trimmed)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                else {
                    continue;
                };
                if existing.eq_ignore_ascii_case(key) {
                    let indent = leading_ws(&lines[idx]);
                    let eol = line_ending(&lines[idx]);
                    lines[idx] = format!("{indent}:{existing}: {value}{eol}");
                    return Ok(lines.concat());
                }
            }
            let end_idx = end_line - 1;
            let indent = leading_ws(&lines[end_idx]);
            lines.insert(end_idx, format!("{indent}:{key}: {value}\n"));
        }
        Some(DrawerSpan {
            start_line,
            end_line: None,
        }) => {
            ensure_newline(&mut lines, start_line);
            lines.insert(start_line, format!(":{key}: {value}\n"));
        }
        None => {
            ensure_newline(&mut lines, insert_after);
            let block = format!(":PROPERTIES:\n:{key}: {value}\n:END:\n");
            lines.insert(insert_after.min(lines.len()), block);
        }
    }

    Ok(lines.concat())
}

fn leading_ws(line: &str) -> String {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').collect()
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Make sure the line before an insertion point is newline-terminated
fn ensure_newline(lines: &mut [String], insert_at: usize) {
    if insert_at == 0 {
        return;
    }
    if let Some(prev) = lines.get_mut(insert_at - 1) {
        if !prev.ends_with('\n') {
            prev.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replaces_existing_value() {
        let text = "* DESIGN-1 Doc\n:PROPERTIES:\n:ID: DESIGN-1\n:REFERENCED_BY: ITEM-001\n:END:\nbody\n";
        let out = set_property(text, Some(1), "REFERENCED_BY", "ITEM-001, ITEM-002").unwrap();
        assert_eq!(
            out,
            "* DESIGN-1 Doc\n:PROPERTIES:\n:ID: DESIGN-1\n:REFERENCED_BY: ITEM-001, ITEM-002\n:END:\nbody\n"
        );
    }

    #[test]
    fn inserts_before_end_when_key_missing() {
        let text = "* Doc\n  :PROPERTIES:\n  :ID: D\n  :END:\n";
        let out = set_property(text, Some(1), "REFERENCED_BY", "ITEM-9").unwrap();
        assert_eq!(
            out,
            "* Doc\n  :PROPERTIES:\n  :ID: D\n  :REFERENCED_BY: ITEM-9\n  :END:\n"
        );
    }

    #[test]
    fn creates_drawer_after_planning_line() {
        let text = "* DONE Thing\nCLOSED: [2024-01-01]\nbody";
        let out = set_property(text, Some(1), "X", "1").unwrap();
        assert_eq!(
            out,
            "* DONE Thing\nCLOSED: [2024-01-01]\n:PROPERTIES:\n:X: 1\n:END:\nbody"
        );
    }

    #[test]
    fn creates_file_level_drawer_at_top() {
        let out = set_property("#+TITLE: t\n* H\n", None, "REFERENCED_BY", "ITEM-1").unwrap();
        assert_eq!(
            out,
            ":PROPERTIES:\n:REFERENCED_BY: ITEM-1\n:END:\n#+TITLE: t\n* H\n"
        );
    }

    #[test]
    fn heading_without_trailing_newline() {
        let out = set_property("* H", Some(1), "K", "v").unwrap();
        assert_eq!(out, "* H\n:PROPERTIES:\n:K: v\n:END:\n");
    }

    #[test]
    fn rejects_unknown_heading_and_bad_key() {
        assert!(matches!(
            set_property("* H\n", Some(3), "K", "v"),
            Err(OutlineError::HeadingNotFound(3))
        ));
        assert!(matches!(
            set_property("* H\n", Some(1), "BAD KEY", "v"),
            Err(OutlineError::InvalidKey(_))
        ));
    }
}
