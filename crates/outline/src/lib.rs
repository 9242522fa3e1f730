//! # Backlog Outline
//!
//! Minimal parser for the outline markup the backlog is written in.
//!
//! Only the subset the engine needs is understood:
//!
//! ```text
//! Text
//!     │
//!     ├──> Headings (`*`, `**`, ...)
//!     │      ├─ Status keyword (TODO, DOING, REVIEW, DONE, BLOCKED)
//!     │      ├─ Title + trailing tags
//!     │      └─ 1-based line + depth
//!     │
//!     ├──> Planning line (`CLOSED: [2024-01-15 Mon 10:30]`)
//!     │
//!     ├──> Property drawers (`:PROPERTIES:` ... `:END:`)
//!     │      └─ every `:KEY: value` pair, keys upper-cased
//!     │
//!     └──> File links (`[[file:path::#id][desc]]`)
//! ```
//!
//! Content problems never fail a parse: malformed drawer lines become
//! [`ParseNote`]s and the heading keeps whatever could be read.
//!
//! ## Example
//!
//! ```rust
//! use backlog_outline::OutlineParser;
//!
//! let text = "* TODO ITEM-001 Wire the parser\n:PROPERTIES:\n:EFFORT: 2h\n:END:\n";
//! let doc = OutlineParser::default().parse_str(text, "todo.org");
//!
//! assert_eq!(doc.headings.len(), 1);
//! assert_eq!(doc.headings[0].keyword.as_deref(), Some("TODO"));
//! assert_eq!(doc.headings[0].properties.get("effort"), Some("2h"));
//! ```

mod error;
mod links;
mod parser;
mod patch;
mod types;

pub use error::{OutlineError, Result};
pub use links::{extract_links, Link, LinkFragment};
pub use parser::{parse_timestamp, OutlineParser, DEFAULT_KEYWORDS};
pub use patch::set_property;
pub use types::{DrawerSpan, Heading, OutlineDocument, ParseNote, PropertyMap};
