//! # Backlog Links
//!
//! Cross-file reference checks and reciprocal back-references.
//!
//! - [`audit_links`] scans every document for `[[file:...]]` links and
//!   reports targets that do not exist (relative to the linking file).
//! - [`sync_backlinks`] follows each item's `ARTIFACT` link and appends the
//!   item id to the target heading's `REFERENCED_BY` property. Re-running
//!   is a no-op.

mod audit;
mod error;
mod paths;
mod sync;

pub use audit::audit_links;
pub use error::{LinkError, Result};
pub use sync::{sync_backlinks, ARTIFACT, REFERENCED_BY};
