//! # Backlog Indexer
//!
//! Turns a tree of outline documents into a cross-file index of backlog
//! entities.
//!
//! ## Pipeline
//!
//! ```text
//! Root directory
//!     │
//!     ├──> File Scanner (task subdirectories only)
//!     │      └─> .org files
//!     │
//!     ├──> Outline Parser
//!     │      └─> headings + property drawers
//!     │
//!     ├──> Entity Builder (Property Extractor per heading)
//!     │      └─> Item / Category / Checkpoint records + scope map
//!     │
//!     └──> Item Index            Agent Registry (agents/ directory)
//!            └──────────┬───────────────┘
//!                       └─> IndexCache (build / get-or-build / invalidate)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use backlog_indexer::{BacklogConfig, IndexCache};
//!
//! fn main() -> backlog_indexer::Result<()> {
//!     let root = std::path::Path::new("/path/to/backlog");
//!     let config = BacklogConfig::load(root)?;
//!     let mut cache = IndexCache::open(root, config)?;
//!     let snapshot = cache.get_or_build()?;
//!
//!     println!("{} items indexed", snapshot.items.item_count());
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod entities;
mod error;
mod ids;
mod index;
mod patterns;
mod properties;
mod registry;
mod scanner;
mod stats;

pub use cache::{CacheSnapshot, CacheState, IndexCache};
pub use config::{BacklogConfig, CONFIG_FILE_NAME};
pub use entities::{Category, Checkpoint, DocumentEntities, EntityBuilder, Item, Status};
pub use error::{IndexerError, Result};
pub use ids::{next_category_id, next_checkpoint_id, next_item_id};
pub use index::{IndexedDocument, ItemIndex};
pub use patterns::IdPatterns;
pub use properties::{parse_effort, parse_list, ExtractedProperties, PropertyExtractor};
pub use registry::AgentRegistry;
pub use scanner::FileScanner;
pub use stats::IndexStats;
