//! # Backlog Graph
//!
//! Dependency analysis over backlog items.
//!
//! ## Architecture
//!
//! ```text
//! Item ids + DEPENDS lists (already resolved)
//!     │
//!     ├──> Dependency Graph (petgraph)
//!     │      ├─ Nodes: item ids
//!     │      └─ Edges: A -> B means "A depends on B"
//!     │
//!     ├──> Cycle Detector
//!     │      └─ DFS with a recursion stack, every reachable cycle reported
//!     │
//!     └──> Scope Map
//!            └─ line -> nearest enclosing category / checkpoint
//! ```

mod cycles;
mod error;
mod graph;
mod scope;

pub use cycles::Cycle;
pub use error::{GraphError, Result};
pub use graph::{split_qualified, DependencyGraph};
pub use scope::{Scope, ScopeEntry, ScopeKind, ScopeMap, ScopeMarker};
