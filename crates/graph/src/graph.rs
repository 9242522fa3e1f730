use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Split a qualified cross-category reference `PROJ-001:ITEM-004`.
///
/// Returns `(Some(category), item)` for the qualified form and
/// `(None, reference)` otherwise. The item part is what the graph uses.
pub fn split_qualified(reference: &str) -> (Option<&str>, &str) {
    let reference = reference.trim();
    match reference.split_once(':') {
        Some((category, item)) if !category.is_empty() && !item.is_empty() => {
            (Some(category.trim()), item.trim())
        }
        _ => (None, reference),
    }
}

/// Directed dependency graph over item ids.
///
/// An edge `A -> B` means "A depends on B".
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, dependencies)` pairs; dependencies are taken as given
    pub fn from_dependencies<'a, I, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, D)>,
        D: IntoIterator<Item = &'a str>,
    {
        let mut graph = Self::new();
        for (id, deps) in entries {
            if graph.add_node(id).is_err() {
                continue;
            }
            for dep in deps {
                if let Err(err) = graph.add_dependency(id, dep) {
                    log::debug!("Skipping dependency {id} -> {dep:?}: {err}");
                }
            }
        }
        log::debug!(
            "Built dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Add a node (idempotent)
    pub fn add_node(&mut self, id: &str) -> Result<NodeIndex> {
        let id = id.trim();
        if id.is_empty() {
            return Err(GraphError::EmptyId);
        }
        if let Some(&idx) = self.index.get(id) {
            return Ok(idx);
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        Ok(idx)
    }

    /// Record that `from` depends on `to`; duplicate edges are ignored
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<()> {
        let a = self.add_node(from)?;
        let b = self.add_node(to)?;
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids `id` depends on, sorted
    pub fn dependencies(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Ids that depend on `id`, sorted
    pub fn dependents(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, dir: Direction) -> Result<Vec<&str>> {
        let idx = self
            .index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
