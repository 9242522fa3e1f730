use crate::graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency cycle; the first id is repeated at the end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub path: Vec<String>,
}

impl Cycle {
    /// Distinct ids taking part in the cycle
    pub fn members(&self) -> &[String] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members().iter().any(|m| m == id)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct Frame {
    node: NodeIndex,
    next: Vec<NodeIndex>,
    pos: usize,
}

impl DependencyGraph {
    /// Find every cycle reachable from any root.
    ///
    /// Depth-first with an explicit recursion stack: reaching a node that is
    /// on the current path closes a cycle; reaching a finished node is a
    /// no-op, so diamonds are not cycles. Roots and neighbours are visited in
    /// insertion order, which keeps the output deterministic.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let graph = &self.graph;
        let mut marks = vec![Mark::Unvisited; graph.node_count()];
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut cycles = Vec::new();

        for root in graph.node_indices() {
            if marks[root.index()] != Mark::Unvisited {
                continue;
            }

            let mut stack = vec![self.enter(root, &mut marks, &mut path)];
            while let Some(frame) = stack.last_mut() {
                if frame.pos < frame.next.len() {
                    let next = frame.next[frame.pos];
                    frame.pos += 1;
                    match marks[next.index()] {
                        Mark::Unvisited => {
                            let child = self.enter(next, &mut marks, &mut path);
                            stack.push(child);
                        }
                        Mark::OnStack => {
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            let mut ids: Vec<String> =
                                path[start..].iter().map(|&n| graph[n].clone()).collect();
                            ids.push(graph[next].clone());
                            cycles.push(Cycle { path: ids });
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[frame.node.index()] = Mark::Done;
                    path.pop();
                    stack.pop();
                }
            }
        }

        if !cycles.is_empty() {
            log::debug!("Detected {} dependency cycle(s)", cycles.len());
        }
        cycles
    }

    /// Cheap yes/no check
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    fn enter(&self, node: NodeIndex, marks: &mut [Mark], path: &mut Vec<NodeIndex>) -> Frame {
        marks[node.index()] = Mark::OnStack;
        path.push(node);
        let mut next: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        next.sort_unstable();
        Frame { node, next, pos: 0 }
    }
}
