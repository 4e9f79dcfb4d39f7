use crate::node::{NodeKind, NodeSet};
use serde::Serialize;

/// Directed connection between two nodes of the same [`NodeSet`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }
}

/// Connects every stat and action node to every project node.
///
/// Edges come out ordered by source index, then target index.
pub fn resolve(nodes: &NodeSet) -> Vec<Edge> {
    let projects: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.kind == NodeKind::Project)
        .map(|(idx, _)| idx)
        .collect();
    if projects.is_empty() {
        return Vec::new();
    }

    let mut edges = Vec::new();
    for (source, node) in nodes.iter().enumerate() {
        if !node.kind.is_satellite() {
            continue;
        }
        edges.extend(projects.iter().map(|&target| Edge::new(source, target)));
    }
    edges
}
