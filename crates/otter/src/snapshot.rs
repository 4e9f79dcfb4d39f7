use crate::edges::Edge;
use crate::geom::Point;
use crate::node::NodeSet;
use crate::state::SimulationState;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Immutable per-tick view of a running layout.
///
/// `positions` keeps node-set order, so `positions.get_index(i)` lines up with edge indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub positions: IndexMap<String, Point>,
    pub edges: Arc<[Edge]>,
}

impl Snapshot {
    pub fn capture(
        tick: u64,
        nodes: &NodeSet,
        state: &SimulationState,
        edges: Arc<[Edge]>,
    ) -> Self {
        let positions = nodes
            .iter()
            .zip(state.bodies())
            .map(|(n, b)| (n.id.clone(), Point::from(b.position)))
            .collect();
        Self {
            tick,
            positions,
            edges,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Edges as `(source_id, target_id)` pairs.
    pub fn edge_ids(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edges.iter().filter_map(|e| {
            let (source, _) = self.positions.get_index(e.source)?;
            let (target, _) = self.positions.get_index(e.target)?;
            Some((source.as_str(), target.as_str()))
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tick": self.tick,
            "positions": self.positions.iter().map(|(id, p)| {
                serde_json::json!({ "id": id, "x": p.x, "y": p.y })
            }).collect::<Vec<_>>(),
            "edges": self.edge_ids().map(|(s, t)| {
                serde_json::json!({ "source": s, "target": t })
            }).collect::<Vec<_>>(),
        })
    }
}
