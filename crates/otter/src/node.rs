use crate::config::RadiusTable;
use crate::error::{Error, Result};
use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Stat,
    Project,
    Action,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Stat => "stat",
            NodeKind::Project => "project",
            NodeKind::Action => "action",
        }
    }

    /// Stat and action nodes hang off projects.
    pub fn is_satellite(self) -> bool {
        matches!(self, NodeKind::Stat | NodeKind::Action)
    }
}

/// A dashboard entity as seen by the layout engine.
///
/// `status` and `payload` belong to the data layer; the engine only reads the `"active"` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub status: BTreeSet<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
}

impl Node {
    pub const ACTIVE_FLAG: &'static str = "active";

    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            status: BTreeSet::new(),
            payload: serde_json::Value::Null,
            radius: None,
        }
    }

    pub fn stat(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Stat, label)
    }

    pub fn project(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Project, label)
    }

    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Action, label)
    }

    pub fn with_status(mut self, flag: impl Into<String>) -> Self {
        self.status.insert(flag.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Overrides the kind-derived radius.
    pub fn with_radius(mut self, radius: f64) -> Result<Self> {
        check_radius(&self.id, radius)?;
        self.radius = Some(radius);
        Ok(self)
    }

    pub fn is_active(&self) -> bool {
        self.status.contains(Self::ACTIVE_FLAG)
    }

    pub fn radius_override(&self) -> Option<f64> {
        self.radius
    }

    pub fn radius(&self, table: &RadiusTable) -> f64 {
        self.radius
            .unwrap_or_else(|| table.radius_for(self.kind, self.is_active()))
    }
}

fn check_radius(node_id: &str, radius: f64) -> Result<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRadius {
            node_id: node_id.to_string(),
            radius,
        })
    }
}

/// Ordered, validated node list supplied by the data layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.reserve(nodes.len());
        for n in &nodes {
            // Deserialized nodes bypass `with_radius`.
            if let Some(r) = n.radius {
                check_radius(&n.id, r)?;
            }
            if !seen.insert(n.id.as_str()) {
                return Err(Error::DuplicateNodeId { id: n.id.clone() });
            }
        }
        Ok(Self { nodes })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let nodes: Vec<Node> = serde_json::from_str(text)?;
        Self::new(nodes)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn radii(&self, table: &RadiusTable) -> Vec<f64> {
        self.nodes.iter().map(|n| n.radius(table)).collect()
    }

    /// Hash over the ordered `(id, kind)` sequence. Labels, status and payload do not take part:
    /// they never move a node.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FxHasher::default();
        self.nodes.len().hash(&mut h);
        for n in &self.nodes {
            n.id.hash(&mut h);
            n.kind.hash(&mut h);
        }
        h.finish()
    }

    /// True when both sets hold the same ids with the same kinds in the same order, i.e. a
    /// running layout for one is valid for the other.
    pub fn same_layout_keys(&self, other: &NodeSet) -> bool {
        self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.id == b.id && a.kind == b.kind)
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
