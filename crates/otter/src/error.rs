#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {node_id} has an invalid radius: {radius} (must be finite and > 0)")]
    InvalidRadius { node_id: String, radius: f64 },

    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("invalid force constant `{name}`: {value}")]
    InvalidConstant { name: &'static str, value: f64 },

    #[error("simulation state has {state} bodies but the node set has {nodes} nodes")]
    StateMismatch { state: usize, nodes: usize },

    #[error("invalid JSON input: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
