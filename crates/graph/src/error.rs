use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Malformed call graph input
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Edge {from} -> {to} references unknown node {missing}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("Entry point {0} is not a node of the graph")]
    UnknownEntryPoint(String),

    #[error("Adjacency of {from} -> {to} is inconsistent: {detail}")]
    InconsistentAdjacency {
        from: String,
        to: String,
        detail: String,
    },

    #[error("Invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
