//! # CallQuest Graph
//!
//! Immutable call graph snapshot consumed by the curriculum engine.
//!
//! ## Architecture
//!
//! ```text
//! Analyzer output (JSON)
//!     │
//!     ├──> CallGraphDocument (serde)
//!     │
//!     ├──> CallGraphBuilder
//!     │      ├─ Reject duplicate ids, dangling edges, unknown entry points
//!     │      ├─ Check (or derive) calls / called_by symmetry
//!     │      └─ Merge duplicate edges by call count
//!     │
//!     └──> CallGraph (petgraph)
//!            ├─ Nodes: functions, methods, classes
//!            ├─ Edges: calls weighted by frequency
//!            └─ Traversal: callees, callers, reachability, depth
//! ```
//!
//! Source text is never read here: callers provide a [`SourceLookup`], and
//! [`render_skeleton`] covers nodes whose text is unavailable.

mod builder;
mod dot;
mod error;
mod graph;
mod source;
mod types;

pub use builder::CallGraphBuilder;
pub use dot::to_dot;
pub use error::{GraphError, Result};
pub use graph::GraphStats;
pub use source::{
    node_text, render_skeleton, slice_lines, MapSourceLookup, NoSource, SourceLookup,
};
pub use types::{CallEdge, CallGraph, CallGraphDocument, CodeNode, NodeKind, Parameter};
