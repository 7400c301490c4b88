use crate::command::domain::GraphSource;
use anyhow::{Context, Result};
use callquest_graph::{CallGraph, CallGraphBuilder};
use std::fs;

/// Read and validate a call graph snapshot
pub fn load_graph(source: &GraphSource) -> Result<CallGraph> {
    let raw = fs::read_to_string(&source.path)
        .with_context(|| format!("Failed to read graph {}", source.path.display()))?;
    let graph = CallGraphBuilder::from_json(&raw)
        .context("Failed to parse graph document")?
        .link_inverse(source.lenient)
        .detect_entry_points(source.detect_entry_points)
        .build()
        .context("Invalid call graph")?;
    log::debug!(
        "Loaded {} nodes and {} edges from {}",
        graph.node_count(),
        graph.edge_count(),
        source.path.display()
    );
    Ok(graph)
}
