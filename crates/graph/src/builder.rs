use crate::error::{GraphError, Result};
use crate::types::{CallEdge, CallGraph, CallGraphDocument, CodeNode};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet};

/// Assemble and validate an immutable [`CallGraph`]
///
/// By default the builder is strict: `calls`, `called_by` and the explicit
/// edge list must already agree. With [`CallGraphBuilder::link_inverse`] the
/// builder derives the missing halves instead, which is convenient when
/// constructing graphs by hand.
#[derive(Debug, Default)]
pub struct CallGraphBuilder {
    nodes: Vec<CodeNode>,
    edges: Vec<CallEdge>,
    entry_points: Vec<String>,
    link_inverse: bool,
    detect_entry_points: bool,
}

impl CallGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_document(doc: CallGraphDocument) -> Self {
        Self {
            nodes: doc.nodes,
            edges: doc.edges,
            entry_points: doc.entry_points,
            ..Self::default()
        }
    }

    /// Parse a JSON graph document
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CallGraphDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(doc))
    }

    pub fn add_node(&mut self, node: CodeNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(&mut self, edge: CallEdge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Record a single call `from -> to`
    pub fn add_call(&mut self, from: &str, to: &str) -> &mut Self {
        self.add_edge(CallEdge::new(from, to))
    }

    pub fn add_entry_point(&mut self, id: impl Into<String>) -> &mut Self {
        self.entry_points.push(id.into());
        self
    }

    /// Derive `calls`/`called_by` from each other and from the edge list
    #[must_use]
    pub const fn link_inverse(mut self, enabled: bool) -> Self {
        self.link_inverse = enabled;
        self
    }

    /// Fill an empty entry-point set with the callable nodes nobody calls
    #[must_use]
    pub const fn detect_entry_points(mut self, enabled: bool) -> Self {
        self.detect_entry_points = enabled;
        self
    }

    pub fn build(self) -> Result<CallGraph> {
        let Self {
            nodes,
            edges,
            entry_points,
            link_inverse,
            detect_entry_points,
        } = self;

        // Phase 1: unique ids
        let mut by_id: BTreeMap<String, CodeNode> = BTreeMap::new();
        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }

        // Phase 2: explicit edges, duplicates merged into the first occurrence
        let mut merged: Vec<CallEdge> = Vec::with_capacity(edges.len());
        let mut position: BTreeMap<(String, String), usize> = BTreeMap::new();
        for edge in edges {
            if edge.call_count == 0 {
                return Err(GraphError::InvalidEdge {
                    from: edge.from_node,
                    to: edge.to_node,
                    reason: "call_count must be at least 1".to_string(),
                });
            }
            for endpoint in [&edge.from_node, &edge.to_node] {
                if !by_id.contains_key(endpoint) {
                    return Err(GraphError::DanglingEdge {
                        from: edge.from_node.clone(),
                        to: edge.to_node.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            let key = (edge.from_node.clone(), edge.to_node.clone());
            if let Some(&pos) = position.get(&key) {
                merged[pos].call_count = merged[pos].call_count.saturating_add(edge.call_count);
            } else {
                position.insert(key, merged.len());
                merged.push(edge);
            }
        }

        // Phase 3: adjacency sets
        if link_inverse {
            link_adjacency(&mut by_id, &merged)?;
        } else {
            check_adjacency(&by_id, &merged)?;
        }

        // Phase 4: calls without an explicit edge become unit-weight edges
        for node in by_id.values() {
            for target in &node.calls {
                let key = (node.id.clone(), target.clone());
                if !position.contains_key(&key) {
                    position.insert(key, merged.len());
                    merged.push(CallEdge::new(node.id.clone(), target.clone()));
                }
            }
        }

        // Phase 5: petgraph representation
        let mut graph = DiGraph::with_capacity(by_id.len(), merged.len());
        let mut index: BTreeMap<String, NodeIndex> = BTreeMap::new();
        for (id, node) in by_id {
            let idx = graph.add_node(node);
            index.insert(id, idx);
        }
        for edge in &merged {
            if let (Some(&from), Some(&to)) = (index.get(&edge.from_node), index.get(&edge.to_node))
            {
                graph.add_edge(from, to, edge.clone());
            }
        }

        let mut entries: BTreeSet<String> = BTreeSet::new();
        for id in entry_points {
            if !index.contains_key(&id) {
                return Err(GraphError::UnknownEntryPoint(id));
            }
            entries.insert(id);
        }

        let mut call_graph = CallGraph {
            graph,
            index,
            edges: merged,
            entry_points: entries,
        };

        if detect_entry_points && call_graph.entry_points.is_empty() {
            call_graph.entry_points = call_graph
                .detect_entry_points()
                .into_iter()
                .map(|node| node.id.clone())
                .collect();
        }

        log::info!(
            "Built call graph: {} nodes, {} edges, {} entry points",
            call_graph.node_count(),
            call_graph.edge_count(),
            call_graph.entry_points.len()
        );

        Ok(call_graph)
    }
}

impl TryFrom<CallGraphDocument> for CallGraph {
    type Error = GraphError;

    fn try_from(doc: CallGraphDocument) -> Result<Self> {
        CallGraphBuilder::from_document(doc).build()
    }
}

fn dangling(from: &str, to: &str, missing: &str) -> GraphError {
    GraphError::DanglingEdge {
        from: from.to_string(),
        to: to.to_string(),
        missing: missing.to_string(),
    }
}

fn inconsistent(from: &str, to: &str, detail: &str) -> GraphError {
    GraphError::InconsistentAdjacency {
        from: from.to_string(),
        to: to.to_string(),
        detail: detail.to_string(),
    }
}

fn link_adjacency(by_id: &mut BTreeMap<String, CodeNode>, edges: &[CallEdge]) -> Result<()> {
    let mut pairs: BTreeSet<(String, String)> = edges
        .iter()
        .map(|e| (e.from_node.clone(), e.to_node.clone()))
        .collect();

    for node in by_id.values() {
        for target in &node.calls {
            if !by_id.contains_key(target) {
                return Err(dangling(&node.id, target, target));
            }
            pairs.insert((node.id.clone(), target.clone()));
        }
        for caller in &node.called_by {
            if !by_id.contains_key(caller) {
                return Err(dangling(caller, &node.id, caller));
            }
            pairs.insert((caller.clone(), node.id.clone()));
        }
    }

    for (from, to) in pairs {
        if let Some(caller) = by_id.get_mut(&from) {
            caller.calls.insert(to.clone());
        }
        if let Some(callee) = by_id.get_mut(&to) {
            callee.called_by.insert(from);
        }
    }
    Ok(())
}

fn check_adjacency(by_id: &BTreeMap<String, CodeNode>, edges: &[CallEdge]) -> Result<()> {
    for edge in edges {
        let (from, to) = (&edge.from_node, &edge.to_node);
        let calls_ok = by_id.get(from).is_some_and(|n| n.calls.contains(to));
        if !calls_ok {
            return Err(inconsistent(from, to, "edge target missing from `calls`"));
        }
        let called_by_ok = by_id.get(to).is_some_and(|n| n.called_by.contains(from));
        if !called_by_ok {
            return Err(inconsistent(from, to, "edge source missing from `called_by`"));
        }
    }

    for node in by_id.values() {
        for target in &node.calls {
            let callee = by_id
                .get(target)
                .ok_or_else(|| dangling(&node.id, target, target))?;
            if !callee.called_by.contains(&node.id) {
                return Err(inconsistent(&node.id, target, "caller missing from `called_by`"));
            }
        }
        for caller_id in &node.called_by {
            let caller = by_id
                .get(caller_id)
                .ok_or_else(|| dangling(caller_id, &node.id, caller_id))?;
            if !caller.calls.contains(&node.id) {
                return Err(inconsistent(caller_id, &node.id, "callee missing from `calls`"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn func(id: &str) -> CodeNode {
        CodeNode::new(id, id, NodeKind::Function)
    }

    #[test]
    fn link_inverse_fills_both_directions() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder
            .add_node(func("main"))
            .add_node(func("run"))
            .add_call("main", "run")
            .add_entry_point("main");
        let graph = builder.build().unwrap();

        assert!(graph.node("main").unwrap().calls.contains("run"));
        assert!(graph.node("run").unwrap().called_by.contains("main"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn strict_mode_rejects_half_linked_edges() {
        let mut main = func("main");
        main.calls.insert("run".to_string());
        let mut builder = CallGraphBuilder::new();
        builder.add_node(main).add_node(func("run"));

        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::InconsistentAdjacency { .. }));
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder.add_node(func("main")).add_call("main", "ghost");

        let err = builder.build().unwrap_err();
        assert!(
            matches!(err, GraphError::DanglingEdge { ref missing, .. } if missing == "ghost"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn duplicate_edges_are_merged() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder
            .add_node(func("a"))
            .add_node(func("b"))
            .add_call("a", "b")
            .add_edge(CallEdge {
                from_node: "a".to_string(),
                to_node: "b".to_string(),
                call_count: 3,
            });
        let graph = builder.build().unwrap();

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].call_count, 4);
    }

    #[test]
    fn zero_call_count_is_invalid() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder.add_node(func("a")).add_node(func("b")).add_edge(CallEdge {
            from_node: "a".to_string(),
            to_node: "b".to_string(),
            call_count: 0,
        });

        assert!(matches!(
            builder.build().unwrap_err(),
            GraphError::InvalidEdge { .. }
        ));
    }

    #[test]
    fn unknown_entry_point_is_rejected() {
        let mut builder = CallGraphBuilder::new();
        builder.add_node(func("a")).add_entry_point("b");

        assert!(matches!(
            builder.build().unwrap_err(),
            GraphError::UnknownEntryPoint(ref id) if id == "b"
        ));
    }

    #[test]
    fn entry_points_can_be_detected() {
        let mut builder = CallGraphBuilder::new()
            .link_inverse(true)
            .detect_entry_points(true);
        builder
            .add_node(func("main"))
            .add_node(func("helper"))
            .add_node(CodeNode::new("Model", "Model", NodeKind::Class))
            .add_call("main", "helper");
        let graph = builder.build().unwrap();

        let entries: Vec<&str> = graph.entry_points().iter().map(String::as_str).collect();
        assert_eq!(entries, vec!["main"]);
    }
}
