//! Tests for CallGraph operations

use callquest_graph::{
    CallEdge, CallGraph, CallGraphBuilder, CallGraphDocument, CodeNode, GraphError, NodeKind,
};
use pretty_assertions::assert_eq;

fn make_node(id: &str, kind: NodeKind) -> CodeNode {
    let mut node = CodeNode::new(id, id, kind);
    node.file_path = "src/app.py".to_string();
    node.line_start = 1;
    node.line_end = 10;
    node
}

fn build(calls: &[(&str, &str)], ids: &[&str], entries: &[&str]) -> CallGraph {
    let mut builder = CallGraphBuilder::new().link_inverse(true);
    for id in ids {
        builder.add_node(make_node(id, NodeKind::Function));
    }
    for (from, to) in calls {
        builder.add_call(from, to);
    }
    for entry in entries {
        builder.add_entry_point(*entry);
    }
    builder.build().expect("valid graph")
}

#[test]
fn test_node_and_edge_count() {
    let graph = build(&[("main", "helper")], &["main", "helper", "util"], &["main"]);

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.contains("util"));
    assert!(graph.node("missing").is_none());
}

#[test]
fn test_get_callees_and_callers() {
    let graph = build(
        &[("main", "helper"), ("main", "util"), ("run", "helper")],
        &["main", "run", "helper", "util"],
        &["main", "run"],
    );

    let callees: Vec<&str> = graph
        .callees("main")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(callees, vec!["helper", "util"]);

    let callers: Vec<&str> = graph
        .callers("helper")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(callers, vec!["main", "run"]);

    assert!(graph.callers("main").is_empty());
}

#[test]
fn test_reachability_follows_calls_only() {
    let graph = build(
        &[("a", "b"), ("b", "c")],
        &["a", "b", "c", "d"],
        &["a"],
    );

    assert!(graph.is_reachable_from(["a"], "c"));
    assert!(graph.is_reachable_from(["c"], "c"));
    assert!(!graph.is_reachable_from(["c"], "a"));
    assert!(!graph.is_reachable_from(["a"], "d"));
}

#[test]
fn test_stats_depth_handles_cycles() {
    let graph = build(
        &[("a", "b"), ("b", "a"), ("b", "c")],
        &["a", "b", "c"],
        &["a"],
    );

    let stats = graph.stats();
    assert_eq!(stats.nodes, 3);
    assert_eq!(stats.edges, 3);
    assert_eq!(stats.entry_points, 1);
    assert_eq!(stats.max_depth, 2);
}

#[test]
fn test_stats_depth_on_dense_dag_is_linear() {
    let ids: Vec<String> = (0..60).map(|i| format!("f{i:02}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let calls: Vec<(&str, &str)> = (0..id_refs.len())
        .flat_map(|i| ((i + 1)..id_refs.len()).map(move |j| (i, j)))
        .map(|(i, j)| (id_refs[i], id_refs[j]))
        .collect();
    let graph = build(&calls, &id_refs, &["f00"]);

    assert_eq!(graph.edge_count(), 60 * 59 / 2);
    assert_eq!(graph.stats().max_depth, 59);
    assert_eq!(graph.call_depth("f30"), 29);
    assert_eq!(graph.call_depth("f59"), 0);
}

#[test]
fn test_call_depth_counts_recursive_cluster_hops() {
    let graph = build(
        &[("main", "a"), ("a", "b"), ("b", "c"), ("c", "a"), ("c", "leaf")],
        &["main", "a", "b", "c", "leaf"],
        &["main"],
    );

    assert_eq!(graph.call_depth("main"), 4);
    assert_eq!(graph.call_depth("leaf"), 0);
    assert_eq!(graph.call_depth("missing"), 0);
}

#[test]
fn test_explicit_edge_keeps_its_call_count() {
    let mut builder = CallGraphBuilder::new().link_inverse(true);
    builder
        .add_node(make_node("a", NodeKind::Function))
        .add_node(make_node("b", NodeKind::Function))
        .add_node(make_node("c", NodeKind::Function))
        .add_edge(CallEdge {
            from_node: "a".to_string(),
            to_node: "c".to_string(),
            call_count: 4,
        })
        .add_call("b", "c");
    let graph = builder.build().unwrap();

    let weight = |from: &str, to: &str| {
        graph
            .edges()
            .iter()
            .find(|e| e.from_node == from && e.to_node == to)
            .map(|e| e.call_count)
    };
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(weight("a", "c"), Some(4));
    assert_eq!(weight("b", "c"), Some(1));
    assert_eq!(graph.callers("c").len(), 2);
}

#[test]
fn test_document_round_trip_through_json() {
    let json = r#"{
        "nodes": [
            {"id": "m::main", "name": "main", "kind": "function",
             "calls": ["m::run"], "complexity": 2},
            {"id": "m::run", "name": "run", "kind": "method",
             "called_by": ["m::main"], "decorators": ["staticmethod"]}
        ],
        "edges": [{"from_node": "m::main", "to_node": "m::run", "call_count": 2}],
        "entry_points": ["m::main"]
    }"#;

    let graph = CallGraphBuilder::from_json(json).unwrap().build().unwrap();
    let run = graph.node("m::run").unwrap();

    assert_eq!(run.kind, NodeKind::Method);
    assert_eq!(run.complexity, 1);
    assert_eq!(run.decorators, vec!["staticmethod".to_string()]);
    assert_eq!(graph.edges()[0].call_count, 2);
    assert_eq!(graph.node_name("m::run"), "run");
    assert_eq!(graph.node_name("pkg::unknown"), "unknown");
}

#[test]
fn test_document_with_inconsistent_adjacency_fails() {
    let doc = CallGraphDocument {
        nodes: vec![
            make_node("a", NodeKind::Function),
            make_node("b", NodeKind::Function),
        ],
        edges: vec![CallEdge::new("a", "b")],
        entry_points: vec!["a".to_string()],
    };

    let err = CallGraph::try_from(doc).unwrap_err();
    assert!(matches!(err, GraphError::InconsistentAdjacency { .. }));
}

#[test]
fn test_duplicate_node_fails() {
    let doc = CallGraphDocument {
        nodes: vec![
            make_node("a", NodeKind::Function),
            make_node("a", NodeKind::Method),
        ],
        edges: Vec::new(),
        entry_points: Vec::new(),
    };

    assert!(matches!(
        CallGraph::try_from(doc).unwrap_err(),
        GraphError::DuplicateNode(ref id) if id == "a"
    ));
}
