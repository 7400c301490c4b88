use crate::types::CallGraph;

/// Export to GraphViz DOT format for visualization
///
/// Entry points are filled green; edges called more than once carry their
/// call count as a label. Output ordering is stable (nodes by id, edges in
/// graph order).
#[must_use]
pub fn to_dot(graph: &CallGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph CallGraph {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=rounded];\n");

    for node in graph.nodes() {
        let id = escape(&node.id);
        let label = escape(&node.name);
        if graph.entry_points().contains(&node.id) {
            out.push_str(&format!(
                "  \"{id}\" [label=\"{label}\", fillcolor=lightgreen, style=\"rounded,filled\"];\n"
            ));
        } else {
            out.push_str(&format!("  \"{id}\" [label=\"{label}\"];\n"));
        }
    }

    for edge in graph.edges() {
        let from = escape(&edge.from_node);
        let to = escape(&edge.to_node);
        if edge.call_count > 1 {
            out.push_str(&format!(
                "  \"{from}\" -> \"{to}\" [label=\"{}\"];\n",
                edge.call_count
            ));
        } else {
            out.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
        }
    }

    out.push_str("}\n");
    out
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallGraphBuilder, CodeNode, NodeKind};

    #[test]
    fn dot_marks_entry_points_and_is_deterministic() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder
            .add_node(CodeNode::new("main", "main", NodeKind::Function))
            .add_node(CodeNode::new("run", "run", NodeKind::Function))
            .add_call("main", "run")
            .add_entry_point("main");
        let graph = builder.build().unwrap();

        let first = to_dot(&graph);
        assert_eq!(first, to_dot(&graph));
        assert!(first.contains("\"main\" [label=\"main\", fillcolor=lightgreen"));
        assert!(first.contains("\"run\" [label=\"run\"];"));
        assert!(first.contains("\"main\" -> \"run\";"));
    }
}
