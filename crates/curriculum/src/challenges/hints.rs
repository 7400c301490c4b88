use callquest_graph::{CallGraph, CodeNode};

/// Progressive hints for one challenge, vaguest first
pub(super) struct HintLadder<'a> {
    graph: &'a CallGraph,
    hints: Vec<String>,
}

impl<'a> HintLadder<'a> {
    pub(super) const fn new(graph: &'a CallGraph) -> Self {
        Self {
            graph,
            hints: Vec::new(),
        }
    }

    /// Docstring pointer, then location of `node`
    ///
    /// Never quotes the docstring: its summary is the answer of purpose questions.
    pub(super) fn about(mut self, node: &CodeNode) -> Self {
        if node.doc_summary().is_some() {
            self.hints
                .push(format!("Read the docstring of {}", node.name));
        }
        self.hints
            .push(format!("Look at {} in {}", node.name, node.line_range()));
        self
    }

    /// Names the next node on the path; reveals a step, so push it last
    pub(super) fn hand_off(mut self, from: &CodeNode, next_id: &str) -> Self {
        self.hints.push(format!(
            "{} hands work to {}",
            from.name,
            self.graph.node_name(next_id)
        ));
        self
    }

    pub(super) fn then(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub(super) fn build(mut self) -> Vec<String> {
        self.hints.dedup();
        self.hints
    }
}
