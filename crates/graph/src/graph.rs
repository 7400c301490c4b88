use crate::types::{CallGraph, CodeNode};
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Summary metrics for a call graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub entry_points: usize,
    /// Deepest call depth reachable from an entry point (see [`CallGraph::call_depth`])
    pub max_depth: usize,
}

impl CallGraph {
    /// Nodes that `id` calls, in id order
    #[must_use]
    pub fn callees(&self, id: &str) -> Vec<&CodeNode> {
        self.node(id)
            .map(|node| node.calls.iter().filter_map(|c| self.node(c)).collect())
            .unwrap_or_default()
    }

    /// Nodes that call `id`, in id order
    #[must_use]
    pub fn callers(&self, id: &str) -> Vec<&CodeNode> {
        self.node(id)
            .map(|node| node.called_by.iter().filter_map(|c| self.node(c)).collect())
            .unwrap_or_default()
    }

    /// Find entry points - callable symbols with no callers
    #[must_use]
    pub fn detect_entry_points(&self) -> Vec<&CodeNode> {
        self.nodes()
            .filter(|node| node.kind.is_callable() && node.called_by.is_empty())
            .collect()
    }

    /// Whether `target` can be reached from any of `sources` by following calls.
    /// A source equal to the target counts as reachable.
    #[must_use]
    pub fn is_reachable_from<'a, I>(&self, sources: I, target: &str) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(target_idx) = self.node_index(target) else {
            return false;
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = sources
            .into_iter()
            .filter_map(|id| self.node_index(id))
            .collect();

        while let Some(current) = queue.pop_front() {
            if current == target_idx {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for edge in self.graph.edges(current) {
                if !visited.contains(&edge.target()) {
                    queue.push_back(edge.target());
                }
            }
        }
        false
    }

    /// Call depth in hops starting at `id`
    ///
    /// Computed over the strongly connected components in linear time. A
    /// recursive cluster of `n` functions counts as `n - 1` hops, so the result
    /// is exact on acyclic graphs and an upper bound on the longest simple path
    /// otherwise.
    #[must_use]
    pub fn call_depth(&self, id: &str) -> usize {
        self.node_index(id)
            .map_or(0, |idx| self.component_depths()[&idx])
    }

    /// Depth of every node, keyed by node index
    fn component_depths(&self) -> HashMap<NodeIndex, usize> {
        // Components come out sinks first, so every callee component is done
        // before its callers
        let components = tarjan_scc(&self.graph);
        let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
        for (c, members) in components.iter().enumerate() {
            for &idx in members {
                component_of.insert(idx, c);
            }
        }

        let mut depth = vec![0usize; components.len()];
        for (c, members) in components.iter().enumerate() {
            let below = members
                .iter()
                .flat_map(|&idx| self.graph.edges(idx))
                .map(|edge| component_of[&edge.target()])
                .filter(|&target| target != c)
                .map(|target| depth[target] + 1)
                .max()
                .unwrap_or(0);
            depth[c] = members.len() - 1 + below;
        }

        component_of
            .into_iter()
            .map(|(idx, c)| (idx, depth[c]))
            .collect()
    }

    /// Get statistics about the graph
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            entry_points: self.entry_points.len(),
            max_depth: {
                let depths = self.component_depths();
                self.entry_points
                    .iter()
                    .filter_map(|id| self.node_index(id))
                    .map(|idx| depths[&idx])
                    .max()
                    .unwrap_or(0)
            },
        }
    }
}
