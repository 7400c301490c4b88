use crate::config::{RankingConfig, RankingSignal};
use crate::error::{CurriculumError, Result};
use crate::types::{Chain, ChainScore, RankedChain};
use callquest_graph::{CallGraph, CodeNode};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Enumerates execution chains from entry points and orders them by importance
pub struct ChainRanker<'a> {
    graph: &'a CallGraph,
    config: &'a RankingConfig,
    max_depth: usize,
    max_candidates: usize,
}

impl<'a> ChainRanker<'a> {
    #[must_use]
    pub const fn new(
        graph: &'a CallGraph,
        config: &'a RankingConfig,
        max_depth: usize,
        max_candidates: usize,
    ) -> Self {
        Self {
            graph,
            config,
            max_depth,
            max_candidates,
        }
    }

    /// All maximal simple paths from every entry point, at most `max_depth` nodes each.
    ///
    /// A path ends at a node without callees, at a node whose callees are all
    /// already on the path, or at the depth limit. Visited sets are path-local,
    /// so one node may appear in many chains but never twice in the same chain.
    #[must_use]
    pub fn enumerate(&self) -> Vec<Chain> {
        let mut seen: BTreeSet<Vec<&str>> = BTreeSet::new();
        let mut chains = Vec::new();

        'entries: for entry in self.graph.entry_points() {
            let mut stack: Vec<Vec<&str>> = vec![vec![entry.as_str()]];

            while let Some(path) = stack.pop() {
                let Some(last) = path.last().and_then(|id| self.graph.node(id)) else {
                    continue;
                };

                let next: Vec<&str> = if path.len() >= self.max_depth {
                    Vec::new()
                } else {
                    self.graph
                        .callees(&last.id)
                        .into_iter()
                        .map(|callee| callee.id.as_str())
                        .filter(|id| !path.contains(id))
                        .collect()
                };

                if next.is_empty() {
                    if seen.insert(path.clone()) {
                        chains.push(path);
                    }
                    if chains.len() >= self.max_candidates {
                        log::warn!(
                            "Chain enumeration stopped at {} candidates",
                            self.max_candidates
                        );
                        break 'entries;
                    }
                    continue;
                }

                // Reverse push keeps lexicographic exploration order
                for callee in next.into_iter().rev() {
                    let mut extended = path.clone();
                    extended.push(callee);
                    stack.push(extended);
                }
            }
        }

        chains
            .into_iter()
            .filter_map(|path| Chain::new(path.into_iter().map(str::to_string).collect()))
            .collect()
    }

    /// Weighted importance score of one chain
    #[must_use]
    pub fn score(&self, chain: &Chain) -> ChainScore {
        let nodes: Vec<&CodeNode> = chain.iter().filter_map(|id| self.graph.node(id)).collect();
        let mut score = ChainScore::default();

        for term in &self.config.terms {
            let raw = match term.signal {
                RankingSignal::EntryProximity => (0..chain.len())
                    .map(|i| self.config.proximity_decay.powi(i as i32))
                    .sum::<f64>(),
                RankingSignal::CallFrequency => mean(
                    chain.len(),
                    nodes.iter().map(|n| self.graph.callers(&n.id).len() as f64),
                ),
                RankingSignal::Complexity => {
                    mean(chain.len(), nodes.iter().map(|n| f64::from(n.complexity)))
                }
                RankingSignal::Documentation => mean(
                    chain.len(),
                    nodes.iter().map(|n| if n.is_documented() { 1.0 } else { 0.0 }),
                ),
            };
            let value = term.apply(raw);
            match term.signal {
                RankingSignal::EntryProximity => score.entry_proximity += value,
                RankingSignal::CallFrequency => score.call_frequency += value,
                RankingSignal::Complexity => score.complexity += value,
                RankingSignal::Documentation => score.documentation += value,
            }
            score.total += value;
        }
        score
    }

    /// Top `max_chains` chains, best first
    #[must_use]
    pub fn rank(&self, max_chains: usize) -> Vec<RankedChain> {
        let mut ranked: Vec<RankedChain> = self
            .enumerate()
            .into_iter()
            .map(|chain| {
                let score = self.score(&chain);
                log::debug!(
                    "Chain {} scored {:.2}",
                    chain.nodes().join(" -> "),
                    score.total
                );
                RankedChain { chain, score }
            })
            .collect();

        ranked.sort_by(compare_ranked);
        ranked.truncate(max_chains);
        ranked
    }
}

/// Score descending, then fewer nodes, then lexicographic node ids
fn compare_ranked(a: &RankedChain, b: &RankedChain) -> Ordering {
    b.score
        .total
        .total_cmp(&a.score.total)
        .then_with(|| a.chain.len().cmp(&b.chain.len()))
        .then_with(|| a.chain.nodes().cmp(b.chain.nodes()))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(len: usize, values: impl Iterator<Item = f64>) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

/// Rank the most important chains of `graph` with the default scoring table
pub fn identify_core_chains(
    graph: &CallGraph,
    max_chains: usize,
    max_depth: usize,
) -> Result<Vec<RankedChain>> {
    if max_chains == 0 {
        return Err(CurriculumError::config("max_chains must be at least 1"));
    }
    if max_depth == 0 {
        return Err(CurriculumError::config("max_depth must be at least 1"));
    }
    let defaults = crate::GenerationConfig::default();
    let ranker = ChainRanker::new(
        graph,
        &defaults.ranking,
        max_depth,
        defaults.max_candidate_chains,
    );
    Ok(ranker.rank(max_chains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use callquest_graph::{CallGraphBuilder, NodeKind};

    fn graph(calls: &[(&str, &str)], ids: &[&str], entries: &[&str]) -> CallGraph {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        for id in ids {
            builder.add_node(CodeNode::new(*id, *id, NodeKind::Function));
        }
        for (from, to) in calls {
            builder.add_call(from, to);
        }
        for entry in entries {
            builder.add_entry_point(*entry);
        }
        builder.build().unwrap()
    }

    fn ids(chains: &[Chain]) -> Vec<Vec<&str>> {
        chains.iter().map(|c| c.iter().collect()).collect()
    }

    #[test]
    fn enumerates_maximal_paths_in_lexicographic_order() {
        let g = graph(
            &[("main", "b"), ("main", "a"), ("a", "leaf")],
            &["main", "a", "b", "leaf"],
            &["main"],
        );
        let config = RankingConfig::default();
        let chains = ChainRanker::new(&g, &config, 5, 100).enumerate();

        assert_eq!(
            ids(&chains),
            vec![vec!["main", "a", "leaf"], vec!["main", "b"]]
        );
    }

    #[test]
    fn depth_limit_truncates_chains() {
        let g = graph(
            &[("a", "b"), ("b", "c"), ("c", "d")],
            &["a", "b", "c", "d"],
            &["a"],
        );
        let config = RankingConfig::default();
        let chains = ChainRanker::new(&g, &config, 2, 100).enumerate();

        assert_eq!(ids(&chains), vec![vec!["a", "b"]]);
    }

    #[test]
    fn candidate_guard_bounds_enumeration() {
        let g = graph(
            &[("m", "a"), ("m", "b"), ("m", "c")],
            &["m", "a", "b", "c"],
            &["m"],
        );
        let config = RankingConfig::default();
        let chains = ChainRanker::new(&g, &config, 5, 2).enumerate();

        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn default_weights_match_reference_formula() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        let mut a = CodeNode::new("a", "a", NodeKind::Function);
        a.complexity = 4;
        a.docstring = Some("Entry.".to_string());
        let mut b = CodeNode::new("b", "b", NodeKind::Function);
        b.complexity = 8;
        builder
            .add_node(a)
            .add_node(b)
            .add_call("a", "b")
            .add_entry_point("a");
        let g = builder.build().unwrap();

        let config = RankingConfig::default();
        let ranker = ChainRanker::new(&g, &config, 5, 100);
        let chain = Chain::new(vec!["a".into(), "b".into()]).unwrap();
        let score = ranker.score(&chain);

        assert!((score.entry_proximity - (40.0 + 40.0 * 0.7)).abs() < 1e-9);
        assert!((score.call_frequency - 2.5).abs() < 1e-9);
        assert!((score.complexity - 6.0).abs() < 1e-9);
        assert!((score.documentation - 5.0).abs() < 1e-9);
        assert!((score.total - (68.0 + 2.5 + 6.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn identify_core_chains_rejects_zero_limits() {
        let g = graph(&[], &["a"], &["a"]);
        assert!(identify_core_chains(&g, 0, 5).is_err());
        assert!(identify_core_chains(&g, 5, 0).is_err());
    }
}
