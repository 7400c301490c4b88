use crate::config::{DifficultyConfig, DifficultySignal};
use crate::ranker::mean;
use crate::types::{Chain, Difficulty};
use callquest_graph::{CallGraph, CodeNode};
use serde::Serialize;

/// Score breakdown behind a difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DifficultyScore {
    pub length: f64,
    pub complexity: f64,
    pub abstraction: f64,
    pub dependencies: f64,
    pub total: f64,
}

/// Maps a chain's structure to one of the five difficulty tiers
pub struct DifficultyClassifier<'a> {
    config: &'a DifficultyConfig,
}

impl<'a> DifficultyClassifier<'a> {
    #[must_use]
    pub const fn new(config: &'a DifficultyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, chain: &Chain, graph: &CallGraph) -> DifficultyScore {
        let nodes: Vec<&CodeNode> = chain.iter().filter_map(|id| graph.node(id)).collect();
        let weights = &self.config.abstraction;
        let mut score = DifficultyScore::default();

        for term in &self.config.terms {
            let raw = match term.signal {
                DifficultySignal::Length => chain.len() as f64,
                DifficultySignal::Complexity => {
                    mean(nodes.len(), nodes.iter().map(|n| f64::from(n.complexity)))
                }
                DifficultySignal::Abstraction => nodes
                    .iter()
                    .map(|n| {
                        let mut units = n.decorators.len() as f64 * weights.decorator;
                        if n.is_async {
                            units += weights.async_fn;
                        }
                        if n.is_generator {
                            units += weights.generator;
                        }
                        units
                    })
                    .sum::<f64>(),
                DifficultySignal::Dependencies => {
                    nodes.iter().map(|n| n.depends_on.len()).sum::<usize>() as f64
                }
            };
            let value = term.apply(raw);
            match term.signal {
                DifficultySignal::Length => score.length += value,
                DifficultySignal::Complexity => score.complexity += value,
                DifficultySignal::Abstraction => score.abstraction += value,
                DifficultySignal::Dependencies => score.dependencies += value,
            }
            score.total += value;
        }
        score
    }

    /// Tier of a total score according to the band table
    #[must_use]
    pub fn tier(&self, total: f64) -> Difficulty {
        self.config
            .bands
            .iter()
            .find(|band| total < band.below)
            .map_or(Difficulty::Expert, |band| band.tier)
    }

    #[must_use]
    pub fn classify(&self, chain: &Chain, graph: &CallGraph) -> Difficulty {
        let score = self.score(chain, graph);
        let tier = self.tier(score.total);
        log::debug!(
            "Chain at {} has difficulty score {:.1} ({tier})",
            chain.entry(),
            score.total
        );
        tier
    }
}

/// Difficulty of `chain` under the default scoring table and bands
#[must_use]
pub fn calculate_difficulty(chain: &Chain, graph: &CallGraph) -> Difficulty {
    let config = DifficultyConfig::default();
    DifficultyClassifier::new(&config).classify(chain, graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyBand;
    use callquest_graph::{CallGraphBuilder, NodeKind};

    fn chain(ids: &[&str]) -> Chain {
        Chain::new(ids.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn linear_graph(nodes: Vec<CodeNode>) -> CallGraph {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        for node in nodes {
            builder.add_node(node);
        }
        for pair in ids.windows(2) {
            builder.add_call(&pair[0], &pair[1]);
        }
        builder.add_entry_point(ids[0].clone());
        builder.build().unwrap()
    }

    #[test]
    fn single_plain_function_is_tutorial() {
        let g = linear_graph(vec![CodeNode::new("f", "f", NodeKind::Function)]);
        assert_eq!(calculate_difficulty(&chain(&["f"]), &g), Difficulty::Tutorial);
    }

    #[test]
    fn score_terms_are_capped() {
        let mut heavy = CodeNode::new("h", "h", NodeKind::Function);
        heavy.complexity = 40;
        heavy.decorators = (0..12).map(|i| format!("d{i}")).collect();
        heavy.is_async = true;
        heavy.depends_on = (0..30).map(|i| format!("m{i}")).collect();
        let g = linear_graph(vec![heavy]);

        let config = DifficultyConfig::default();
        let score = DifficultyClassifier::new(&config).score(&chain(&["h"]), &g);
        assert_eq!(score.length, 4.0);
        assert_eq!(score.complexity, 30.0);
        assert_eq!(score.abstraction, 25.0);
        assert_eq!(score.dependencies, 25.0);
        assert_eq!(score.total, 84.0);
        assert_eq!(
            DifficultyClassifier::new(&config).classify(&chain(&["h"]), &g),
            Difficulty::Expert
        );
    }

    #[test]
    fn decorated_complex_chain_is_intermediate() {
        let nodes = ["a", "b", "c"]
            .iter()
            .map(|id| {
                let mut node = CodeNode::new(*id, *id, NodeKind::Function);
                node.decorators = vec!["cached".to_string()];
                node.complexity = 12;
                node
            })
            .collect();
        let g = linear_graph(nodes);

        // 12 (length) + 24 (complexity) + 9 (abstraction)
        let config = DifficultyConfig::default();
        let score = DifficultyClassifier::new(&config).score(&chain(&["a", "b", "c"]), &g);
        assert_eq!(score.total, 45.0);
        assert_eq!(
            calculate_difficulty(&chain(&["a", "b", "c"]), &g),
            Difficulty::Intermediate
        );
    }

    #[test]
    fn band_table_is_tunable() {
        let config = DifficultyConfig {
            bands: vec![DifficultyBand {
                below: 5.0,
                tier: Difficulty::Basic,
            }],
            ..DifficultyConfig::default()
        };
        let classifier = DifficultyClassifier::new(&config);
        assert_eq!(classifier.tier(4.9), Difficulty::Basic);
        assert_eq!(classifier.tier(5.0), Difficulty::Expert);
    }
}
