use crate::challenges::{generate_challenge, Challenge, GenerationContext, GenerationGap};
use crate::config::GenerationConfig;
use crate::difficulty::DifficultyClassifier;
use crate::error::{CurriculumError, Result};
use crate::ranker::ChainRanker;
use crate::selector::{fallback_types, select_with, MAX_CHALLENGES, MIN_CHALLENGES};
use crate::types::{Chain, Difficulty, Level, LevelId, RankedChain};
use callquest_graph::{node_text, CallGraph, NoSource, SourceLookup};
use serde::Serialize;

/// A ranked chain that could not be turned into a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedChain {
    pub chain: Chain,
    pub reason: String,
}

/// Outcome of a generation run: the levels plus what was skipped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curriculum {
    pub levels: Vec<Level>,
    /// Challenge slots that fell back or were skipped
    pub gaps: Vec<GenerationGap>,
    pub dropped: Vec<DroppedChain>,
}

/// Turns the top-ranked chains of one call graph into ordered levels
pub struct LevelGenerator<'a> {
    graph: &'a CallGraph,
    source: &'a dyn SourceLookup,
    config: GenerationConfig,
}

impl<'a> LevelGenerator<'a> {
    /// Validates `config` before anything is computed
    pub fn new(graph: &'a CallGraph, config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graph,
            source: &NoSource,
            config,
        })
    }

    /// Use `source` for snippets instead of metadata skeletons
    #[must_use]
    pub fn with_source(mut self, source: &'a dyn SourceLookup) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generate(&self) -> Result<Vec<Level>> {
        Ok(self.generate_curriculum()?.levels)
    }

    pub fn generate_curriculum(&self) -> Result<Curriculum> {
        let mut curriculum = Curriculum::default();

        if self.graph.entry_points().is_empty() {
            if self.config.require_entry_points {
                return Err(CurriculumError::NoEntryPoints);
            }
            log::info!("Call graph has no entry points, nothing to generate");
            return Ok(curriculum);
        }

        let ranked = ChainRanker::new(
            self.graph,
            &self.config.ranking,
            self.config.max_depth,
            self.config.max_candidate_chains,
        )
        .rank(self.config.max_levels);

        for candidate in &ranked {
            let id = LevelId(u32::try_from(curriculum.levels.len() + 1).unwrap_or(u32::MAX));
            let previous = curriculum.levels.last();
            match self.build_level(id, candidate, previous, &mut curriculum.gaps) {
                Ok(level) => curriculum.levels.push(level),
                Err(dropped) => {
                    log::warn!(
                        "Dropped chain {}: {}",
                        dropped.chain.nodes().join(" -> "),
                        dropped.reason
                    );
                    curriculum.dropped.push(dropped);
                }
            }
        }

        log::info!(
            "Generated {} levels from {} ranked chains ({} gaps, {} dropped)",
            curriculum.levels.len(),
            ranked.len(),
            curriculum.gaps.len(),
            curriculum.dropped.len()
        );
        Ok(curriculum)
    }

    fn build_level(
        &self,
        id: LevelId,
        ranked: &RankedChain,
        previous: Option<&Level>,
        gaps: &mut Vec<GenerationGap>,
    ) -> std::result::Result<Level, DroppedChain> {
        let chain = &ranked.chain;
        let difficulty = DifficultyClassifier::new(&self.config.difficulty).classify(chain, self.graph);

        let challenges = self.build_challenges(chain, difficulty, gaps);
        if challenges.len() < MIN_CHALLENGES {
            return Err(DroppedChain {
                chain: chain.clone(),
                reason: format!(
                    "only {} of {MIN_CHALLENGES} required challenges could be generated",
                    challenges.len()
                ),
            });
        }

        let start = self.graph.node_name(chain.entry());
        let end = self.graph.node_name(chain.last());
        let minutes = &self.config.rewards.minutes;

        let prerequisites = previous
            .filter(|prev| {
                self.graph
                    .is_reachable_from(prev.call_chain.iter(), chain.entry())
            })
            .map(|prev| vec![prev.id])
            .unwrap_or_default();

        let level = Level {
            id,
            name: format!("Understanding {start}"),
            description: format!("Learn how {start} works and trace its execution to {end}"),
            difficulty,
            entry_function: chain.entry().to_string(),
            call_chain: chain.clone(),
            code_snippet: self.snippet(chain),
            objectives: self.objectives(chain),
            xp_reward: self.config.rewards.xp.reward(difficulty),
            estimated_time: challenges
                .iter()
                .map(|c| minutes.get(c.challenge_type()))
                .sum(),
            challenges,
            prerequisites,
        };
        log::debug!(
            "{} '{}' ({}, challenges {:?}, {} xp)",
            level.id,
            level.name,
            level.difficulty,
            level.challenge_types(),
            level.xp_reward
        );
        Ok(level)
    }

    /// Selected kinds first, then fallbacks until the minimum is met
    fn build_challenges(
        &self,
        chain: &Chain,
        difficulty: Difficulty,
        gaps: &mut Vec<GenerationGap>,
    ) -> Vec<Challenge> {
        let ctx = GenerationContext::new(self.graph, self.source, &self.config.challenges);
        let selected = select_with(chain, difficulty, self.graph, &self.config.challenges);
        let candidates = selected
            .iter()
            .copied()
            .map(|kind| (kind, false))
            .chain(fallback_types(&selected).map(|kind| (kind, true)));

        let mut challenges = Vec::with_capacity(MAX_CHALLENGES);
        for (kind, is_fallback) in candidates {
            if challenges.len() >= MAX_CHALLENGES
                || (is_fallback && challenges.len() >= MIN_CHALLENGES)
            {
                break;
            }
            match generate_challenge(kind, chain, &ctx) {
                Ok(challenge) => challenges.push(challenge),
                Err(gap) => {
                    log::warn!("{gap}");
                    gaps.push(gap);
                }
            }
        }
        challenges
    }

    fn snippet(&self, chain: &Chain) -> String {
        chain
            .iter()
            .filter_map(|id| self.graph.node(id))
            .map(|node| node_text(self.graph, self.source, node))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Start-to-end objective first, at most three in total
    fn objectives(&self, chain: &Chain) -> Vec<String> {
        let nodes: Vec<_> = chain.iter().filter_map(|id| self.graph.node(id)).collect();
        let mut objectives = vec![format!(
            "Trace execution from {} to {}",
            self.graph.node_name(chain.entry()),
            self.graph.node_name(chain.last())
        )];

        if let Some(node) = nodes.iter().find(|n| !n.decorators.is_empty()) {
            let decorators = node
                .decorators
                .iter()
                .map(|d| format!("@{}", d.trim_start_matches('@')))
                .collect::<Vec<_>>()
                .join(", ");
            objectives.push(format!("Explain what {decorators} adds to {}", node.name));
        }
        if let Some(node) = nodes.iter().find(|n| n.is_async) {
            objectives.push(format!("Follow the async flow through {}", node.name));
        }
        if let Some(node) = nodes
            .iter()
            .find(|n| n.complexity >= self.config.challenges.high_complexity)
        {
            objectives.push(format!(
                "Work through the branching logic in {}",
                node.name
            ));
        }

        objectives.truncate(3);
        objectives
    }
}

/// Levels for the `max_levels` most important chains of `graph` under default tunables
pub fn generate_levels(graph: &CallGraph, max_levels: usize) -> Result<Vec<Level>> {
    LevelGenerator::new(graph, GenerationConfig::default().with_max_levels(max_levels))?.generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use callquest_graph::{CallGraphBuilder, CodeNode, NodeKind, Parameter};

    fn rich(id: &str) -> CodeNode {
        let mut node = CodeNode::new(id, id, NodeKind::Function);
        node.parameters = vec![Parameter::new("request")];
        node.return_type = Some("Response".to_string());
        node.decorators = vec!["traced".to_string()];
        node.complexity = 11;
        node
    }

    #[test]
    fn objectives_start_with_trace_and_are_capped() {
        let mut a = rich("a");
        a.is_async = true;
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder
            .add_node(a)
            .add_node(rich("b"))
            .add_call("a", "b")
            .add_entry_point("a");
        let g = builder.build().unwrap();
        let generator = LevelGenerator::new(&g, GenerationConfig::default()).unwrap();
        let chain = Chain::new(vec!["a".into(), "b".into()]).unwrap();

        let objectives = generator.objectives(&chain);
        assert_eq!(
            objectives,
            vec![
                "Trace execution from a to b".to_string(),
                "Explain what @traced adds to a".to_string(),
                "Follow the async flow through a".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_invalid_config_before_running() {
        let mut builder = CallGraphBuilder::new();
        builder.add_node(rich("a")).add_entry_point("a");
        let g = builder.build().unwrap();
        let err = LevelGenerator::new(&g, GenerationConfig::default().with_max_levels(0));
        assert!(matches!(err, Err(CurriculumError::Configuration(_))));
    }

    #[test]
    fn estimated_time_sums_challenge_minutes() {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        builder
            .add_node(rich("a"))
            .add_node(rich("b"))
            .add_call("a", "b")
            .add_entry_point("a");
        let g = builder.build().unwrap();
        let generator = LevelGenerator::new(&g, GenerationConfig::default()).unwrap();

        let levels = generator.generate().unwrap();
        assert_eq!(levels.len(), 1);
        let level = &levels[0];
        let minutes = &generator.config().rewards.minutes;
        let expected: u32 = level
            .challenges
            .iter()
            .map(|c| minutes.get(c.challenge_type()))
            .sum();
        assert_eq!(level.estimated_time, expected);
        assert!((3..=5).contains(&level.challenges.len()));
    }
}
