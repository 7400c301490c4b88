use crate::command::context::CommandContext;
use crate::command::domain::{ChainSummary, ChainsPayload, CommandOutput};
use anyhow::{ensure, Result};
use callquest_curriculum::{ChainRanker, DifficultyClassifier};
use callquest_graph::to_dot;

/// Read-only views of the graph: ranked chains, metrics and DOT export
#[derive(Default)]
pub struct InspectService;

impl InspectService {
    pub fn chains(&self, payload: ChainsPayload, ctx: &CommandContext) -> Result<CommandOutput> {
        let max_chains = payload.max_chains.unwrap_or(ctx.config.max_levels);
        let max_depth = payload.max_depth.unwrap_or(ctx.config.max_depth);
        ensure!(max_chains > 0, "--max-chains must be at least 1");
        ensure!(max_depth > 0, "--max-depth must be at least 1");

        let ranker = ChainRanker::new(
            &ctx.graph,
            &ctx.config.ranking,
            max_depth,
            ctx.config.max_candidate_chains,
        );
        let classifier = DifficultyClassifier::new(&ctx.config.difficulty);
        let summaries: Vec<ChainSummary> = ranker
            .rank(max_chains)
            .into_iter()
            .enumerate()
            .map(|(i, ranked)| ChainSummary {
                rank: i + 1,
                difficulty: classifier.classify(&ranked.chain, &ctx.graph),
                chain: ranked.chain,
                score: ranked.score,
            })
            .collect();
        CommandOutput::json(&summaries)
    }

    pub fn stats(&self, ctx: &CommandContext) -> Result<CommandOutput> {
        CommandOutput::json(&ctx.graph.stats())
    }

    pub fn dot(&self, ctx: &CommandContext) -> CommandOutput {
        CommandOutput::text(to_dot(&ctx.graph))
    }
}
