use callquest_curriculum::{
    Chain, ChainScore, Difficulty, DroppedChain, GenerationGap, LevelRecord,
};
use serde::Serialize;
use std::path::PathBuf;

/// Where the call graph comes from and how strictly it is checked
#[derive(Debug, Clone)]
pub struct GraphSource {
    pub path: PathBuf,
    /// Derive missing `calls`/`called_by` halves instead of rejecting them
    pub lenient: bool,
    /// Fill an empty entry-point list with uncalled functions
    pub detect_entry_points: bool,
}

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub graph: GraphSource,
    pub config: Option<PathBuf>,
    pub action: CommandAction,
}

#[derive(Debug, Clone)]
pub enum CommandAction {
    Generate(GeneratePayload),
    Chains(ChainsPayload),
    Stats,
    Dot,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratePayload {
    pub max_levels: Option<usize>,
    pub source_root: Option<PathBuf>,
    pub redact_answers: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChainsPayload {
    pub max_chains: Option<usize>,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub levels: Vec<LevelRecord>,
    pub gaps: Vec<GenerationGap>,
    pub dropped: Vec<DroppedChain>,
}

#[derive(Debug, Serialize)]
pub struct ChainSummary {
    pub rank: usize,
    pub chain: Chain,
    pub score: ChainScore,
    pub difficulty: Difficulty,
}

/// Rendered command result, written verbatim to the output sink
#[derive(Debug)]
pub struct CommandOutput {
    pub body: String,
}

impl CommandOutput {
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self {
            body: serde_json::to_string_pretty(value)?,
        })
    }

    pub const fn text(body: String) -> Self {
        Self { body }
    }
}
