//! Challenge generators, one per [`ChallengeType`].
//!
//! Every generator is a pure function of a chain and the graph. A generator
//! that cannot build a valid challenge reports a [`GenerationGap`] instead.

mod architecture;
mod completion;
mod debugging;
mod fill_blank;
mod hints;
mod multiple_choice;
mod tracing;

pub use architecture::{ArchitectureAnswer, ArchitectureQuestion, ArchitectureSpec, DesignPattern};
pub use completion::{CodeCompletionAnswer, CodeCompletionQuestion, CodeCompletionSpec};
pub use debugging::{DebuggingAnswer, DebuggingQuestion, DebuggingSpec, MutationKind};
pub use fill_blank::{BlankKind, BlankedToken, FillBlankAnswer, FillBlankQuestion, FillBlankSpec};
pub use multiple_choice::{
    MultipleChoiceAnswer, MultipleChoiceQuestion, MultipleChoiceSpec, QuestionTemplate,
};
pub use tracing::{CodeTracingAnswer, CodeTracingQuestion, CodeTracingSpec, TraceStep};

use crate::config::ChallengeConfig;
use crate::types::{Chain, ChallengeType};
use callquest_graph::{CallGraph, CodeNode, SourceLookup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Question and ground truth of one challenge, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeSpec {
    MultipleChoice(MultipleChoiceSpec),
    CodeTracing(CodeTracingSpec),
    FillBlank(FillBlankSpec),
    CodeCompletion(CodeCompletionSpec),
    Debugging(DebuggingSpec),
    Architecture(ArchitectureSpec),
}

impl ChallengeSpec {
    #[must_use]
    pub const fn challenge_type(&self) -> ChallengeType {
        match self {
            Self::MultipleChoice(_) => ChallengeType::MultipleChoice,
            Self::CodeTracing(_) => ChallengeType::CodeTracing,
            Self::FillBlank(_) => ChallengeType::FillBlank,
            Self::CodeCompletion(_) => ChallengeType::CodeCompletion,
            Self::Debugging(_) => ChallengeType::Debugging,
            Self::Architecture(_) => ChallengeType::Architecture,
        }
    }

    pub fn question_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::MultipleChoice(spec) => serde_json::to_value(&spec.question),
            Self::CodeTracing(spec) => serde_json::to_value(&spec.question),
            Self::FillBlank(spec) => serde_json::to_value(&spec.question),
            Self::CodeCompletion(spec) => serde_json::to_value(&spec.question),
            Self::Debugging(spec) => serde_json::to_value(&spec.question),
            Self::Architecture(spec) => serde_json::to_value(&spec.question),
        }
    }

    pub fn answer_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::MultipleChoice(spec) => serde_json::to_value(&spec.answer),
            Self::CodeTracing(spec) => serde_json::to_value(&spec.answer),
            Self::FillBlank(spec) => serde_json::to_value(&spec.answer),
            Self::CodeCompletion(spec) => serde_json::to_value(&spec.answer),
            Self::Debugging(spec) => serde_json::to_value(&spec.answer),
            Self::Architecture(spec) => serde_json::to_value(&spec.answer),
        }
    }
}

/// One gradeable question attached to a level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Unique within a level
    pub id: String,
    pub spec: ChallengeSpec,
    /// Vaguest first, never empty
    pub hints: Vec<String>,
    pub points: u32,
}

impl Challenge {
    fn new(chain: &Chain, spec: ChallengeSpec, hints: Vec<String>, points: u32) -> Self {
        let kind = spec.challenge_type();
        Self {
            id: format!("{}_{}", kind.id_prefix(), chain.entry()),
            spec,
            hints,
            points,
        }
    }

    #[must_use]
    pub const fn challenge_type(&self) -> ChallengeType {
        self.spec.challenge_type()
    }
}

/// Labelled option of a choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub key: String,
    pub text: String,
}

/// A challenge slot that could not be filled for a chain
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("cannot generate {challenge_type} challenge for chain at {entry}: {reason}")]
pub struct GenerationGap {
    pub challenge_type: ChallengeType,
    pub entry: String,
    pub reason: String,
}

impl GenerationGap {
    fn new(challenge_type: ChallengeType, chain: &Chain, reason: impl Into<String>) -> Self {
        Self {
            challenge_type,
            entry: chain.entry().to_string(),
            reason: reason.into(),
        }
    }
}

/// Read-only inputs shared by all generators of a run
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    pub graph: &'a CallGraph,
    pub source: &'a dyn SourceLookup,
    pub config: &'a ChallengeConfig,
}

impl<'a> GenerationContext<'a> {
    #[must_use]
    pub fn new(
        graph: &'a CallGraph,
        source: &'a dyn SourceLookup,
        config: &'a ChallengeConfig,
    ) -> Self {
        Self {
            graph,
            source,
            config,
        }
    }

    fn nodes(&self, chain: &Chain) -> Vec<&'a CodeNode> {
        chain.iter().filter_map(|id| self.graph.node(id)).collect()
    }

    fn text(&self, node: &CodeNode) -> String {
        callquest_graph::node_text(self.graph, self.source, node)
    }

    fn points(&self, kind: ChallengeType) -> u32 {
        self.config.points.get(kind)
    }
}

pub type GenerationResult = std::result::Result<Challenge, GenerationGap>;

/// Build one challenge of `kind` for `chain`
pub fn generate_challenge(
    kind: ChallengeType,
    chain: &Chain,
    ctx: &GenerationContext<'_>,
) -> GenerationResult {
    match kind {
        ChallengeType::MultipleChoice => multiple_choice::generate(chain, ctx),
        ChallengeType::CodeTracing => tracing::generate(chain, ctx),
        ChallengeType::FillBlank => fill_blank::generate(chain, ctx),
        ChallengeType::CodeCompletion => completion::generate(chain, ctx),
        ChallengeType::Debugging => debugging::generate(chain, ctx),
        ChallengeType::Architecture => architecture::generate(chain, ctx),
    }
}

const OPTION_KEYS: [&str; 4] = ["a", "b", "c", "d"];

/// Place the correct answer among three distractors at a seed-derived slot.
/// Returns the options and the key of the correct one.
fn arrange_options(correct: &str, distractors: &[String], seed: u64) -> (Vec<ChoiceOption>, String) {
    #[allow(clippy::cast_possible_truncation)]
    let slot = (seed % OPTION_KEYS.len() as u64) as usize;
    let mut texts: Vec<&str> = distractors.iter().map(String::as_str).collect();
    texts.insert(slot.min(texts.len()), correct);

    let options = texts
        .into_iter()
        .zip(OPTION_KEYS)
        .map(|(text, key)| ChoiceOption {
            key: key.to_string(),
            text: text.to_string(),
        })
        .collect();
    (options, OPTION_KEYS[slot.min(distractors.len())].to_string())
}

/// First `count` distinct candidates that differ from `correct`
fn pick_distractors<I>(correct: &str, candidates: I, count: usize) -> Option<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::from([correct.to_lowercase()]);
    let picked: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| !candidate.trim().is_empty())
        .filter(|candidate| seen.insert(candidate.to_lowercase()))
        .take(count)
        .collect();
    (picked.len() == count).then_some(picked)
}

/// FNV-1a over the parts, separated so that `["ab", "c"]` != `["a", "bc"]`
fn stable_hash(parts: &[&str]) -> u64 {
    const OFFSET: u64 = 14695981039346656037;
    const PRIME: u64 = 1099511628211;
    let mut hash = OFFSET;
    for part in parts {
        for b in part.bytes().chain(std::iter::once(0xff)) {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

/// Deterministic order of `items` keyed by `stable_hash(salt, key(item))`
fn shuffled_by<T, F>(items: &mut [T], salt: &str, key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| (stable_hash(&[salt, key(item)]), key(item).to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrange_options_places_correct_answer_at_seed_slot() {
        let distractors = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        for seed in 0..8 {
            let (options, key) = arrange_options("ok", &distractors, seed);
            assert_eq!(options.len(), 4);
            let correct = options.iter().find(|o| o.key == key).unwrap();
            assert_eq!(correct.text, "ok");
        }
    }

    #[test]
    fn pick_distractors_skips_duplicates_and_correct_answer() {
        let picked = pick_distractors(
            "Run",
            ["run", "a", "A", "b", "c", "d"].map(String::from),
            3,
        )
        .unwrap();
        assert_eq!(picked, vec!["a", "b", "c"]);
        assert!(pick_distractors("x", ["y".to_string()], 3).is_none());
    }

    #[test]
    fn stable_hash_separates_parts() {
        assert_ne!(stable_hash(&["ab", "c"]), stable_hash(&["a", "bc"]));
        assert_eq!(stable_hash(&["a"]), stable_hash(&["a"]));
    }
}
