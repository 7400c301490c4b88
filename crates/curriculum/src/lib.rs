//! # CallQuest Curriculum
//!
//! Turns an immutable call graph into an ordered list of learning levels.
//!
//! ## Pipeline
//!
//! ```text
//! CallGraph
//!     │
//!     ├──> ChainRanker            maximal simple paths from entry points,
//!     │                           scored by a (signal, weight, cap) table
//!     │
//!     ├──> DifficultyClassifier   length, complexity, abstraction, dependencies
//!     │                           → Tutorial .. Expert
//!     │
//!     ├──> select_with            rule-based challenge kinds (max 5)
//!     │
//!     ├──> generate_challenge     one generator per kind; shortfalls become
//!     │                           GenerationGap values, never errors
//!     │
//!     └──> LevelGenerator         3-5 challenges per level, objectives,
//!                                 xp, time estimate, prerequisites
//! ```
//!
//! A run is a pure function of the graph and a validated [`GenerationConfig`].
//! Separate graphs can be processed on separate threads.

mod assembler;
pub mod challenges;
mod config;
mod difficulty;
mod error;
mod ranker;
mod selector;
mod types;
pub mod wire;

pub use assembler::{generate_levels, Curriculum, DroppedChain, LevelGenerator};
pub use challenges::{generate_challenge, Challenge, ChallengeSpec, GenerationContext, GenerationGap};
pub use config::{
    AbstractionWeights, ChallengeConfig, ChallengeTable, DifficultyBand, DifficultyConfig,
    DifficultySignal, GenerationConfig, RankingConfig, RankingSignal, RewardConfig, ScoreTerm,
    XpTable,
};
pub use difficulty::{calculate_difficulty, DifficultyClassifier, DifficultyScore};
pub use error::{CurriculumError, Result};
pub use ranker::{identify_core_chains, ChainRanker};
pub use selector::{
    fallback_types, select_challenge_types, select_with, MAX_CHALLENGES, MIN_CHALLENGES,
};
pub use types::{Chain, ChainScore, ChallengeType, Difficulty, Level, LevelId, RankedChain};
pub use wire::{redact_answers, to_records, ChallengeRecord, LevelRecord};
