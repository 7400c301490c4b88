use crate::challenges::Challenge;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Difficulty tiers, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Tutorial,
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 5] = [
        Self::Tutorial,
        Self::Basic,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    /// Zero-based rank index
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::Tutorial => 0,
            Self::Basic => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of challenge kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    MultipleChoice,
    CodeTracing,
    FillBlank,
    CodeCompletion,
    Debugging,
    Architecture,
}

impl ChallengeType {
    pub const ALL: [Self; 6] = [
        Self::MultipleChoice,
        Self::CodeTracing,
        Self::FillBlank,
        Self::CodeCompletion,
        Self::Debugging,
        Self::Architecture,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::CodeTracing => "code_tracing",
            Self::FillBlank => "fill_blank",
            Self::CodeCompletion => "code_completion",
            Self::Debugging => "debugging",
            Self::Architecture => "architecture",
        }
    }

    /// Prefix of challenge ids
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::MultipleChoice => "mc",
            Self::CodeTracing => "trace",
            Self::FillBlank => "fill",
            Self::CodeCompletion => "complete",
            Self::Debugging => "debug",
            Self::Architecture => "arch",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty, cycle-free sequence of node ids starting at an entry point
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Chain(Vec<String>);

#[allow(clippy::len_without_is_empty)]
impl Chain {
    /// `None` when `nodes` is empty or repeats an id
    #[must_use]
    pub fn new(nodes: Vec<String>) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        let mut seen = HashSet::with_capacity(nodes.len());
        if !nodes.iter().all(|id| seen.insert(id.as_str())) {
            return None;
        }
        Some(Self(nodes))
    }

    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.0
    }

    /// First node (the entry function)
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn last(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|n| n == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Score breakdown of a ranked chain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChainScore {
    pub entry_proximity: f64,
    pub call_frequency: f64,
    pub complexity: f64,
    pub documentation: f64,
    pub total: f64,
}

/// Chain with its importance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChain {
    pub chain: Chain,
    pub score: ChainScore,
}

impl RankedChain {
    #[must_use]
    pub const fn importance_score(&self) -> f64 {
        self.score.total
    }
}

/// Stable 1-based ordering index of a level, rendered as `level_<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub u32);

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level_{}", self.0)
    }
}

impl Serialize for LevelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One unit of curriculum output
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// `call_chain.entry()`
    pub entry_function: String,
    pub call_chain: Chain,
    pub code_snippet: String,
    /// 3-5 challenges of pairwise distinct types
    pub challenges: Vec<Challenge>,
    pub objectives: Vec<String>,
    pub xp_reward: u32,
    /// Minutes
    pub estimated_time: u32,
    /// Earlier levels only
    pub prerequisites: Vec<LevelId>,
}

impl Level {
    #[must_use]
    pub fn challenge_types(&self) -> Vec<ChallengeType> {
        self.challenges.iter().map(Challenge::challenge_type).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_rejects_empty_and_repeated_nodes() {
        assert!(Chain::new(Vec::new()).is_none());
        assert!(Chain::new(vec!["a".into(), "b".into(), "a".into()]).is_none());

        let chain = Chain::new(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(chain.entry(), "a");
        assert_eq!(chain.last(), "b");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn difficulty_is_ordered_by_rank() {
        for pair in Difficulty::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].rank() + 1, pair[1].rank());
        }
    }

    #[test]
    fn level_id_renders_with_prefix() {
        assert_eq!(LevelId(3).to_string(), "level_3");
        assert_eq!(serde_json::to_string(&LevelId(3)).unwrap(), "\"level_3\"");
    }
}
