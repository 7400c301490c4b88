use crate::error::{CurriculumError, Result};
use crate::types::{ChallengeType, Difficulty};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One weighted scoring signal: `min(cap, weight * raw)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTerm<S> {
    pub signal: S,
    pub weight: f64,
    #[serde(default)]
    pub cap: Option<f64>,
}

impl<S> ScoreTerm<S> {
    pub const fn new(signal: S, weight: f64, cap: Option<f64>) -> Self {
        Self {
            signal,
            weight,
            cap,
        }
    }

    #[must_use]
    pub fn apply(&self, raw: f64) -> f64 {
        let value = self.weight * raw;
        self.cap.map_or(value, |cap| value.min(cap))
    }

    fn validate(&self, table: &str) -> Result<()>
    where
        S: std::fmt::Debug,
    {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CurriculumError::config(format!(
                "{table}: weight of {:?} must be a finite non-negative number",
                self.signal
            )));
        }
        if let Some(cap) = self.cap {
            if !cap.is_finite() || cap < 0.0 {
                return Err(CurriculumError::config(format!(
                    "{table}: cap of {:?} must be a finite non-negative number",
                    self.signal
                )));
            }
        }
        Ok(())
    }
}

/// Signals combined into a chain's importance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingSignal {
    /// `sum(decay^i)` over chain positions
    EntryProximity,
    /// Mean number of callers per chain node
    CallFrequency,
    /// Mean complexity per chain node
    Complexity,
    /// Fraction of documented chain nodes
    Documentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub terms: Vec<ScoreTerm<RankingSignal>>,
    pub proximity_decay: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            terms: vec![
                ScoreTerm::new(RankingSignal::EntryProximity, 40.0, None),
                ScoreTerm::new(RankingSignal::CallFrequency, 5.0, Some(30.0)),
                ScoreTerm::new(RankingSignal::Complexity, 1.0, Some(20.0)),
                ScoreTerm::new(RankingSignal::Documentation, 10.0, Some(10.0)),
            ],
            proximity_decay: 0.7,
        }
    }
}

/// Signals combined into a chain's difficulty score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultySignal {
    /// Number of chain nodes
    Length,
    /// Mean complexity per chain node
    Complexity,
    /// Sum of abstraction units (decorators, async, generators)
    Abstraction,
    /// Total external dependencies across chain nodes
    Dependencies,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractionWeights {
    pub decorator: f64,
    pub async_fn: f64,
    pub generator: f64,
}

impl Default for AbstractionWeights {
    fn default() -> Self {
        Self {
            decorator: 3.0,
            async_fn: 5.0,
            generator: 5.0,
        }
    }
}

/// Scores strictly below `below` map to `tier`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBand {
    pub below: f64,
    pub tier: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub terms: Vec<ScoreTerm<DifficultySignal>>,
    pub abstraction: AbstractionWeights,
    /// Checked in order; scores past the last band are EXPERT
    pub bands: Vec<DifficultyBand>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            terms: vec![
                ScoreTerm::new(DifficultySignal::Length, 4.0, Some(20.0)),
                ScoreTerm::new(DifficultySignal::Complexity, 2.0, Some(30.0)),
                ScoreTerm::new(DifficultySignal::Abstraction, 1.0, Some(25.0)),
                ScoreTerm::new(DifficultySignal::Dependencies, 2.0, Some(25.0)),
            ],
            abstraction: AbstractionWeights::default(),
            bands: vec![
                DifficultyBand {
                    below: 20.0,
                    tier: Difficulty::Tutorial,
                },
                DifficultyBand {
                    below: 40.0,
                    tier: Difficulty::Basic,
                },
                DifficultyBand {
                    below: 60.0,
                    tier: Difficulty::Intermediate,
                },
                DifficultyBand {
                    below: 80.0,
                    tier: Difficulty::Advanced,
                },
            ],
        }
    }
}

/// One value per challenge kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTable<T> {
    pub multiple_choice: T,
    pub code_tracing: T,
    pub fill_blank: T,
    pub code_completion: T,
    pub debugging: T,
    pub architecture: T,
}

impl<T: Copy> ChallengeTable<T> {
    #[must_use]
    pub const fn get(&self, kind: ChallengeType) -> T {
        match kind {
            ChallengeType::MultipleChoice => self.multiple_choice,
            ChallengeType::CodeTracing => self.code_tracing,
            ChallengeType::FillBlank => self.fill_blank,
            ChallengeType::CodeCompletion => self.code_completion,
            ChallengeType::Debugging => self.debugging,
            ChallengeType::Architecture => self.architecture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Code tracing is selected for chains at least this long
    pub tracing_min_chain_len: usize,
    /// Debugging is selected when mean chain complexity exceeds this
    pub debugging_min_complexity: f64,
    /// Nodes at or above this complexity produce a branching objective
    pub high_complexity: u32,
    /// Upper bound on the share of word tokens a fill-blank may hide
    pub max_blank_fraction: f64,
    pub max_blanks: usize,
    pub points: ChallengeTable<u32>,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            tracing_min_chain_len: 3,
            debugging_min_complexity: 10.0,
            high_complexity: 10,
            max_blank_fraction: 0.3,
            max_blanks: 5,
            points: ChallengeTable {
                multiple_choice: 10,
                code_tracing: 15,
                fill_blank: 12,
                code_completion: 20,
                debugging: 15,
                architecture: 25,
            },
        }
    }
}

/// XP reward per difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpTable {
    pub tutorial: u32,
    pub basic: u32,
    pub intermediate: u32,
    pub advanced: u32,
    pub expert: u32,
}

impl Default for XpTable {
    fn default() -> Self {
        Self {
            tutorial: 50,
            basic: 100,
            intermediate: 150,
            advanced: 200,
            expert: 300,
        }
    }
}

impl XpTable {
    #[must_use]
    pub const fn reward(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Tutorial => self.tutorial,
            Difficulty::Basic => self.basic,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
            Difficulty::Expert => self.expert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub xp: XpTable,
    /// Estimated minutes per challenge kind
    pub minutes: ChallengeTable<u32>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            xp: XpTable::default(),
            minutes: ChallengeTable {
                multiple_choice: 2,
                code_tracing: 4,
                fill_blank: 3,
                code_completion: 6,
                debugging: 5,
                architecture: 5,
            },
        }
    }
}

/// Tunables of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_levels: usize,
    /// Maximum chain length in nodes
    pub max_depth: usize,
    /// Stop path enumeration after this many candidate chains
    pub max_candidate_chains: usize,
    /// Fail instead of returning no levels when the graph has no entry points
    pub require_entry_points: bool,
    pub ranking: RankingConfig,
    pub difficulty: DifficultyConfig,
    pub challenges: ChallengeConfig,
    pub rewards: RewardConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            max_depth: 5,
            max_candidate_chains: 10_000,
            require_entry_points: false,
            ranking: RankingConfig::default(),
            difficulty: DifficultyConfig::default(),
            challenges: ChallengeConfig::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading generation config from {}", path.as_ref().display());
        Self::from_toml_str(&raw)
    }

    #[must_use]
    pub const fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Reject tunables that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_levels == 0 {
            return Err(CurriculumError::config("max_levels must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(CurriculumError::config("max_depth must be at least 1"));
        }
        if self.max_candidate_chains == 0 {
            return Err(CurriculumError::config(
                "max_candidate_chains must be at least 1",
            ));
        }

        let decay = self.ranking.proximity_decay;
        if !decay.is_finite() || decay <= 0.0 || decay > 1.0 {
            return Err(CurriculumError::config(
                "ranking.proximity_decay must be in (0, 1]",
            ));
        }
        for term in &self.ranking.terms {
            term.validate("ranking.terms")?;
        }
        for term in &self.difficulty.terms {
            term.validate("difficulty.terms")?;
        }
        let abstraction = &self.difficulty.abstraction;
        for (name, weight) in [
            ("decorator", abstraction.decorator),
            ("async_fn", abstraction.async_fn),
            ("generator", abstraction.generator),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CurriculumError::config(format!(
                    "difficulty.abstraction.{name} must be a finite non-negative number"
                )));
            }
        }
        self.validate_bands()?;

        let challenges = &self.challenges;
        if !(challenges.max_blank_fraction > 0.0 && challenges.max_blank_fraction <= 1.0) {
            return Err(CurriculumError::config(
                "challenges.max_blank_fraction must be in (0, 1]",
            ));
        }
        if challenges.max_blanks == 0 {
            return Err(CurriculumError::config(
                "challenges.max_blanks must be at least 1",
            ));
        }
        if !challenges.debugging_min_complexity.is_finite() {
            return Err(CurriculumError::config(
                "challenges.debugging_min_complexity must be finite",
            ));
        }
        for kind in ChallengeType::ALL {
            if challenges.points.get(kind) == 0 {
                return Err(CurriculumError::config(format!(
                    "challenges.points.{kind} must be positive"
                )));
            }
            if self.rewards.minutes.get(kind) == 0 {
                return Err(CurriculumError::config(format!(
                    "rewards.minutes.{kind} must be positive"
                )));
            }
        }

        let xp = &self.rewards.xp;
        if xp.reward(Difficulty::Tutorial) == 0 {
            return Err(CurriculumError::config("rewards.xp values must be positive"));
        }
        for pair in Difficulty::ALL.windows(2) {
            if xp.reward(pair[1]) < xp.reward(pair[0]) {
                return Err(CurriculumError::config(format!(
                    "rewards.xp.{} must not be lower than rewards.xp.{}",
                    pair[1], pair[0]
                )));
            }
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<()> {
        let bands = &self.difficulty.bands;
        for band in bands {
            if !band.below.is_finite() {
                return Err(CurriculumError::config(
                    "difficulty.bands thresholds must be finite",
                ));
            }
        }
        for pair in bands.windows(2) {
            if pair[1].below <= pair[0].below || pair[1].tier <= pair[0].tier {
                return Err(CurriculumError::config(
                    "difficulty.bands must be strictly increasing in threshold and tier",
                ));
            }
        }
        if bands.last().is_some_and(|band| band.tier == Difficulty::Expert) {
            return Err(CurriculumError::config(
                "difficulty.bands must not list expert; it is the open-ended top tier",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GenerationConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GenerationConfig::from_toml_str(
            r#"
max_levels = 4

[rewards.xp]
expert = 400
"#,
        )
        .unwrap();

        assert_eq!(config.max_levels, 4);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.rewards.xp.expert, 400);
        assert_eq!(config.rewards.xp.tutorial, 50);
    }

    #[test]
    fn toml_can_replace_scoring_tables() {
        let config = GenerationConfig::from_toml_str(
            r#"
[ranking]
proximity_decay = 0.5
terms = [
    { signal = "entry_proximity", weight = 10.0 },
    { signal = "complexity", weight = 2.0, cap = 8.0 },
]

[[difficulty.bands]]
below = 50.0
tier = "basic"
"#,
        )
        .unwrap();

        assert_eq!(config.ranking.terms.len(), 2);
        assert_eq!(config.ranking.terms[1].cap, Some(8.0));
        assert_eq!(config.difficulty.bands.len(), 1);
        assert_eq!(config.difficulty.bands[0].tier, Difficulty::Basic);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = GenerationConfig::default().with_max_levels(0);
        assert!(matches!(
            config.validate(),
            Err(CurriculumError::Configuration(_))
        ));

        let config = GenerationConfig {
            max_depth: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CurriculumError::Configuration(_))
        ));
    }

    #[test]
    fn decreasing_xp_is_rejected() {
        let mut config = GenerationConfig::default();
        config.rewards.xp.advanced = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rewards.xp.advanced"));
    }

    #[test]
    fn unordered_bands_are_rejected() {
        let mut config = GenerationConfig::default();
        config.difficulty.bands.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_blank_fraction_is_rejected() {
        let mut config = GenerationConfig::default();
        config.challenges.max_blank_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn score_term_caps_weighted_value() {
        let term = ScoreTerm::new(RankingSignal::CallFrequency, 5.0, Some(30.0));
        assert_eq!(term.apply(2.0), 10.0);
        assert_eq!(term.apply(10.0), 30.0);
        let uncapped = ScoreTerm::new(RankingSignal::EntryProximity, 40.0, None);
        assert_eq!(uncapped.apply(2.0), 80.0);
    }
}
