//! Serializable level/challenge records for the persistence and API layers.
//!
//! Answers are carried only when explicitly requested; [`redact_answers`]
//! produces the form that may be handed to untrusted consumers.

use crate::challenges::Challenge;
use crate::error::Result;
use crate::types::{Chain, ChallengeType, Difficulty, Level, LevelId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub question: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<serde_json::Value>,
    pub hints: Vec<String>,
    pub points: u32,
}

impl ChallengeRecord {
    pub fn from_challenge(challenge: &Challenge, include_answer: bool) -> Result<Self> {
        let answer = if include_answer {
            Some(challenge.spec.answer_json()?)
        } else {
            None
        };
        Ok(Self {
            id: challenge.id.clone(),
            challenge_type: challenge.challenge_type(),
            question: challenge.spec.question_json()?,
            answer,
            hints: challenge.hints.clone(),
            points: challenge.points,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRecord {
    pub id: LevelId,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub entry_function: String,
    pub call_chain: Chain,
    pub code_snippet: String,
    pub challenges: Vec<ChallengeRecord>,
    pub objectives: Vec<String>,
    pub xp_reward: u32,
    pub estimated_time: u32,
    pub prerequisites: Vec<LevelId>,
}

impl LevelRecord {
    pub fn from_level(level: &Level, include_answers: bool) -> Result<Self> {
        let challenges = level
            .challenges
            .iter()
            .map(|c| ChallengeRecord::from_challenge(c, include_answers))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: level.id,
            name: level.name.clone(),
            description: level.description.clone(),
            difficulty: level.difficulty,
            entry_function: level.entry_function.clone(),
            call_chain: level.call_chain.clone(),
            code_snippet: level.code_snippet.clone(),
            challenges,
            objectives: level.objectives.clone(),
            xp_reward: level.xp_reward,
            estimated_time: level.estimated_time,
            prerequisites: level.prerequisites.clone(),
        })
    }
}

pub fn to_records(levels: &[Level], include_answers: bool) -> Result<Vec<LevelRecord>> {
    levels
        .iter()
        .map(|level| LevelRecord::from_level(level, include_answers))
        .collect()
}

/// Records with every `answer` removed
pub fn redact_answers(levels: &[Level]) -> Result<Vec<LevelRecord>> {
    to_records(levels, false)
}
