use super::hints::HintLadder;
use super::{
    stable_hash, Challenge, ChallengeSpec, GenerationContext, GenerationGap, GenerationResult,
};
use crate::types::{Chain, ChallengeType};
use serde::Serialize;

const COMPARISON_FLIPS: [(&str, &str); 8] = [
    (" is not ", " is "),
    (" is ", " is not "),
    (" == ", " != "),
    (" != ", " == "),
    (" <= ", " > "),
    (" >= ", " < "),
    (" < ", " >= "),
    (" > ", " <= "),
];

/// Single-line fault injected into otherwise correct code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    FlipComparison,
    SwapCall,
    DropAwait,
    ReturnNone,
    FlipBoolean,
    SkipCall,
}

impl MutationKind {
    pub const ALL: [Self; 6] = [
        Self::FlipComparison,
        Self::SwapCall,
        Self::DropAwait,
        Self::ReturnNone,
        Self::FlipBoolean,
        Self::SkipCall,
    ];

    const fn describe(self) -> &'static str {
        match self {
            Self::FlipComparison => "an inverted comparison",
            Self::SwapCall => "a call to the wrong function",
            Self::DropAwait => "a missing await",
            Self::ReturnNone => "a discarded return value",
            Self::FlipBoolean => "a flipped boolean literal",
            Self::SkipCall => "a call that never happens",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebuggingQuestion {
    pub prompt: String,
    pub function: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebuggingAnswer {
    /// 1-based line of `code` holding the bug
    pub line: usize,
    pub buggy_line: String,
    pub fixed_line: String,
    pub mutation: MutationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggingSpec {
    pub question: DebuggingQuestion,
    pub answer: DebuggingAnswer,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::Debugging;
    let nodes = ctx.nodes(chain);
    // Highest complexity, earliest in the chain on ties
    let Some(node) = nodes
        .iter()
        .rev()
        .max_by_key(|n| n.complexity)
        .copied()
    else {
        return Err(GenerationGap::new(kind, chain, "chain has no known nodes"));
    };

    let text = ctx.text(node);
    let lines: Vec<&str> = text.lines().collect();
    let callees: Vec<&str> = node
        .calls
        .iter()
        .map(|id| ctx.graph.node_name(id))
        .collect();

    #[allow(clippy::cast_possible_truncation)]
    let start = (stable_hash(&[&node.id, "debugging"]) % MutationKind::ALL.len() as u64) as usize;
    let found = (0..MutationKind::ALL.len())
        .map(|offset| MutationKind::ALL[(start + offset) % MutationKind::ALL.len()])
        .find_map(|mutation| {
            lines.iter().enumerate().find_map(|(i, line)| {
                if !is_body_line(line) {
                    return None;
                }
                mutate(mutation, line, &callees).map(|buggy| (mutation, i, buggy))
            })
        });
    let Some((mutation, index, buggy)) = found else {
        return Err(GenerationGap::new(
            kind,
            chain,
            format!("no mutable line in {}", node.name),
        ));
    };

    let code = lines
        .iter()
        .enumerate()
        .map(|(i, line)| if i == index { buggy.as_str() } else { *line })
        .collect::<Vec<_>>()
        .join("\n");

    let hints = HintLadder::new(ctx.graph)
        .about(node)
        .then(format!(
            "Look for {} around line {}",
            mutation.describe(),
            index + 1
        ))
        .build();

    let spec = DebuggingSpec {
        question: DebuggingQuestion {
            prompt: format!(
                "`{}` has one wrong line. Find it and write the fix.",
                node.name
            ),
            function: node.name.clone(),
            code,
        },
        answer: DebuggingAnswer {
            line: index + 1,
            buggy_line: buggy,
            fixed_line: lines[index].to_string(),
            mutation,
        },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::Debugging(spec),
        hints,
        ctx.points(kind),
    ))
}

fn is_body_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !(trimmed.is_empty()
        || trimmed.starts_with('@')
        || trimmed.starts_with('#')
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("def ")
        || trimmed.starts_with("async def ")
        || trimmed.starts_with("class "))
}

/// Mutated copy of `line`, `None` when `mutation` does not apply
fn mutate(mutation: MutationKind, line: &str, callees: &[&str]) -> Option<String> {
    match mutation {
        MutationKind::FlipComparison => COMPARISON_FLIPS
            .iter()
            .find(|(from, _)| line.contains(from))
            .map(|(from, to)| line.replacen(from, to, 1)),
        MutationKind::SwapCall => {
            let (pos, name) = find_call(line, callees)?;
            let other = callees.iter().find(|other| **other != name)?;
            Some(format!("{}{other}{}", &line[..pos], &line[pos + name.len()..]))
        }
        MutationKind::DropAwait => line
            .contains("await ")
            .then(|| line.replacen("await ", "", 1)),
        MutationKind::ReturnNone => {
            let trimmed = line.trim_start();
            let expr = trimmed.strip_prefix("return ")?.trim();
            if expr == "None" || expr.is_empty() {
                return None;
            }
            let indent = &line[..line.len() - trimmed.len()];
            Some(format!("{indent}return None"))
        }
        MutationKind::FlipBoolean => replace_word(line, "True", "False")
            .or_else(|| replace_word(line, "False", "True")),
        MutationKind::SkipCall => {
            find_call(line, callees)?;
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            Some(format!("{indent}pass"))
        }
    }
}

/// Byte offset and name of the first callee invoked on `line`
fn find_call<'c>(line: &str, callees: &[&'c str]) -> Option<(usize, &'c str)> {
    callees
        .iter()
        .filter_map(|name| {
            line.match_indices(name).find_map(|(pos, _)| {
                let before = line[..pos].chars().next_back();
                let boundary = before.map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
                (boundary && line[pos + name.len()..].starts_with('(')).then_some((pos, *name))
            })
        })
        .min_by_key(|(pos, _)| *pos)
}

fn replace_word(line: &str, word: &str, with: &str) -> Option<String> {
    line.match_indices(word).find_map(|(pos, _)| {
        let before = line[..pos].chars().next_back();
        let after = line[pos + word.len()..].chars().next();
        let is_ident = |c: char| c.is_alphanumeric() || c == '_';
        (!before.is_some_and(is_ident) && !after.is_some_and(is_ident))
            .then(|| format!("{}{with}{}", &line[..pos], &line[pos + word.len()..]))
    })
}
