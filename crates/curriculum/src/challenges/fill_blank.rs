use super::hints::HintLadder;
use super::{Challenge, ChallengeSpec, GenerationContext, GenerationGap, GenerationResult};
use crate::types::{Chain, ChallengeType};
use callquest_graph::CodeNode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Identifier-shaped word tokens
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

const CONTROL_KEYWORDS: [&str; 17] = [
    "if", "elif", "else", "for", "while", "return", "yield", "await", "async", "with", "try",
    "except", "finally", "raise", "break", "continue", "lambda",
];

/// Why a token was chosen as a blank, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankKind {
    Decorator,
    ReturnValue,
    Keyword,
    CallTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlankedToken {
    /// 1-based, matches the `__n__` placeholder
    pub index: usize,
    pub text: String,
    pub kind: BlankKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillBlankQuestion {
    pub prompt: String,
    pub function: String,
    pub code: String,
    pub blank_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillBlankAnswer {
    pub blanks: Vec<BlankedToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillBlankSpec {
    pub question: FillBlankQuestion,
    pub answer: FillBlankAnswer,
}

struct Token<'t> {
    start: usize,
    end: usize,
    text: &'t str,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::FillBlank;
    let found = ctx.nodes(chain).into_iter().find_map(|node| {
        let text = ctx.text(node);
        let (code, blanks) = blank_out(&text, node, ctx)?;
        Some((node, code, blanks))
    });
    let Some((node, code, blanks)) = found else {
        return Err(GenerationGap::new(
            kind,
            chain,
            "no node has enough tokens to blank",
        ));
    };

    let mut kinds: Vec<&str> = blanks.iter().map(|b| kind_label(b.kind)).collect();
    kinds.dedup();
    let hints = HintLadder::new(ctx.graph)
        .about(node)
        .then(format!(
            "{} blank(s), hiding: {}",
            blanks.len(),
            kinds.join(", ")
        ))
        .build();

    let spec = FillBlankSpec {
        question: FillBlankQuestion {
            prompt: format!("Fill in the blanks in `{}`", node.name),
            function: node.name.clone(),
            code,
            blank_count: blanks.len(),
        },
        answer: FillBlankAnswer { blanks },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::FillBlank(spec),
        hints,
        ctx.points(kind),
    ))
}

const fn kind_label(kind: BlankKind) -> &'static str {
    match kind {
        BlankKind::Decorator => "a decorator name",
        BlankKind::ReturnValue => "the return value",
        BlankKind::Keyword => "a control keyword",
        BlankKind::CallTarget => "a called function",
    }
}

/// Blank the highest-priority key tokens of `text` within the configured budget
fn blank_out(
    text: &str,
    node: &CodeNode,
    ctx: &GenerationContext<'_>,
) -> Option<(String, Vec<BlankedToken>)> {
    let tokens: Vec<Token<'_>> = WORD
        .find_iter(text)
        .map(|m| Token {
            start: m.start(),
            end: m.end(),
            text: m.as_str(),
        })
        .collect();

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let budget = ((tokens.len() as f64 * ctx.config.max_blank_fraction).floor() as usize)
        .min(ctx.config.max_blanks);
    if budget == 0 {
        return None;
    }

    let callee_names: Vec<&str> = node
        .calls
        .iter()
        .map(|id| ctx.graph.node_name(id))
        .collect();

    // (kind, first token, last token); dotted decorators span several tokens
    let mut candidates: Vec<(BlankKind, usize, usize)> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let mut last = i;
        let kind = if text[..token.start].ends_with('@') {
            while last + 1 < tokens.len()
                && &text[tokens[last].end..tokens[last + 1].start] == "."
            {
                last += 1;
            }
            Some(BlankKind::Decorator)
        } else if i > 0
            && tokens[i - 1].text == "return"
            && text[tokens[i - 1].end..token.start].trim().is_empty()
            && !CONTROL_KEYWORDS.contains(&token.text)
        {
            Some(BlankKind::ReturnValue)
        } else if CONTROL_KEYWORDS.contains(&token.text) {
            Some(BlankKind::Keyword)
        } else if text[token.end..].starts_with('(') && callee_names.contains(&token.text) {
            Some(BlankKind::CallTarget)
        } else {
            None
        };
        if let Some(kind) = kind {
            candidates.push((kind, i, last));
        }
        i = last + 1;
    }
    if candidates.is_empty() {
        return None;
    }

    candidates.sort();
    candidates.truncate(budget);
    candidates.sort_by_key(|&(_, first, _)| first);

    let mut code = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut blanks = Vec::with_capacity(candidates.len());
    for (n, (kind, first, last)) in candidates.into_iter().enumerate() {
        let (start, end) = (tokens[first].start, tokens[last].end);
        code.push_str(&text[cursor..start]);
        code.push_str(&format!("__{}__", n + 1));
        cursor = end;
        blanks.push(BlankedToken {
            index: n + 1,
            text: text[start..end].to_string(),
            kind,
        });
    }
    code.push_str(&text[cursor..]);
    Some((code, blanks))
}
