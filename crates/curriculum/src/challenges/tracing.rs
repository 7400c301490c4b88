use super::hints::HintLadder;
use super::{Challenge, ChallengeSpec, GenerationContext, GenerationGap, GenerationResult};
use crate::types::{Chain, ChallengeType};
use serde::Serialize;

/// One position of the traced path; `function` is `None` when blanked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub step: usize,
    pub function: Option<String>,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTracingQuestion {
    pub prompt: String,
    pub code: String,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTracingAnswer {
    /// Function names in execution order, one per chain node
    pub sequence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTracingSpec {
    pub question: CodeTracingQuestion,
    pub answer: CodeTracingAnswer,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::CodeTracing;
    let nodes = ctx.nodes(chain);
    if nodes.len() != chain.len() {
        return Err(GenerationGap::new(kind, chain, "chain references unknown nodes"));
    }
    let (entry, last) = (nodes[0], nodes[nodes.len() - 1]);

    // The entry is given away on multi-step paths so the learner has a starting point
    let steps = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| TraceStep {
            step: i + 1,
            function: (i == 0 && nodes.len() > 1).then(|| node.name.clone()),
            location: node.line_range(),
        })
        .collect();

    let code = nodes
        .iter()
        .map(|node| ctx.text(node))
        .collect::<Vec<_>>()
        .join("\n\n");

    let hints = HintLadder::new(ctx.graph)
        .about(entry)
        .then(format!(
            "The path has {} steps and ends in {}",
            nodes.len(),
            last.name
        ));
    let hints = match chain.nodes().get(1) {
        Some(next) => hints.hand_off(entry, next),
        None => hints,
    }
    .build();

    let spec = CodeTracingSpec {
        question: CodeTracingQuestion {
            prompt: format!(
                "Trace the execution starting at `{}`: which function runs at each step?",
                entry.name
            ),
            code,
            steps,
        },
        answer: CodeTracingAnswer {
            sequence: nodes.iter().map(|node| node.name.clone()).collect(),
        },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::CodeTracing(spec),
        hints,
        ctx.points(kind),
    ))
}
