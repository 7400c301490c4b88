use super::hints::HintLadder;
use super::{Challenge, ChallengeSpec, GenerationContext, GenerationGap, GenerationResult};
use crate::types::{Chain, ChallengeType};
use callquest_graph::{render_skeleton, CodeNode};
use serde::Serialize;

const BODY_PLACEHOLDER: &str = "    ...  # complete the body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCompletionQuestion {
    pub prompt: String,
    pub function: String,
    /// Decorators, signature and docstring followed by an empty body
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCompletionAnswer {
    /// Names of the functions a correct body must call
    pub required_calls: Vec<String>,
    pub returns: Option<String>,
    pub rubric: Vec<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCompletionSpec {
    pub question: CodeCompletionQuestion,
    pub answer: CodeCompletionAnswer,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::CodeCompletion;
    let nodes = ctx.nodes(chain);
    let target = nodes
        .iter()
        .find(|n| !n.calls.is_empty())
        .or_else(|| nodes.iter().find(|n| n.return_type.is_some()));
    let Some(&node) = target else {
        return Err(GenerationGap::new(
            kind,
            chain,
            "no node has calls or a return type to grade against",
        ));
    };

    let required_calls: Vec<String> = node
        .calls
        .iter()
        .map(|id| ctx.graph.node_name(id).to_string())
        .collect();

    let mut rubric: Vec<String> = required_calls
        .iter()
        .map(|name| format!("Calls {name}"))
        .collect();
    if node.is_async {
        rubric.push("Awaits its asynchronous calls".to_string());
    }
    if node.is_generator {
        rubric.push("Yields values instead of returning once".to_string());
    }
    if let Some(ret) = &node.return_type {
        rubric.push(format!("Returns a value of type {ret}"));
    }

    let structure = match (required_calls.len(), &node.return_type) {
        (0, Some(ret)) => format!("The body returns a {ret}"),
        (n, Some(ret)) => format!("The body makes {n} call(s) and returns a {ret}"),
        (n, None) => format!("The body makes {n} call(s): {}", required_calls.join(", ")),
    };
    let hints = HintLadder::new(ctx.graph).about(node).then(structure).build();

    let spec = CodeCompletionSpec {
        question: CodeCompletionQuestion {
            prompt: format!("Complete the body of `{}`", node.name),
            function: node.name.clone(),
            code: stub(ctx, node),
        },
        answer: CodeCompletionAnswer {
            required_calls,
            returns: node.return_type.clone(),
            rubric,
            reference: ctx.text(node),
        },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::CodeCompletion(spec),
        hints,
        ctx.points(kind),
    ))
}

/// Skeleton header of `node` with the body replaced by a placeholder
fn stub(ctx: &GenerationContext<'_>, node: &CodeNode) -> String {
    let skeleton = render_skeleton(ctx.graph, node);
    let mut lines: Vec<&str> = Vec::new();
    let mut in_body = false;
    for line in skeleton.lines() {
        if in_body {
            if line.trim_start().starts_with("\"\"\"") {
                lines.push(line);
            }
            break;
        }
        lines.push(line);
        in_body = ["def ", "async def ", "class "]
            .iter()
            .any(|kw| line.starts_with(kw));
    }
    lines.push(BODY_PLACEHOLDER);
    lines.join("\n")
}
