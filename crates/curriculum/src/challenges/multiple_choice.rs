use super::hints::HintLadder;
use super::{
    arrange_options, pick_distractors, shuffled_by, stable_hash, Challenge, ChallengeSpec,
    ChoiceOption, GenerationContext, GenerationGap, GenerationResult,
};
use crate::types::{Chain, ChallengeType};
use callquest_graph::CodeNode;
use serde::Serialize;

const RETURN_TYPE_POOL: [&str; 8] = [
    "None",
    "str",
    "int",
    "bool",
    "dict",
    "list[str]",
    "Optional[str]",
    "bytes",
];

const PURPOSE_POOL: [&str; 5] = [
    "Parse command line arguments",
    "Serialize the result to JSON",
    "Open a database connection",
    "Render an HTML template",
    "Retry a failed network request",
];

/// Fact a multiple-choice question asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTemplate {
    ReturnType,
    ParameterCount,
    CallTarget,
    Purpose,
}

impl QuestionTemplate {
    pub const ALL: [Self; 4] = [
        Self::ReturnType,
        Self::ParameterCount,
        Self::CallTarget,
        Self::Purpose,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReturnType => "return_type",
            Self::ParameterCount => "parameter_count",
            Self::CallTarget => "call_target",
            Self::Purpose => "purpose",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultipleChoiceQuestion {
    pub template: QuestionTemplate,
    pub prompt: String,
    pub code: String,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultipleChoiceAnswer {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleChoiceSpec {
    pub question: MultipleChoiceQuestion,
    pub answer: MultipleChoiceAnswer,
}

struct Fact {
    prompt: String,
    correct: String,
    distractors: Vec<String>,
    hint: &'static str,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::MultipleChoice;
    let Some(entry) = ctx.graph.node(chain.entry()) else {
        return Err(GenerationGap::new(kind, chain, "entry node is not in the graph"));
    };

    // Rotate the starting template so a curriculum does not ask the same thing every level
    #[allow(clippy::cast_possible_truncation)]
    let start = (stable_hash(&[&entry.id]) % QuestionTemplate::ALL.len() as u64) as usize;
    let found = (0..QuestionTemplate::ALL.len())
        .map(|offset| QuestionTemplate::ALL[(start + offset) % QuestionTemplate::ALL.len()])
        .find_map(|template| fact(template, chain, entry, ctx).map(|fact| (template, fact)));

    let Some((template, fact)) = found else {
        return Err(GenerationGap::new(
            kind,
            chain,
            "entry has no parameters, return type, calls or docstring",
        ));
    };

    let seed = stable_hash(&[&entry.id, template.as_str()]);
    let (options, key) = arrange_options(&fact.correct, &fact.distractors, seed);
    let hints = HintLadder::new(ctx.graph).about(entry).then(fact.hint).build();

    let spec = MultipleChoiceSpec {
        question: MultipleChoiceQuestion {
            template,
            prompt: fact.prompt,
            code: ctx.text(entry),
            options,
        },
        answer: MultipleChoiceAnswer {
            key,
            text: fact.correct,
        },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::MultipleChoice(spec),
        hints,
        ctx.points(kind),
    ))
}

fn fact(
    template: QuestionTemplate,
    chain: &Chain,
    entry: &CodeNode,
    ctx: &GenerationContext<'_>,
) -> Option<Fact> {
    match template {
        QuestionTemplate::ReturnType => {
            let correct = entry.return_type.clone()?;
            let mut seen: Vec<String> = ctx
                .graph
                .nodes()
                .filter(|n| n.id != entry.id)
                .filter_map(|n| n.return_type.clone())
                .collect();
            seen.sort();
            seen.dedup();
            shuffled_by(&mut seen, &entry.id, String::as_str);
            let candidates = seen
                .into_iter()
                .chain(RETURN_TYPE_POOL.iter().map(|s| (*s).to_string()));
            Some(Fact {
                prompt: format!("What type does `{}` return?", entry.name),
                distractors: pick_distractors(&correct, candidates, 3)?,
                correct,
                hint: "Check the annotation after `->` in the signature",
            })
        }
        QuestionTemplate::ParameterCount => {
            let count = entry.parameters.len();
            if count == 0 {
                return None;
            }
            let candidates = [count - 1, count + 1, count + 2].map(|n| n.to_string());
            Some(Fact {
                prompt: format!("How many parameters does `{}` take?", entry.name),
                distractors: pick_distractors(&count.to_string(), candidates, 3)?,
                correct: count.to_string(),
                hint: "Count the names between the parentheses of the signature",
            })
        }
        QuestionTemplate::CallTarget => {
            let target = chain
                .nodes()
                .get(1)
                .or_else(|| entry.calls.iter().next())?;
            let correct = ctx.graph.node_name(target).to_string();
            let mut others: Vec<String> = ctx
                .graph
                .nodes()
                .filter(|n| n.id != entry.id && !entry.calls.contains(&n.id))
                .map(|n| n.name.clone())
                .collect();
            others.sort();
            others.dedup();
            shuffled_by(&mut others, &entry.id, String::as_str);
            let synthesized = [
                format!("{correct}_impl"),
                format!("_{correct}"),
                format!("handle_{correct}"),
            ];
            Some(Fact {
                prompt: format!(
                    "Which function does `{}` call next on this execution path?",
                    entry.name
                ),
                distractors: pick_distractors(&correct, others.into_iter().chain(synthesized), 3)?,
                correct,
                hint: "Follow the first call in the body that stays on the path",
            })
        }
        QuestionTemplate::Purpose => {
            let correct = entry.doc_summary()?.to_string();
            let mut others: Vec<String> = ctx
                .graph
                .nodes()
                .filter(|n| n.id != entry.id)
                .filter_map(|n| n.doc_summary().map(str::to_string))
                .collect();
            others.sort();
            others.dedup();
            shuffled_by(&mut others, &entry.id, String::as_str);
            let candidates = others
                .into_iter()
                .chain(PURPOSE_POOL.iter().map(|s| (*s).to_string()));
            Some(Fact {
                prompt: format!("What is the purpose of `{}`?", entry.name),
                distractors: pick_distractors(&correct, candidates, 3)?,
                correct,
                hint: "The first sentence of the docstring says it directly",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeConfig;
    use callquest_graph::{CallGraph, CallGraphBuilder, NoSource, NodeKind, Parameter};
    use std::collections::HashSet;

    fn graph(nodes: Vec<CodeNode>, calls: &[(&str, &str)]) -> CallGraph {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        for node in nodes {
            builder.add_node(node);
        }
        for (from, to) in calls {
            builder.add_call(from, to);
        }
        builder.build().unwrap()
    }

    fn spec_of(challenge: &Challenge) -> &MultipleChoiceSpec {
        match &challenge.spec {
            ChallengeSpec::MultipleChoice(spec) => spec,
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn produces_four_distinct_options_with_correct_key() {
        let mut run = CodeNode::new("run", "run", NodeKind::Function);
        run.parameters = vec![Parameter::new("host"), Parameter::new("port")];
        run.return_type = Some("None".to_string());
        run.docstring = Some("Run the development server.".to_string());
        let g = graph(
            vec![
                run,
                CodeNode::new("serve", "serve", NodeKind::Function),
                CodeNode::new("other", "other", NodeKind::Function),
            ],
            &[("run", "serve")],
        );
        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(&g, &NoSource, &config);
        let chain = Chain::new(vec!["run".into(), "serve".into()]).unwrap();

        let challenge = generate(&chain, &ctx).unwrap();
        let spec = spec_of(&challenge);
        assert_eq!(challenge.id, "mc_run");
        assert_eq!(challenge.points, 10);
        assert_eq!(spec.question.options.len(), 4);

        let texts: HashSet<_> = spec.question.options.iter().map(|o| &o.text).collect();
        assert_eq!(texts.len(), 4);
        let correct = spec
            .question
            .options
            .iter()
            .find(|o| o.key == spec.answer.key)
            .unwrap();
        assert_eq!(correct.text, spec.answer.text);
        assert!(!challenge.hints.is_empty());
    }

    #[test]
    fn parameter_count_distractors_are_off_by_one() {
        let mut node = CodeNode::new("f", "f", NodeKind::Function);
        node.parameters = vec![Parameter::new("a"), Parameter::new("b")];
        let g = graph(vec![node], &[]);
        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(&g, &NoSource, &config);
        let chain = Chain::new(vec!["f".into()]).unwrap();

        let spec_challenge = generate(&chain, &ctx).unwrap();
        let spec = spec_of(&spec_challenge);
        assert_eq!(spec.question.template, QuestionTemplate::ParameterCount);
        let mut texts: Vec<_> = spec.question.options.iter().map(|o| o.text.as_str()).collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["1", "2", "3", "4"]);
        assert_eq!(spec.answer.text, "2");
    }

    #[test]
    fn purpose_hints_do_not_reveal_the_summary() {
        let mut node = CodeNode::new("load", "load", NodeKind::Function);
        node.docstring = Some("Summary of load. Reads settings from disk.".to_string());
        let g = graph(vec![node], &[]);
        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(&g, &NoSource, &config);
        let chain = Chain::new(vec!["load".into()]).unwrap();

        let challenge = generate(&chain, &ctx).unwrap();
        let spec = spec_of(&challenge);
        assert_eq!(spec.question.template, QuestionTemplate::Purpose);
        assert_eq!(spec.answer.text, "Summary of load");
        assert_eq!(challenge.hints[0], "Read the docstring of load");
        assert!(challenge
            .hints
            .iter()
            .all(|hint| !hint.contains(&spec.answer.text)));
    }

    #[test]
    fn starved_entry_is_a_generation_gap() {
        let g = graph(vec![CodeNode::new("f", "f", NodeKind::Function)], &[]);
        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(&g, &NoSource, &config);
        let chain = Chain::new(vec!["f".into()]).unwrap();

        let gap = generate(&chain, &ctx).unwrap_err();
        assert_eq!(gap.challenge_type, ChallengeType::MultipleChoice);
        assert_eq!(gap.entry, "f");
    }
}
