use super::hints::HintLadder;
use super::{
    arrange_options, shuffled_by, stable_hash, Challenge, ChallengeSpec, ChoiceOption,
    GenerationContext, GenerationGap, GenerationResult,
};
use crate::types::{Chain, ChallengeType};
use callquest_graph::{CodeNode, NodeKind};
use serde::Serialize;

const FACTORY_PREFIXES: [&str; 5] = ["create_", "make_", "build_", "new_", "from_"];

/// Structural pattern an execution path can exhibit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignPattern {
    Recursion,
    Decorator,
    Facade,
    Factory,
    Iterator,
    CoroutineChain,
    Pipeline,
    Delegation,
    Observer,
    Singleton,
}

impl DesignPattern {
    /// Every pattern offered as an option, detected or not
    pub const CATALOG: [Self; 10] = [
        Self::Recursion,
        Self::Decorator,
        Self::Facade,
        Self::Factory,
        Self::Iterator,
        Self::CoroutineChain,
        Self::Pipeline,
        Self::Delegation,
        Self::Observer,
        Self::Singleton,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Recursion => "Recursion: the path calls back into itself",
            Self::Decorator => "Decorator: behaviour is wrapped around functions",
            Self::Facade => "Facade: one entry point fans out to several subsystems",
            Self::Factory => "Factory: a function builds and returns new objects",
            Self::Iterator => "Iterator: values are produced lazily with yield",
            Self::CoroutineChain => "Coroutine chain: async functions await each other",
            Self::Pipeline => "Pipeline: each step hands its result to the next",
            Self::Delegation => "Delegation: the entry forwards the work to a helper",
            Self::Observer => "Observer: listeners are notified of state changes",
            Self::Singleton => "Singleton: a single shared instance is reused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchitectureQuestion {
    pub prompt: String,
    pub chain: Vec<String>,
    pub code: String,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchitectureAnswer {
    pub key: String,
    pub pattern: DesignPattern,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureSpec {
    pub question: ArchitectureQuestion,
    pub answer: ArchitectureAnswer,
}

pub(super) fn generate(chain: &Chain, ctx: &GenerationContext<'_>) -> GenerationResult {
    let kind = ChallengeType::Architecture;
    let nodes = ctx.nodes(chain);
    if chain.len() < 2 || nodes.len() != chain.len() {
        return Err(GenerationGap::new(
            kind,
            chain,
            "architecture needs a path of at least two known nodes",
        ));
    }

    let detected = detect(chain, &nodes, ctx);
    let Some((pattern, evidence)) = detected.first().cloned() else {
        return Err(GenerationGap::new(kind, chain, "no pattern detected"));
    };

    let mut distractors: Vec<DesignPattern> = DesignPattern::CATALOG
        .into_iter()
        .filter(|p| detected.iter().all(|(found, _)| found != p))
        .collect();
    shuffled_by(&mut distractors, chain.entry(), |p| p.label());
    let distractors: Vec<String> = distractors
        .into_iter()
        .take(3)
        .map(|p| p.label().to_string())
        .collect();

    let seed = stable_hash(&[chain.entry(), "architecture"]);
    let (options, key) = arrange_options(pattern.label(), &distractors, seed);

    let hints = HintLadder::new(ctx.graph)
        .about(nodes[0])
        .then(format!("Evidence: {}", evidence.join("; ")))
        .build();

    let spec = ArchitectureSpec {
        question: ArchitectureQuestion {
            prompt: format!(
                "Which design pattern best describes the path starting at `{}`?",
                nodes[0].name
            ),
            chain: nodes.iter().map(|n| n.name.clone()).collect(),
            code: nodes
                .iter()
                .map(|n| ctx.text(n))
                .collect::<Vec<_>>()
                .join("\n\n"),
            options,
        },
        answer: ArchitectureAnswer {
            key,
            pattern,
            evidence,
        },
    };
    Ok(Challenge::new(
        chain,
        ChallengeSpec::Architecture(spec),
        hints,
        ctx.points(kind),
    ))
}

/// Every pattern the path exhibits with its evidence, strongest first
fn detect(
    chain: &Chain,
    nodes: &[&CodeNode],
    ctx: &GenerationContext<'_>,
) -> Vec<(DesignPattern, Vec<String>)> {
    let mut found = Vec::new();

    let back_edges: Vec<String> = nodes
        .iter()
        .enumerate()
        .flat_map(|(i, node)| {
            chain.nodes()[..=i]
                .iter()
                .filter(move |earlier| node.calls.contains(*earlier))
                .map(move |earlier| {
                    format!("{} calls {}", node.name, ctx.graph.node_name(earlier))
                })
        })
        .collect();
    if !back_edges.is_empty() {
        found.push((DesignPattern::Recursion, back_edges));
    }

    let decorated: Vec<String> = nodes
        .iter()
        .filter(|n| !n.decorators.is_empty())
        .map(|n| format!("{} is decorated with @{}", n.name, n.decorators.join(", @")))
        .collect();
    if !decorated.is_empty() {
        found.push((DesignPattern::Decorator, decorated));
    }

    if nodes[0].calls.len() >= 3 {
        found.push((
            DesignPattern::Facade,
            vec![format!(
                "{} calls {} different functions",
                nodes[0].name,
                nodes[0].calls.len()
            )],
        ));
    }

    let factories: Vec<String> = nodes
        .iter()
        .filter_map(|n| factory_evidence(n, ctx))
        .collect();
    if !factories.is_empty() {
        found.push((DesignPattern::Factory, factories));
    }

    let generators: Vec<String> = nodes
        .iter()
        .filter(|n| n.is_generator)
        .map(|n| format!("{} is a generator", n.name))
        .collect();
    if !generators.is_empty() {
        found.push((DesignPattern::Iterator, generators));
    }

    if nodes.iter().all(|n| n.is_async) {
        found.push((
            DesignPattern::CoroutineChain,
            vec![format!("all {} functions on the path are async", nodes.len())],
        ));
    }

    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    if nodes.len() >= 3 {
        found.push((
            DesignPattern::Pipeline,
            vec![format!("work flows through {}", names.join(" -> "))],
        ));
    } else {
        found.push((
            DesignPattern::Delegation,
            vec![format!("{} forwards to {}", names[0], names[1])],
        ));
    }

    found
}

fn factory_evidence(node: &CodeNode, ctx: &GenerationContext<'_>) -> Option<String> {
    if let Some(prefix) = FACTORY_PREFIXES.iter().find(|p| node.name.starts_with(**p)) {
        return Some(format!("{} is named like a constructor ({prefix}...)", node.name));
    }
    let ret = node.return_type.as_deref()?;
    ctx.graph
        .nodes()
        .any(|n| n.kind == NodeKind::Class && n.name == ret)
        .then(|| format!("{} returns a new {ret}", node.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeConfig;
    use callquest_graph::{CallGraph, CallGraphBuilder, NoSource};
    use pretty_assertions::assert_eq;

    fn build(nodes: Vec<CodeNode>, calls: &[(&str, &str)]) -> CallGraph {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        for node in nodes {
            builder.add_node(node);
        }
        for (from, to) in calls {
            builder.add_call(from, to);
        }
        builder.build().unwrap()
    }

    fn plain(id: &str) -> CodeNode {
        CodeNode::new(id, id, NodeKind::Function)
    }

    fn answer(g: &CallGraph, ids: &[&str]) -> ArchitectureSpec {
        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(g, &NoSource, &config);
        let chain = Chain::new(ids.iter().map(|s| s.to_string()).collect()).unwrap();
        match generate(&chain, &ctx).unwrap().spec {
            ChallengeSpec::Architecture(spec) => spec,
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn recursion_wins_over_pipeline() {
        let g = build(
            vec![plain("a"), plain("b"), plain("c")],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        let spec = answer(&g, &["a", "b", "c"]);
        assert_eq!(spec.answer.pattern, DesignPattern::Recursion);
        assert_eq!(spec.answer.evidence, vec!["c calls a"]);
    }

    #[test]
    fn distractors_exclude_every_detected_pattern() {
        let mut entry = plain("main");
        entry.decorators = vec!["cli".to_string()];
        let g = build(
            vec![entry, plain("load"), plain("save")],
            &[("main", "load"), ("load", "save")],
        );
        let spec = answer(&g, &["main", "load", "save"]);
        assert_eq!(spec.answer.pattern, DesignPattern::Decorator);

        let texts: Vec<&str> = spec.question.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts.len(), 4);
        assert!(!texts.contains(&DesignPattern::Pipeline.label()));
        let correct = spec
            .question
            .options
            .iter()
            .find(|o| o.key == spec.answer.key)
            .unwrap();
        assert_eq!(correct.text, DesignPattern::Decorator.label());
    }

    #[test]
    fn two_node_path_is_delegation_and_single_node_is_a_gap() {
        let g = build(vec![plain("a"), plain("b")], &[("a", "b")]);
        assert_eq!(answer(&g, &["a", "b"]).answer.pattern, DesignPattern::Delegation);

        let config = ChallengeConfig::default();
        let ctx = GenerationContext::new(&g, &NoSource, &config);
        let single = Chain::new(vec!["a".to_string()]).unwrap();
        assert!(generate(&single, &ctx).is_err());
    }
}
