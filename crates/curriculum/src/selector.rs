use crate::config::ChallengeConfig;
use crate::ranker::mean;
use crate::types::{Chain, ChallengeType, Difficulty};
use callquest_graph::{CallGraph, CodeNode};

/// Upper bound on challenges per level
pub const MAX_CHALLENGES: usize = 5;

/// Lower bound on challenges per level
pub const MIN_CHALLENGES: usize = 3;

/// Types tried, in order, when selected generators fall short of the minimum
const FALLBACK_ORDER: [ChallengeType; 5] = [
    ChallengeType::FillBlank,
    ChallengeType::CodeCompletion,
    ChallengeType::Debugging,
    ChallengeType::Architecture,
    ChallengeType::CodeTracing,
];

/// Rule-based challenge types for a chain, in rule order.
///
/// Multiple choice is always first; every later rule appends at most one
/// type and selection stops at [`MAX_CHALLENGES`].
#[must_use]
pub fn select_with(
    chain: &Chain,
    difficulty: Difficulty,
    graph: &CallGraph,
    config: &ChallengeConfig,
) -> Vec<ChallengeType> {
    let nodes: Vec<&CodeNode> = chain.iter().filter_map(|id| graph.node(id)).collect();
    let has_decorators = nodes.iter().any(|n| !n.decorators.is_empty());
    let avg_complexity = mean(chain.len(), nodes.iter().map(|n| f64::from(n.complexity)));

    let rules = [
        (ChallengeType::MultipleChoice, true),
        (
            ChallengeType::CodeTracing,
            chain.len() >= config.tracing_min_chain_len,
        ),
        (
            ChallengeType::FillBlank,
            has_decorators || difficulty >= Difficulty::Intermediate,
        ),
        (
            ChallengeType::CodeCompletion,
            difficulty >= Difficulty::Intermediate,
        ),
        (
            ChallengeType::Debugging,
            avg_complexity > config.debugging_min_complexity,
        ),
        (
            ChallengeType::Architecture,
            difficulty >= Difficulty::Advanced,
        ),
    ];

    let selected: Vec<ChallengeType> = rules
        .into_iter()
        .filter_map(|(kind, applies)| applies.then_some(kind))
        .take(MAX_CHALLENGES)
        .collect();

    log::debug!(
        "Selected {:?} for chain at {} ({difficulty})",
        selected,
        chain.entry()
    );
    selected
}

/// Rule-based challenge types under the default thresholds
#[must_use]
pub fn select_challenge_types(
    chain: &Chain,
    difficulty: Difficulty,
    graph: &CallGraph,
) -> Vec<ChallengeType> {
    select_with(chain, difficulty, graph, &ChallengeConfig::default())
}

/// Lower-requirement types not already in `selected`, in fallback order
pub fn fallback_types(selected: &[ChallengeType]) -> impl Iterator<Item = ChallengeType> + '_ {
    FALLBACK_ORDER
        .into_iter()
        .filter(move |kind| !selected.contains(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use callquest_graph::{CallGraphBuilder, NodeKind};
    use std::collections::HashSet;

    fn chain(ids: &[&str]) -> Chain {
        Chain::new(ids.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn linear(ids: &[&str], decorate: bool, complexity: u32) -> CallGraph {
        let mut builder = CallGraphBuilder::new().link_inverse(true);
        for id in ids {
            let mut node = CodeNode::new(*id, *id, NodeKind::Function);
            node.complexity = complexity;
            if decorate {
                node.decorators = vec!["route".to_string()];
            }
            builder.add_node(node);
        }
        for pair in ids.windows(2) {
            builder.add_call(pair[0], pair[1]);
        }
        builder.add_entry_point(ids[0]);
        builder.build().unwrap()
    }

    #[test]
    fn single_node_gets_only_multiple_choice() {
        let g = linear(&["f"], false, 1);
        let types = select_challenge_types(&chain(&["f"]), Difficulty::Tutorial, &g);
        assert_eq!(types, vec![ChallengeType::MultipleChoice]);
    }

    #[test]
    fn decorated_complex_chain_below_intermediate_gets_four_types() {
        let g = linear(&["a", "b", "c"], true, 12);
        let types = select_challenge_types(&chain(&["a", "b", "c"]), Difficulty::Basic, &g);
        assert_eq!(
            types,
            vec![
                ChallengeType::MultipleChoice,
                ChallengeType::CodeTracing,
                ChallengeType::FillBlank,
                ChallengeType::Debugging,
            ]
        );
    }

    #[test]
    fn expert_selection_is_truncated_to_five_distinct_types() {
        let g = linear(&["a", "b", "c"], true, 12);
        let types = select_challenge_types(&chain(&["a", "b", "c"]), Difficulty::Expert, &g);
        assert_eq!(types.len(), MAX_CHALLENGES);
        assert!(!types.contains(&ChallengeType::Architecture));
        let unique: HashSet<_> = types.iter().collect();
        assert_eq!(unique.len(), types.len());
    }

    #[test]
    fn fallback_skips_already_selected_types() {
        let selected = [ChallengeType::MultipleChoice, ChallengeType::FillBlank];
        let fallbacks: Vec<_> = fallback_types(&selected).collect();
        assert_eq!(
            fallbacks,
            vec![
                ChallengeType::CodeCompletion,
                ChallengeType::Debugging,
                ChallengeType::Architecture,
                ChallengeType::CodeTracing,
            ]
        );
    }
}
