//! Candidate edges for a single matching step.

use narrative_map::{Edge, NarrativeGraph, SectionId};
use serde::{Deserialize, Serialize};

/// Which triggers are eligible from the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerScope {
    /// Triggers scoped to the current section; all triggers when none are.
    #[default]
    ScopedOrAll,
    /// Only triggers scoped to the current section.
    ScopedOnly,
    /// Every trigger, regardless of scope.
    All,
}

/// How equal scores are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First candidate in generation order: decisions before triggers, document order within each.
    #[default]
    GenerationOrder,
    /// Smallest candidate text, then smallest destination id.
    Lexical,
}

/// Generate candidate edges, decisions first, then triggers.
pub fn generate_candidates(
    graph: &NarrativeGraph,
    current: Option<&SectionId>,
    scope: TriggerScope,
) -> Vec<Edge> {
    let mut candidates = current
        .map(|id| graph.decision_edges(id))
        .unwrap_or_default();

    let triggers = graph.triggers();
    let scoped: Vec<_> = triggers.iter().filter(|t| t.is_scoped_to(current)).collect();

    let eligible = match scope {
        TriggerScope::ScopedOnly => scoped,
        TriggerScope::ScopedOrAll if !scoped.is_empty() => scoped,
        TriggerScope::ScopedOrAll | TriggerScope::All => triggers.iter().collect(),
    };

    candidates.extend(eligible.into_iter().map(Edge::from_trigger));
    candidates
}

/// Index of the best-scoring candidate.
///
/// A candidate replaces the current best only when its score is strictly
/// greater, so NaN scores never win. Returns `None` when nothing scored.
pub fn select_best(candidates: &[Edge], scores: &[f32], tie_break: TieBreak) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(!score.is_nan(), |(_, top)| score > top) {
            best = Some((i, score));
        }
    }

    let (first, top) = best?;
    match tie_break {
        TieBreak::GenerationOrder => Some(first),
        TieBreak::Lexical => scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == top)
            .map(|(i, _)| i)
            .min_by(|&a, &b| {
                let (ea, eb) = (&candidates[a], &candidates[b]);
                ea.text.cmp(&eb.text).then_with(|| ea.to.cmp(&eb.to))
            }),
    }
}
