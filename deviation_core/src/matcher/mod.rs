//! Matcher - finds the narrative edge a user utterance most likely followed.
//!
//! A matching step works as follows:
//! 1. **Candidates**: decisions of the current section, then eligible triggers
//! 2. **Embedding**: the utterance once, all candidate texts as one batch
//! 3. **Ranking**: similarity of the utterance to each candidate
//! 4. **Selection**: strictly greatest score, ties per [`TieBreak`]
//! 5. **Resolution**: expected response at the chosen destination

mod candidate;

pub use candidate::*;

use narrative_map::{Edge, EdgeKind, NarrativeGraph, SectionId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{DeviationError, DeviationResult};

/// Best score reported when no candidate was compared.
///
/// Lies outside the similarity range [-1, 1] so it can never be mistaken for a
/// genuinely poor match.
pub const NO_MATCH_SCORE: f32 = -2.0;

/// Policies for candidate generation and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub trigger_scope: TriggerScope,
    pub tie_break: TieBreak,
}

/// Outcome of matching one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The winning edge, if any candidate existed.
    pub edge: Option<Edge>,

    /// Similarity of the winning edge, or [`NO_MATCH_SCORE`].
    pub best_score: f32,

    /// The section matching started from; `None` when nothing matched.
    pub from_section: Option<SectionId>,

    /// Destination of the winning edge.
    pub to_section: Option<SectionId>,

    /// Expected response at the destination. Empty when unavailable.
    pub expected_response: String,
}

impl MatchResult {
    /// Result for a step where no comparison was made.
    pub fn no_candidates() -> Self {
        Self {
            edge: None,
            best_score: NO_MATCH_SCORE,
            from_section: None,
            to_section: None,
            expected_response: String::new(),
        }
    }

    pub fn matched_text(&self) -> Option<&str> {
        self.edge.as_ref().map(|e| e.text.as_str())
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        self.edge.as_ref().map(|e| e.kind)
    }

    /// The best score, or `None` when no comparison was made.
    pub fn score(&self) -> Option<f32> {
        self.edge.as_ref().map(|_| self.best_score)
    }
}

/// Ranks outgoing edges against user utterances.
///
/// Holds the graph and provider as explicit dependencies so that session
/// workers can share one matcher.
pub struct Matcher<'a, P: ?Sized> {
    graph: &'a NarrativeGraph,
    provider: &'a P,
    config: MatcherConfig,
}

impl<'a, P: EmbeddingProvider + ?Sized> Matcher<'a, P> {
    pub fn new(graph: &'a NarrativeGraph, provider: &'a P, config: MatcherConfig) -> Self {
        Self {
            graph,
            provider,
            config,
        }
    }

    /// Create a matcher with default policies.
    pub fn with_defaults(graph: &'a NarrativeGraph, provider: &'a P) -> Self {
        Self::new(graph, provider, MatcherConfig::default())
    }

    pub fn graph(&self) -> &'a NarrativeGraph {
        self.graph
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match an utterance against the edges reachable from `current`.
    ///
    /// Pure with respect to its inputs: the same utterance, graph and section
    /// always produce the same result.
    pub fn match_utterance(
        &self,
        utterance: &str,
        current: Option<&SectionId>,
    ) -> DeviationResult<MatchResult> {
        let mut candidates = generate_candidates(self.graph, current, self.config.trigger_scope);
        if candidates.is_empty() {
            debug!(current = ?current, "no candidate edges");
            return Ok(MatchResult::no_candidates());
        }

        let query = self.provider.encode(utterance)?;
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.provider.encode_batch(&texts)?;
        if embeddings.len() != candidates.len() {
            return Err(DeviationError::embedding(format!(
                "expected {} embeddings, got {}",
                candidates.len(),
                embeddings.len()
            )));
        }

        let scores: Vec<f32> = embeddings
            .iter()
            .map(|e| self.provider.similarity(&query, e))
            .collect();

        let Some(best) = select_best(&candidates, &scores, self.config.tie_break) else {
            return Err(DeviationError::embedding(format!(
                "no comparable score among {} candidates",
                candidates.len()
            )));
        };

        let edge = candidates.swap_remove(best);
        let expected = self.graph.expected_response(edge.to.as_ref()).to_string();

        debug!(
            utterance,
            matched = %edge.text,
            kind = %edge.kind,
            score = scores[best],
            to = ?edge.to,
            "matched edge"
        );

        Ok(MatchResult {
            best_score: scores[best],
            from_section: current.cloned(),
            to_section: edge.to.clone(),
            expected_response: expected,
            edge: Some(edge),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use narrative_map::{Section, Trigger};

    fn sid(id: &str) -> SectionId {
        SectionId::from(id)
    }

    fn cave_graph() -> NarrativeGraph {
        let mut graph = NarrativeGraph::new();
        graph.add_section(Section::new("S1", "Entrance").with_decision("go north", Some("S2")));
        graph.add_section(Section::new("S2", "Cave").with_response("Welcome to the cave."));
        graph
    }

    #[test]
    fn test_single_decision_scenario() {
        let graph = cave_graph();
        let provider = HashingEmbedder::new(384);
        let matcher = Matcher::with_defaults(&graph, &provider);

        let result = matcher.match_utterance("I'll head north", Some(&sid("S1"))).unwrap();

        assert_eq!(result.matched_text(), Some("go north"));
        assert_eq!(result.kind(), Some(EdgeKind::Decision));
        assert_eq!(result.from_section, Some(sid("S1")));
        assert_eq!(result.to_section, Some(sid("S2")));
        assert_eq!(result.expected_response, "Welcome to the cave.");
        assert!(result.best_score > 0.0 && result.best_score <= 1.0);
    }

    #[test]
    fn test_no_candidates_uses_sentinel() {
        let graph = cave_graph();
        let provider = HashingEmbedder::new(64);
        let matcher = Matcher::with_defaults(&graph, &provider);

        let result = matcher.match_utterance("hello?", None).unwrap();

        assert!(result.edge.is_none());
        assert_eq!(result.best_score, NO_MATCH_SCORE);
        assert_eq!(result.score(), None);
        assert!(result.from_section.is_none());
        assert!(result.to_section.is_none());
        assert_eq!(result.expected_response, "");
    }

    #[test]
    fn test_unscoped_trigger_is_candidate_from_section() {
        let mut graph = cave_graph();
        graph.add_trigger(Trigger::new("t1", "found oxygen").to_section("S9"));
        let provider = HashingEmbedder::new(384);
        let matcher = Matcher::with_defaults(&graph, &provider);

        let result = matcher.match_utterance("I found the oxygen", Some(&sid("S1"))).unwrap();

        assert_eq!(result.matched_text(), Some("found oxygen"));
        assert_eq!(result.kind(), Some(EdgeKind::Trigger));
        assert_eq!(result.to_section, Some(sid("S9")));
        // S9 is dangling
        assert_eq!(result.expected_response, "");
    }

    #[test]
    fn test_dangling_decision_destination() {
        let mut graph = NarrativeGraph::new();
        graph.add_section(Section::new("S1", "Edge").with_decision("jump", Some("S404")));
        let provider = HashingEmbedder::new(64);
        let matcher = Matcher::with_defaults(&graph, &provider);

        let result = matcher.match_utterance("jump!", Some(&sid("S1"))).unwrap();
        assert_eq!(result.to_section, Some(sid("S404")));
        assert_eq!(result.expected_response, "");
    }

    #[test]
    fn test_matching_is_idempotent() {
        let mut graph = cave_graph();
        graph.add_trigger(Trigger::new("t1", "found oxygen").to_section("S2"));
        graph.add_trigger(Trigger::new("t2", "north wind").to_section("S1"));
        let provider = HashingEmbedder::new(128);
        let matcher = Matcher::with_defaults(&graph, &provider);

        let first = matcher.match_utterance("heading north now", Some(&sid("S1"))).unwrap();
        let second = matcher.match_utterance("heading north now", Some(&sid("S1"))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unscorable_candidates_are_an_error() {
        struct NanProvider;

        impl EmbeddingProvider for NanProvider {
            fn encode(&self, _text: &str) -> DeviationResult<Vec<f32>> {
                Ok(vec![f32::NAN; 4])
            }

            fn similarity(&self, _a: &[f32], _b: &[f32]) -> f32 {
                f32::NAN
            }

            fn dimensions(&self) -> usize {
                4
            }

            fn name(&self) -> &str {
                "nan"
            }
        }

        let graph = cave_graph();
        let matcher = Matcher::with_defaults(&graph, &NanProvider);
        let err = matcher.match_utterance("go north", Some(&sid("S1"))).unwrap_err();
        assert!(matches!(err, DeviationError::Embedding { .. }));

        // Zero candidates is still a value, not an error
        let result = matcher.match_utterance("go north", None).unwrap();
        assert_eq!(result.best_score, NO_MATCH_SCORE);
    }

    #[test]
    fn test_scoped_only_policy_can_leave_no_candidates() {
        let mut graph = NarrativeGraph::new();
        graph.add_trigger(Trigger::new("t1", "found oxygen").from_section("S7").to_section("S8"));
        let provider = HashingEmbedder::new(64);
        let config = MatcherConfig {
            trigger_scope: TriggerScope::ScopedOnly,
            ..Default::default()
        };
        let matcher = Matcher::new(&graph, &provider, config);

        let result = matcher.match_utterance("found oxygen", Some(&sid("S1"))).unwrap();
        assert_eq!(result.score(), None);
    }
}
