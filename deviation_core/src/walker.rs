//! Session walker - replays one session against the narrative graph.
//!
//! The walker carries a single piece of state, the current section. For each
//! turn it:
//! 1. Matches the user input from the current section
//! 2. Scores the actual response against the expected one, if any
//! 3. Emits a record with the pre-transition section as `from`
//! 4. Advances: next ground-truth visit if any remain, else the matched
//!    destination, else stays put

use narrative_map::SectionId;
use std::collections::VecDeque;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::DeviationResult;
use crate::matcher::Matcher;
use crate::report::ScoredRecord;
use crate::scorer::DeviationScorer;
use crate::transcript::TranscriptTurn;

/// Walks the turns of one session. Never shared between sessions.
pub struct SessionWalker<'a, P: ?Sized> {
    matcher: &'a Matcher<'a, P>,
    scorer: DeviationScorer<'a, P>,
    ground_truth: VecDeque<SectionId>,
    current_section: Option<SectionId>,
}

impl<'a, P: EmbeddingProvider + ?Sized> SessionWalker<'a, P> {
    /// Create a walker, starting at the first ground-truth visit when there is one.
    pub fn new(matcher: &'a Matcher<'a, P>, ground_truth: Option<VecDeque<SectionId>>) -> Self {
        let mut ground_truth = ground_truth.unwrap_or_default();
        let current_section = ground_truth.pop_front();
        Self {
            matcher,
            scorer: DeviationScorer::new(matcher.provider()),
            ground_truth,
            current_section,
        }
    }

    pub fn current_section(&self) -> Option<&SectionId> {
        self.current_section.as_ref()
    }

    /// Ground-truth visits not yet consumed.
    pub fn remaining_ground_truth(&self) -> usize {
        self.ground_truth.len()
    }

    /// Process one turn and advance.
    pub fn step(&mut self, turn: &TranscriptTurn) -> DeviationResult<ScoredRecord> {
        let result = self
            .matcher
            .match_utterance(&turn.user_input, self.current_section.as_ref())?;
        let deviation = self
            .scorer
            .score(&turn.character_response, &result.expected_response)?;

        let record = ScoredRecord {
            session_id: turn.session_id.clone(),
            turn: turn.ordinal,
            timestamp: turn.timestamp.clone(),
            user_input: turn.user_input.clone(),
            matched_criterion: result.matched_text().map(str::to_string),
            match_kind: result.kind(),
            from_section: self.current_section.clone(),
            to_section: result.to_section.clone(),
            expected_response: result.expected_response.clone(),
            actual_response: turn.character_response.clone(),
            deviation_score: deviation,
            match_score: result.score(),
            is_trigger_input: turn.is_trigger_input,
        };

        if let Some(next) = self.ground_truth.pop_front() {
            self.current_section = Some(next);
        } else if let Some(next) = result.to_section {
            self.current_section = Some(next);
        }

        debug!(
            session = %turn.session_id,
            turn = turn.ordinal,
            from = ?record.from_section,
            to = ?record.to_section,
            now = ?self.current_section,
            "turn processed"
        );

        Ok(record)
    }

    /// Process every turn of a session, in order.
    pub fn walk(mut self, turns: &[TranscriptTurn]) -> DeviationResult<Vec<ScoredRecord>> {
        turns.iter().map(|turn| self.step(turn)).collect()
    }
}
