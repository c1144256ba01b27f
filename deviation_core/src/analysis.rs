//! Runs the walker over every session of a transcript.

use rayon::prelude::*;
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::DeviationResult;
use crate::events::SessionEventLog;
use crate::matcher::Matcher;
use crate::report::ScoredRecord;
use crate::transcript::{Session, Transcript};
use crate::walker::SessionWalker;

/// Analyses whole transcripts.
///
/// Sessions are independent: each gets its own walker, and with `parallel`
/// set they are spread over the rayon pool. Output order is always sessions in
/// first-appearance order, turns in transcript order.
pub struct Analyzer<'a, P: ?Sized> {
    matcher: Matcher<'a, P>,
    parallel: bool,
}

impl<'a, P: EmbeddingProvider + ?Sized> Analyzer<'a, P> {
    pub fn new(matcher: Matcher<'a, P>) -> Self {
        Self {
            matcher,
            parallel: false,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn matcher(&self) -> &Matcher<'a, P> {
        &self.matcher
    }

    /// Score every turn of the transcript.
    pub fn analyze(
        &self,
        transcript: &Transcript,
        events: Option<&SessionEventLog>,
    ) -> DeviationResult<Vec<ScoredRecord>> {
        info!(
            sessions = transcript.sessions().len(),
            turns = transcript.turn_count(),
            parallel = self.parallel,
            provider = self.matcher.provider().name(),
            "analysing transcript"
        );

        let per_session: Vec<Vec<ScoredRecord>> = if self.parallel {
            transcript
                .sessions()
                .par_iter()
                .map(|session| self.analyze_session(session, events))
                .collect::<DeviationResult<_>>()?
        } else {
            transcript
                .sessions()
                .iter()
                .map(|session| self.analyze_session(session, events))
                .collect::<DeviationResult<_>>()?
        };

        let records: Vec<ScoredRecord> = per_session.into_iter().flatten().collect();
        let scored = records.iter().filter(|r| r.deviation_score.is_some()).count();
        info!(
            records = records.len(),
            scored,
            unavailable = records.len() - scored,
            "analysis complete"
        );
        Ok(records)
    }

    /// Score one session from its own fresh walker.
    pub fn analyze_session(
        &self,
        session: &Session,
        events: Option<&SessionEventLog>,
    ) -> DeviationResult<Vec<ScoredRecord>> {
        let ground_truth = events.and_then(|log| log.queue_for(&session.id));
        SessionWalker::new(&self.matcher, ground_truth).walk(&session.turns)
    }
}
