//! Deviation scorer - how close an actual response came to the scripted one.

use crate::embedding::EmbeddingProvider;
use crate::error::{DeviationError, DeviationResult};

/// Compares actual responses to expected responses by embedding similarity.
pub struct DeviationScorer<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: EmbeddingProvider + ?Sized> DeviationScorer<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Similarity of `actual` to `expected`.
    ///
    /// Returns `None` without consulting the provider when `expected` is blank.
    pub fn score(&self, actual: &str, expected: &str) -> DeviationResult<Option<f32>> {
        if expected.trim().is_empty() {
            return Ok(None);
        }

        let embeddings = self.provider.encode_batch(&[actual, expected])?;
        let [actual_vec, expected_vec] = embeddings.as_slice() else {
            return Err(DeviationError::embedding(format!(
                "expected 2 embeddings, got {}",
                embeddings.len()
            )));
        };
        Ok(Some(self.provider.similarity(actual_vec, expected_vec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    struct Unreachable;

    impl EmbeddingProvider for Unreachable {
        fn encode(&self, _text: &str) -> DeviationResult<Vec<f32>> {
            panic!("provider must not be called for blank expected text");
        }

        fn dimensions(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    #[test]
    fn test_blank_expected_is_unavailable() {
        let scorer = DeviationScorer::new(&Unreachable);
        assert_eq!(scorer.score("Hello there", "").unwrap(), None);
        assert_eq!(scorer.score("Hello there", "  \t\n").unwrap(), None);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let provider = HashingEmbedder::new(128);
        let scorer = DeviationScorer::new(&provider);
        let score = scorer
            .score("Welcome to the cave.", "Welcome to the cave.")
            .unwrap()
            .unwrap();
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_score_within_range() {
        let provider = HashingEmbedder::new(128);
        let scorer = DeviationScorer::new(&provider);
        let score = scorer
            .score("The tunnel is dark", "Welcome to the cave.")
            .unwrap()
            .unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }
}
