//! Hashed bag-of-words provider tuned for short chat turns.
//!
//! A turn is reduced to weighted word features and hashed into signed buckets:
//! 1. Words are lowercased; apostrophes stay inside words ("i'll", "don't")
//! 2. Conversational filler ("the", "i'll", "ok", ...) is kept but down-weighted
//! 3. Adjacent content words add a bigram feature, so "go north" and "north go" differ
//! 4. Repeats are dampened with `1 + ln(count)`
//! 5. The top bit of the FNV-1a hash picks the sign, so collisions tend to cancel
//! 6. The vector is L2-normalised

use std::collections::BTreeMap;

use super::EmbeddingProvider;
use crate::error::DeviationResult;

/// Words that carry little of a turn's intent.
const FILLER: &[&str] = &[
    "a", "an", "and", "are", "at", "be", "do", "i", "i'd", "i'll", "i'm", "i've", "in", "is", "it",
    "it's", "just", "let", "let's", "me", "my", "of", "oh", "ok", "okay", "on", "or", "please",
    "so", "that", "the", "this", "to", "uh", "um", "was", "we", "well", "yeah", "you",
];

const FILLER_WEIGHT: f32 = 0.2;
const BIGRAM_WEIGHT: f32 = 0.5;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Deterministic hashed feature embedder.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Feature key to (base weight, occurrences). Ordered so bucket sums are reproducible.
    fn features(text: &str) -> BTreeMap<String, (f32, f32)> {
        let mut features: BTreeMap<String, (f32, f32)> = BTreeMap::new();
        let mut add = |key: String, weight: f32| {
            features.entry(key).or_insert((weight, 0.0)).1 += 1.0;
        };

        let words = Self::words(text);
        let mut previous: Option<&str> = None;
        for word in &words {
            if FILLER.contains(&word.as_str()) {
                add(word.clone(), FILLER_WEIGHT);
                continue;
            }
            add(word.clone(), 1.0);
            if let Some(previous) = previous {
                add(format!("{previous} {word}"), BIGRAM_WEIGHT);
            }
            previous = Some(word.as_str());
        }
        features
    }

    fn fnv1a(feature: &str) -> u64 {
        feature
            .bytes()
            .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (feature, (weight, count)) in Self::features(text) {
            let hash = Self::fnv1a(&feature);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * weight * (1.0 + count.ln());
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn encode(&self, text: &str) -> DeviationResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing-bow"
    }
}
