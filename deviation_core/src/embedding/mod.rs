//! Embedding module - turns text into vectors and compares them.
//!
//! The analysis only depends on the [`EmbeddingProvider`] trait. Real sentence
//! models plug in behind it; the crate ships a deterministic hashed
//! bag-of-words provider and a caching wrapper.

mod cache;
mod hashing;

pub use cache::*;
pub use hashing::*;

use serde::{Deserialize, Serialize};

use crate::error::DeviationResult;

/// Source of fixed-length text embeddings.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    fn encode(&self, text: &str) -> DeviationResult<Vec<f32>>;

    /// Embed several texts. Output order matches input order.
    fn encode_batch(&self, texts: &[&str]) -> DeviationResult<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }

    /// Similarity of two embeddings, nominally in [-1, 1].
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

/// Cosine similarity. Zero-length or zero-norm inputs compare as 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Embedding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Vector size of the built-in provider.
    pub dimensions: usize,

    /// Maximum number of cached text embeddings. Zero disables caching.
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 384,
            cache_capacity: 10_000,
        }
    }
}

/// Build the built-in provider described by the configuration.
pub fn default_provider(config: &EmbeddingConfig) -> Box<dyn EmbeddingProvider> {
    let hashing = HashingEmbedder::new(config.dimensions);
    if config.cache_capacity == 0 {
        Box::new(hashing)
    } else {
        Box::new(CachedEmbedder::new(hashing, config.cache_capacity))
    }
}
