//! In-memory embedding cache using moka.
//!
//! Each unique text is embedded once per run.

use moka::sync::Cache;

use super::EmbeddingProvider;
use crate::error::{DeviationError, DeviationResult};

/// Wraps a provider with a text-keyed embedding cache.
pub struct CachedEmbedder<P> {
    inner: P,
    cache: Cache<String, Vec<f32>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    /// Create a cache holding at most `max_entries` embeddings.
    pub fn new(inner: P, max_entries: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_entries),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn encode(&self, text: &str) -> DeviationResult<Vec<f32>> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit);
        }
        let embedding = self.inner.encode(text)?;
        self.cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn encode_batch(&self, texts: &[&str]) -> DeviationResult<Vec<Vec<f32>>> {
        let mut out: Vec<Option<Vec<f32>>> = texts.iter().map(|t| self.cache.get(*t)).collect();

        let misses: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        if !misses.is_empty() {
            let miss_texts: Vec<&str> = misses.iter().map(|&i| texts[i]).collect();
            let fresh = self.inner.encode_batch(&miss_texts)?;
            for (&i, embedding) in misses.iter().zip(fresh) {
                self.cache.insert(texts[i].to_string(), embedding.clone());
                out[i] = Some(embedding);
            }
        }

        out.into_iter()
            .map(|slot| slot.ok_or_else(|| DeviationError::embedding("provider returned too few embeddings")))
            .collect()
    }

    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        self.inner.similarity(a, b)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
