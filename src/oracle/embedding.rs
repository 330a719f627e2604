//! Embedding-backed similarity with a per-text vector cache.

use std::sync::Arc;

use compact_str::CompactString;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::OracleError;

use super::SimilarityOracle;

/// Turns text into a dense vector.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError>;

    /// Embed many texts at once. Backends with real batching should override.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, OracleError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Cosine-similarity oracle over cached, unit-length embeddings.
///
/// Each distinct text is embedded once per instance. Call
/// [`SimilarityOracle::prepare`] with every block text before matching to
/// embed them in one batch instead of lazily inside the comparison loop.
pub struct EmbeddingSimilarity<E> {
    embedder: E,
    cache: RwLock<FxHashMap<CompactString, Arc<[f32]>>>,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Number of cached vectors.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    fn vector(&self, text: &str) -> Result<Arc<[f32]>, OracleError> {
        if let Some(v) = self.cache.read().get(text) {
            return Ok(Arc::clone(v));
        }
        let v = finish(self.embedder.embed(text)?)?;
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(CompactString::from(text)).or_insert(v)))
    }
}

/// Validate and normalize a raw embedding.
fn finish(mut v: Vec<f32>) -> Result<Arc<[f32]>, OracleError> {
    if v.is_empty() {
        return Err(OracleError::invalid("embedder returned an empty vector"));
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(OracleError::invalid("embedder returned a non-finite value"));
    }
    l2_normalize_in_place(&mut v);
    Ok(v.into())
}

impl<E: Embedder> SimilarityOracle for EmbeddingSimilarity<E> {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        if va.len() != vb.len() {
            return Err(OracleError::invalid(format!(
                "embedding dimensions differ: {} vs {}",
                va.len(),
                vb.len()
            )));
        }
        Ok(cosine_similarity(&va, &vb))
    }

    fn prepare(&self, texts: &[&str]) -> Result<(), OracleError> {
        let missing: Vec<&str> = {
            let cache = self.cache.read();
            let mut seen = FxHashSet::default();
            texts
                .iter()
                .copied()
                .filter(|t| !cache.contains_key(*t) && seen.insert(*t))
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }

        let vectors = self.embedder.embed_batch(&missing)?;
        if vectors.len() != missing.len() {
            return Err(OracleError::invalid(format!(
                "embed_batch returned {} vectors for {} texts",
                vectors.len(),
                missing.len()
            )));
        }

        let finished = vectors.into_iter().map(finish).collect::<Result<Vec<_>, _>>()?;
        let mut cache = self.cache.write();
        for (text, v) in missing.iter().zip(finished) {
            cache.insert(CompactString::from(*text), v);
        }
        debug!(embedded = missing.len(), cached = cache.len(), "precomputed embeddings");
        Ok(())
    }
}

/// Scale `v` to unit length. Zero vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

/// Cosine of the angle between `a` and `b`; 0.0 for empty, mismatched or
/// zero-length inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}
