//! Hashed bag-of-words embedder.
//!
//! A deterministic local stand-in for a sentence-embedding model: each
//! lowercased word is hashed into one of `dim` buckets with a ±1 sign, so
//! texts sharing vocabulary point in similar directions. It captures lexical
//! overlap only, not paraphrase.

use crate::error::OracleError;
use crate::hash::StableHasher;

use super::Embedder;

const DEFAULT_DIM: usize = 256;

/// Feature-hashing [`Embedder`].
#[derive(Debug, Clone, Copy)]
pub struct LexicalEmbedder {
    dim: usize,
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl LexicalEmbedder {
    /// Embedder with `dim` buckets (at least 1).
    pub fn with_dim(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl Embedder for LexicalEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let mut v = vec![0f32; self.dim];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let h = StableHasher::new().update_str(&word.to_lowercase()).finish();
            let bucket = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        Ok(v)
    }
}
