//! External scoring oracles.
//!
//! The engine never depends on a particular numeric or ML backend. Block
//! matching asks a [`SimilarityOracle`] how close two texts are; the
//! global-alignment strategy asks a [`GlobalAligner`] for a character-level
//! alignment. Both are narrow traits so callers can batch, cache, or swap
//! implementations, and inject stubs in tests.
//!
//! Built-in implementations:
//! - [`EmbeddingSimilarity`]: cosine similarity over cached embeddings from
//!   any [`Embedder`]
//! - [`LexicalEmbedder`]: deterministic hashed bag-of-words embedder
//! - [`AffineAligner`]: score-only affine-gap global alignment

mod affine;
mod embedding;
mod lexical;

pub use affine::{AffineAligner, AffineScoring};
pub use embedding::{Embedder, EmbeddingSimilarity, cosine_similarity, l2_normalize_in_place};
pub use lexical::LexicalEmbedder;

use crate::error::OracleError;

/// Semantic similarity between two texts.
///
/// Implementations must be symmetric and score closer meanings higher. The
/// range is whatever the configured threshold expects; cosine oracles return
/// values in `[-1, 1]`.
pub trait SimilarityOracle: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError>;

    /// Called once per matching run with every text about to be compared, so
    /// expensive per-text work (embedding) can be done up front in a batch.
    fn prepare(&self, texts: &[&str]) -> Result<(), OracleError> {
        let _ = texts;
        Ok(())
    }
}

impl<F> SimilarityOracle for F
where
    F: Fn(&str, &str) -> Result<f32, OracleError> + Send + Sync,
{
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError> {
        self(a, b)
    }
}

/// Outcome of a global (end-to-end) alignment of two strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalAlignment {
    /// Optimal alignment score under the aligner's scoring scheme
    pub score: i64,
    /// Length of the first input in alignment units (chars)
    pub left_len: usize,
    /// Length of the second input in alignment units (chars)
    pub right_len: usize,
}

/// Global alignment of two strings.
pub trait GlobalAligner: Send + Sync {
    fn align(&self, a: &str, b: &str) -> Result<GlobalAlignment, OracleError>;
}
