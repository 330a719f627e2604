//! Prelude module for common imports.
//!
//! ```
//! use pagediff::prelude::*;
//! ```

// Data model
pub use crate::geom::Rect;
pub use crate::token::{Block, BlockKind, Token, TokenSeq};

// Strategies
pub use crate::algo::{
    Aligner, Change, EditScript, GlobalAlign, Myers, Opcodes, SetDiff, SetDiffConfig, Side,
    Strategy,
};

// Pipeline
pub use crate::compare::{BlockComparison, CompareConfig, Comparator, Comparison, DiffStats};

// Grouping and matching
pub use crate::group::{ChangeGroup, GroupingConfig, group_changes};
pub use crate::matcher::{BlockMatcher, MatchConfig, MatchOp, MatchRecord};

// Oracles
pub use crate::oracle::{
    AffineAligner, Embedder, EmbeddingSimilarity, GlobalAligner, LexicalEmbedder,
    SimilarityOracle,
};

// Word assembly
pub use crate::words::{Glyph, LayoutBlock, LayoutPage, WordConfig, assemble_document};

// Error
pub use crate::error::{DiffError, DiffResult, OracleError};
