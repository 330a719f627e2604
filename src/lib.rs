//! pagediff - Word-level comparison engine for paginated documents
//!
//! ## Core Concepts
//!
//! **Tokens and blocks**: a document arrives as a [`TokenSeq`] of positioned
//! words plus optional [`Block`]s (paragraph regions), both produced by an
//! external extraction layer. [`words`] rebuilds tokens from raw glyphs.
//!
//! **Strategies**: four interchangeable aligners turn two token sequences
//! into an [`EditScript`] of added and removed positions. The caller picks
//! one per comparison with [`Strategy`].
//!
//! **Oracles**: block similarity and character-level global alignment are
//! delegated to injectable [`SimilarityOracle`] and [`GlobalAligner`]
//! implementations. Built-in local ones are used by default.
//!
//! ## Modules
//! - `algo`: alignment strategies (Myers, opcodes, set-diff, global alignment)
//! - `matcher`: greedy block matching
//! - `group`: merging adjacent changes into highlight regions
//! - `compare`: the end-to-end [`Comparator`]
//! - `oracle`: oracle traits and built-in implementations
//! - `words`: glyph-to-word assembly
//!
//! ## Usage
//!
//! ```
//! use pagediff::{Comparator, CompareConfig, Strategy, TokenSeq};
//!
//! let left = TokenSeq::from_words(["the", "quick", "brown", "fox"]);
//! let right = TokenSeq::from_words(["the", "slow", "brown", "fox"]);
//!
//! let comparator = Comparator::new(CompareConfig::new(Strategy::Myers))?;
//! let result = comparator.compare_tokens(&left, &right)?;
//!
//! assert_eq!(result.script.removed[0].text, "quick");
//! assert_eq!(result.script.added[0].text, "slow");
//! # Ok::<(), pagediff::DiffError>(())
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Alignment strategies: myers, opcodes, set-diff, global alignment
pub mod algo;

/// End-to-end comparison pipeline
pub mod compare;

/// Error types
pub mod error;

/// Bounding boxes
pub mod geom;

/// Change grouping for display
pub mod group;

/// Block matching
pub mod matcher;

/// Similarity and global-alignment oracles
pub mod oracle;

/// Prelude for common imports
pub mod prelude;

/// Tokens, token sequences, blocks
pub mod token;

/// Glyph-to-word assembly
pub mod words;

mod hash;

// =============================================================================
// Re-exports
// =============================================================================

// Algorithms
pub use algo::{Aligner, Change, EditScript, Side, Strategy};

// Pipeline
pub use compare::{BlockComparison, CompareConfig, Comparator, Comparison, DiffStats};

// Data model
pub use geom::Rect;
pub use token::{Block, BlockKind, Token, TokenSeq};

// Grouping and matching
pub use group::{ChangeGroup, GroupingConfig, group_changes};
pub use matcher::{BlockMatcher, MatchConfig, MatchOp, MatchRecord, MatchStats};

// Oracles
pub use oracle::{GlobalAligner, GlobalAlignment, SimilarityOracle};

// Error types
pub use error::{DiffError, DiffResult, OracleError};

// =============================================================================
// Tests
// =============================================================================
