//! Token-sequence alignment strategies.
//!
//! - `myers`: minimal edit script, the default
//! - `opcodes`: longest-matching-block opcodes, inserts and deletes only
//! - `set_diff`: order-insensitive value comparison
//! - `global`: character-level global alignment, then a word walk
//!
//! All four implement [`Aligner`]. The caller picks one per call through
//! [`Strategy`]; nothing here holds a "current" strategy.

mod global;
mod myers;
mod opcodes;
mod script;
mod sequence_matcher;
mod set_diff;

pub use global::GlobalAlign;
pub use myers::{Edit, Myers, MyersResult, MyersStats, diff_sequences, diff_tokens};
pub use opcodes::Opcodes;
pub use script::{Aligner, Change, EditScript, Side, Strategy};
pub use sequence_matcher::{MatchingBlock, SequenceMatcher};
pub use set_diff::{SetDiff, SetDiffConfig};
