//! Opcode-based alignment.
//!
//! Matching blocks come from [`SequenceMatcher`]: the longest common run of
//! words is fixed first and the pieces on either side are matched
//! recursively. The resulting opcodes are `equal`, `delete`, `insert` and
//! `replace`; only the pure `insert` and `delete` runs are reported. A
//! `replace` run (tokens swapped in place) produces no change records, so
//! this strategy trades completeness for speed and is not minimal.
//!
//! [`Opcodes::with_algorithm`] swaps the block matcher for one of the
//! algorithms in `similar`. Results then differ on text with repeated words.

use std::ops::Range;

use similar::{Algorithm, DiffTag, capture_diff_slices};

use crate::error::DiffResult;
use crate::token::Token;

use super::script::{Aligner, Change, EditScript};
use super::sequence_matcher::SequenceMatcher;

/// The opcode strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Opcodes {
    /// `None` runs the longest-matching-block matcher
    algorithm: Option<Algorithm>,
}

impl Opcodes {
    /// Use a block-matching algorithm from `similar` instead.
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self {
            algorithm: Some(algorithm),
        }
    }

    fn opcodes(&self, old: &[&str], new: &[&str]) -> Vec<(DiffTag, Range<usize>, Range<usize>)> {
        match self.algorithm {
            None => SequenceMatcher::new(old, new).opcodes(),
            Some(algorithm) => capture_diff_slices(algorithm, old, new)
                .iter()
                .map(|op| op.as_tag_tuple())
                .collect(),
        }
    }
}

impl Aligner for Opcodes {
    fn name(&self) -> &'static str {
        "opcodes"
    }

    fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript> {
        let old: Vec<&str> = left.iter().map(Token::as_str).collect();
        let new: Vec<&str> = right.iter().map(Token::as_str).collect();

        let mut script = EditScript::default();
        for (tag, old_range, new_range) in self.opcodes(&old, &new) {
            match tag {
                DiffTag::Insert => {
                    script
                        .added
                        .extend(new_range.map(|j| Change::added(j, right[j].text.clone())));
                }
                DiffTag::Delete => {
                    script
                        .removed
                        .extend(old_range.map(|i| Change::removed(i, left[i].text.clone())));
                }
                DiffTag::Equal | DiffTag::Replace => {}
            }
        }
        Ok(script)
    }
}
