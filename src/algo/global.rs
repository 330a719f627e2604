//! Global alignment followed by word reconciliation.
//!
//! Both sequences are joined into space-separated strings and handed to a
//! [`GlobalAligner`]. The character alignment does not map back onto word
//! indices, so the word-level result comes from a greedy walk over both
//! token sequences:
//!
//! - equal tokens advance together;
//! - a right token that never occurs again in the remaining left suffix is
//!   added;
//! - otherwise a left token that never occurs again in the remaining right
//!   suffix is removed;
//! - otherwise the pair is committed as a replacement (left removed, right
//!   added) and both pointers advance, so crossing (reordered) tokens cannot
//!   stall the walk.
//!
//! Leftover tokens on either side become trailing removals/additions. Every
//! token is either paired with an equal token or reported, so the script
//! always rebuilds the right side when applied. It is not minimal.
//!
//! The aligner call dominates: the default [`AffineAligner`] costs
//! O(chars(left) * chars(right)) time and has no cell limit.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::oracle::{AffineAligner, GlobalAligner};
use crate::token::Token;

use super::script::{Aligner, Change, EditScript};

/// The global-alignment strategy.
#[derive(Clone)]
pub struct GlobalAlign {
    aligner: Arc<dyn GlobalAligner>,
}

impl Default for GlobalAlign {
    fn default() -> Self {
        Self::new(Arc::new(AffineAligner::default()))
    }
}

impl std::fmt::Debug for GlobalAlign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalAlign").finish_non_exhaustive()
    }
}

impl GlobalAlign {
    pub fn new(aligner: Arc<dyn GlobalAligner>) -> Self {
        Self { aligner }
    }
}

impl Aligner for GlobalAlign {
    fn name(&self) -> &'static str {
        "global-alignment"
    }

    fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript> {
        if left.is_empty() {
            return Ok(EditScript::all_added(right));
        }
        if right.is_empty() {
            return Ok(EditScript::all_removed(left));
        }

        let joined_left = join(left);
        let joined_right = join(right);
        let alignment = self
            .aligner
            .align(&joined_left, &joined_right)
            .map_err(DiffError::global_align)?;
        debug!(
            score = alignment.score,
            left_chars = alignment.left_len,
            right_chars = alignment.right_len,
            "global alignment computed"
        );

        Ok(reconcile_words(left, right))
    }
}

fn join(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len() + 1).sum());
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.as_str());
    }
    out
}

/// Remaining-occurrence counts for the unconsumed suffix of a sequence.
struct Suffix<'a> {
    counts: FxHashMap<&'a str, usize>,
}

impl<'a> Suffix<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let mut counts = FxHashMap::default();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        Self { counts }
    }

    fn contains(&self, text: &str) -> bool {
        self.counts.get(text).is_some_and(|n| *n > 0)
    }

    fn consume(&mut self, text: &'a str) {
        if let Some(n) = self.counts.get_mut(text) {
            *n = n.saturating_sub(1);
        }
    }
}

/// The word walk. Linear in the total number of tokens.
fn reconcile_words(left: &[Token], right: &[Token]) -> EditScript {
    let mut script = EditScript::default();
    let mut left_rest = Suffix::new(left);
    let mut right_rest = Suffix::new(right);
    let (mut li, mut ri) = (0, 0);

    while li < left.len() && ri < right.len() {
        let l = left[li].as_str();
        let r = right[ri].as_str();

        if l == r {
            left_rest.consume(l);
            right_rest.consume(r);
            li += 1;
            ri += 1;
        } else if !left_rest.contains(r) {
            script.added.push(Change::added(ri, right[ri].text.clone()));
            right_rest.consume(r);
            ri += 1;
        } else if !right_rest.contains(l) {
            script.removed.push(Change::removed(li, left[li].text.clone()));
            left_rest.consume(l);
            li += 1;
        } else {
            script.removed.push(Change::removed(li, left[li].text.clone()));
            script.added.push(Change::added(ri, right[ri].text.clone()));
            left_rest.consume(l);
            right_rest.consume(r);
            li += 1;
            ri += 1;
        }
    }

    script
        .removed
        .extend((li..left.len()).map(|i| Change::removed(i, left[i].text.clone())));
    script
        .added
        .extend((ri..right.len()).map(|j| Change::added(j, right[j].text.clone())));
    script
}
