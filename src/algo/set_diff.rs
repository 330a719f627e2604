//! Order-insensitive comparison.
//!
//! Each side is treated as a bag of token texts. Positions are ignored, so a
//! pure reordering produces no changes at all; this makes the strategy unfit
//! for spotting moved words inside a paragraph, but it is a single linear
//! pass and cheap for bulk comparisons.
//!
//! Positions in the output still index into the originating sequence so the
//! changes can be grouped and highlighted.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::DiffResult;
use crate::token::Token;

use super::script::{Aligner, Change, EditScript};

/// Occurrence positions of one value; most words repeat at most once or twice.
type Positions = SmallVec<[usize; 2]>;

/// Settings for [`SetDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SetDiffConfig {
    /// Report surplus occurrences when a value appears more often on one side.
    ///
    /// Off: only values missing entirely from the other side are reported
    /// (every occurrence of them). On: multiset semantics.
    pub count_repetitions: bool,
}

/// The order-insensitive strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetDiff {
    config: SetDiffConfig,
}

impl SetDiff {
    pub fn new(config: SetDiffConfig) -> Self {
        Self { config }
    }

    /// Multiset variant: surplus repetitions count as changes.
    pub fn counting_repetitions() -> Self {
        Self::new(SetDiffConfig { count_repetitions: true })
    }
}

impl Aligner for SetDiff {
    fn name(&self) -> &'static str {
        "set-diff"
    }

    fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript> {
        let left_occ = occurrences(left);
        let right_occ = occurrences(right);

        let mut removed = extras(&left_occ, &right_occ, self.config.count_repetitions);
        let mut added = extras(&right_occ, &left_occ, self.config.count_repetitions);
        removed.sort_unstable();
        added.sort_unstable();

        Ok(EditScript {
            added: added.into_iter().map(|j| Change::added(j, right[j].text.clone())).collect(),
            removed: removed
                .into_iter()
                .map(|i| Change::removed(i, left[i].text.clone()))
                .collect(),
        })
    }
}

/// Walk a sequence once, yielding each value with the indices it occupies.
fn occurrences(tokens: &[Token]) -> FxHashMap<&str, Positions> {
    let mut map: FxHashMap<&str, Positions> = FxHashMap::default();
    for (idx, token) in tokens.iter().enumerate() {
        map.entry(token.as_str()).or_default().push(idx);
    }
    map
}

/// Positions on `this` side that `other` cannot account for.
fn extras(this: &FxHashMap<&str, Positions>, other: &FxHashMap<&str, Positions>, count: bool) -> Vec<usize> {
    let mut out = Vec::new();
    for (value, positions) in this {
        match other.get(value) {
            None => out.extend_from_slice(positions),
            Some(theirs) if count && positions.len() > theirs.len() => {
                out.extend_from_slice(&positions[theirs.len()..]);
            }
            Some(_) => {}
        }
    }
    out
}
