//! Edit scripts and the alignment contract shared by every strategy.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use rustc_hash::FxHashSet;

use crate::error::{DiffError, DiffResult};
use crate::token::Token;

// =============================================================================
// Change records
// =============================================================================

/// Which side of the comparison a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    /// Present only in the right document; position indexes the right sequence
    Added,
    /// Present only in the left document; position indexes the left sequence
    Removed,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Added => "added",
            Side::Removed => "removed",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One added or removed token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Change {
    pub position: usize,
    pub text: CompactString,
    pub side: Side,
}

impl Change {
    pub fn added(position: usize, text: impl Into<CompactString>) -> Self {
        Self {
            position,
            text: text.into(),
            side: Side::Added,
        }
    }

    pub fn removed(position: usize, text: impl Into<CompactString>) -> Self {
        Self {
            position,
            text: text.into(),
            side: Side::Removed,
        }
    }
}

/// Output of an [`Aligner`]: tokens only in `right` and tokens only in `left`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct EditScript {
    /// Positions index into the right sequence
    pub added: Vec<Change>,
    /// Positions index into the left sequence
    pub removed: Vec<Change>,
}

impl EditScript {
    /// Script that inserts every right token.
    pub fn all_added(right: &[Token]) -> Self {
        Self {
            added: right
                .iter()
                .enumerate()
                .map(|(i, t)| Change::added(i, t.text.clone()))
                .collect(),
            removed: Vec::new(),
        }
    }

    /// Script that deletes every left token.
    pub fn all_removed(left: &[Token]) -> Self {
        Self {
            added: Vec::new(),
            removed: left
                .iter()
                .enumerate()
                .map(|(i, t)| Change::removed(i, t.text.clone()))
                .collect(),
        }
    }

    /// Total number of change records.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// `(position, side)` pairs for one side, in script order.
    pub fn positions(&self, side: Side) -> Vec<(usize, Side)> {
        let changes = match side {
            Side::Added => &self.added,
            Side::Removed => &self.removed,
        };
        changes.iter().map(|c| (c.position, side)).collect()
    }

    /// Apply the script to `left`: drop removed positions, then insert added
    /// tokens at their right-side positions in ascending order.
    ///
    /// For a minimal script this reproduces the right sequence.
    pub fn apply<'a>(&'a self, left: &'a [Token]) -> Vec<&'a str> {
        let dropped: FxHashSet<usize> = self.removed.iter().map(|c| c.position).collect();
        let mut out: Vec<&str> = left
            .iter()
            .enumerate()
            .filter(|(i, _)| !dropped.contains(i))
            .map(|(_, t)| t.as_str())
            .collect();

        let mut inserts: Vec<&Change> = self.added.iter().collect();
        inserts.sort_by_key(|c| c.position);
        for change in inserts {
            let at = change.position.min(out.len());
            out.insert(at, change.text.as_str());
        }
        out
    }
}

// =============================================================================
// Alignment contract
// =============================================================================

/// Token-sequence alignment.
///
/// Implementations compare tokens by exact text equality, keep no state
/// between calls, and return all-added / all-removed / empty scripts when one
/// or both sides are empty.
pub trait Aligner {
    /// Stable strategy name, used in logs.
    fn name(&self) -> &'static str;

    fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript>;
}

/// Selectable alignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Strategy {
    /// Minimum edit script (Myers O(ND))
    #[default]
    Myers,
    /// Longest-matching-block opcodes, inserts and deletes only
    Opcodes,
    /// Order-insensitive value comparison
    SetDiff,
    /// Character-level global alignment, then a word walk.
    ///
    /// The built-in aligner fills a table of `chars(left) * chars(right)`
    /// cells, so time grows quadratically with document length: a few
    /// thousand words take seconds where Myers takes microseconds. Bound it
    /// with `AffineAligner::with_cell_limit` through
    /// `Comparator::with_global_aligner`.
    GlobalAlignment,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Myers,
        Strategy::Opcodes,
        Strategy::SetDiff,
        Strategy::GlobalAlignment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Myers => "myers",
            Strategy::Opcodes => "opcodes",
            Strategy::SetDiff => "set-diff",
            Strategy::GlobalAlignment => "global-alignment",
        }
    }

    /// Whether scripts are guaranteed to be the shortest possible.
    pub fn is_minimal(self) -> bool {
        matches!(self, Strategy::Myers)
    }

    /// Whether pure reorderings are reported as changes.
    pub fn detects_reordering(self) -> bool {
        !matches!(self, Strategy::SetDiff)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "myers" => Ok(Strategy::Myers),
            "opcodes" | "sequence-matcher" => Ok(Strategy::Opcodes),
            "set-diff" | "deepdiff" => Ok(Strategy::SetDiff),
            "global-alignment" | "hirschberg" => Ok(Strategy::GlobalAlignment),
            _ => Err(DiffError::UnknownStrategy(s.to_string())),
        }
    }
}
