//! End-to-end comparison: align, optionally match blocks, group for display.
//!
//! [`Comparator`] owns the configuration and the two oracles. Everything it
//! returns is plain data; nothing is kept between calls, so one comparator
//! can serve any number of comparisons concurrently.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{Level, debug, span};

use crate::algo::{Aligner, Change, EditScript, GlobalAlign, Myers, Opcodes, SetDiff, SetDiffConfig, Side, Strategy};
use crate::error::{DiffError, DiffResult};
use crate::group::{ChangeGroup, GroupingConfig, group_changes};
use crate::matcher::{BlockMatcher, MatchConfig, MatchOp, MatchRecord, MatchStats};
use crate::oracle::{AffineAligner, EmbeddingSimilarity, GlobalAligner, LexicalEmbedder, SimilarityOracle};
use crate::token::{Block, Token};

// =============================================================================
// Configuration
// =============================================================================

/// Everything that tunes a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompareConfig {
    pub strategy: Strategy,
    pub grouping: GroupingConfig,
    pub matching: MatchConfig,
    pub set_diff: SetDiffConfig,
}

impl CompareConfig {
    /// Default thresholds with the given strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Tighter grouping and a higher bar for similar blocks.
    pub fn strict() -> Self {
        Self {
            grouping: GroupingConfig {
                distance_threshold: 10.0,
                line_threshold: 2.5,
            },
            matching: MatchConfig {
                similarity_threshold: 0.9,
            },
            ..Self::default()
        }
    }

    /// Looser grouping, more blocks paired as similar.
    pub fn loose() -> Self {
        Self {
            grouping: GroupingConfig {
                distance_threshold: 40.0,
                line_threshold: 8.0,
            },
            matching: MatchConfig {
                similarity_threshold: 0.7,
            },
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Reject thresholds that are NaN or negative.
    pub fn validate(&self) -> DiffResult<()> {
        let checks = [
            ("grouping.distance_threshold", self.grouping.distance_threshold),
            ("grouping.line_threshold", self.grouping.line_threshold),
            ("matching.similarity_threshold", self.matching.similarity_threshold),
        ];
        for (name, value) in checks {
            if value.is_nan() || value < 0.0 {
                return Err(DiffError::invalid_config(format!("{name} must be a non-negative number, got {value}")));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// Counters from one comparison.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct DiffStats {
    /// Distinct left-side tokens handed to the aligner
    pub left_tokens: usize,
    /// Distinct right-side tokens handed to the aligner
    pub right_tokens: usize,
    pub added: usize,
    pub removed: usize,
    pub groups: usize,
    /// Match operator tally; all zero for token-only comparisons
    pub blocks: MatchStats,
}

impl DiffStats {
    /// Number of change records.
    pub fn changes(&self) -> usize {
        self.added + self.removed
    }

    pub fn is_identical(&self) -> bool {
        self.changes() == 0
    }
}

/// Result of [`Comparator::compare_tokens`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    pub script: EditScript,
    /// Removed groups (left document) followed by added groups (right document)
    pub groups: Vec<ChangeGroup>,
    pub stats: DiffStats,
}

/// Result of [`Comparator::compare_blocks`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockComparison {
    pub matches: Vec<MatchRecord>,
    /// Positions are document token indices
    pub script: EditScript,
    pub groups: Vec<ChangeGroup>,
    pub stats: DiffStats,
}

// =============================================================================
// Comparator
// =============================================================================

/// Runs comparisons with one configuration and one pair of oracles.
#[derive(Clone)]
pub struct Comparator {
    config: CompareConfig,
    similarity: Arc<dyn SimilarityOracle>,
    global: Arc<dyn GlobalAligner>,
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Comparator {
    /// Comparator with the built-in lexical similarity and affine aligner.
    ///
    /// The affine aligner is unbounded, and [`Strategy::GlobalAlignment`]
    /// costs O(chars(left) * chars(right)) with it. Install
    /// `AffineAligner::default().with_cell_limit(..)` through
    /// [`with_global_aligner`](Self::with_global_aligner) to turn oversized
    /// inputs into [`DiffError::OracleUnavailable`] instead.
    pub fn new(config: CompareConfig) -> DiffResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            similarity: Arc::new(EmbeddingSimilarity::new(LexicalEmbedder::default())),
            global: Arc::new(AffineAligner::default()),
        })
    }

    pub fn with_similarity(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.similarity = oracle;
        self
    }

    pub fn with_global_aligner(mut self, aligner: Arc<dyn GlobalAligner>) -> Self {
        self.global = aligner;
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    fn aligner(&self) -> Box<dyn Aligner + '_> {
        match self.config.strategy {
            Strategy::Myers => Box::new(Myers),
            Strategy::Opcodes => Box::new(Opcodes::default()),
            Strategy::SetDiff => Box::new(SetDiff::new(self.config.set_diff)),
            Strategy::GlobalAlignment => Box::new(GlobalAlign::new(Arc::clone(&self.global))),
        }
    }

    /// Run the configured strategy over two token sequences.
    pub fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript> {
        let aligner = self.aligner();
        let span = span!(
            Level::DEBUG,
            "align",
            strategy = aligner.name(),
            left = left.len(),
            right = right.len()
        );
        let _guard = span.enter();

        let script = aligner.align(left, right)?;
        debug!(added = script.added.len(), removed = script.removed.len(), "aligned");
        Ok(script)
    }

    /// Diff two whole documents token by token and group the changes.
    pub fn compare_tokens(&self, left: &[Token], right: &[Token]) -> DiffResult<Comparison> {
        let span = span!(Level::DEBUG, "compare_tokens", strategy = %self.config.strategy);
        let _guard = span.enter();

        let script = self.align(left, right)?;
        let groups = self.group(&script, left, right);
        let stats = DiffStats {
            left_tokens: left.len(),
            right_tokens: right.len(),
            added: script.added.len(),
            removed: script.removed.len(),
            groups: groups.len(),
            blocks: MatchStats::default(),
        };
        debug!(changes = stats.changes(), groups = stats.groups, "tokens compared");

        Ok(Comparison { script, groups, stats })
    }

    /// Pair blocks first, then diff only the tokens inside similar pairs.
    ///
    /// Deleted blocks report every token they cover as removed and inserted
    /// blocks every token they cover as added. Exact pairs report nothing.
    /// Tokens outside every block are not compared.
    pub fn compare_blocks(
        &self,
        left_tokens: &[Token],
        right_tokens: &[Token],
        left_blocks: &[Block],
        right_blocks: &[Block],
    ) -> DiffResult<BlockComparison> {
        let span = span!(
            Level::DEBUG,
            "compare_blocks",
            strategy = %self.config.strategy,
            left_blocks = left_blocks.len(),
            right_blocks = right_blocks.len()
        );
        let _guard = span.enter();

        let matches = BlockMatcher::new(Arc::clone(&self.similarity))
            .with_config(self.config.matching)
            .match_blocks(left_blocks, right_blocks)?;

        let mut script = EditScript::default();
        // Overlapping blocks may cover the same token more than once
        let (mut left_seen, mut right_seen) = (FxHashSet::default(), FxHashSet::default());

        for record in &matches {
            let left_idx = record.left.as_ref().map(|b| covered(&b.block, left_tokens)).unwrap_or_default();
            let right_idx = record.right.as_ref().map(|b| covered(&b.block, right_tokens)).unwrap_or_default();

            match record.op {
                MatchOp::Exact => {}
                MatchOp::Deletion => {
                    script.removed.extend(left_idx.iter().map(|&i| removed_at(left_tokens, i)));
                }
                MatchOp::Insertion => {
                    script.added.extend(right_idx.iter().map(|&j| added_at(right_tokens, j)));
                }
                MatchOp::Similar => {
                    left_seen.extend(left_idx.iter().copied());
                    right_seen.extend(right_idx.iter().copied());
                    let sub_left: Vec<Token> = left_idx.iter().map(|&i| left_tokens[i].clone()).collect();
                    let sub_right: Vec<Token> = right_idx.iter().map(|&j| right_tokens[j].clone()).collect();
                    let local = self.align(&sub_left, &sub_right)?;
                    script
                        .removed
                        .extend(local.removed.into_iter().map(|mut c| {
                            c.position = left_idx[c.position];
                            c
                        }));
                    script.added.extend(local.added.into_iter().map(|mut c| {
                        c.position = right_idx[c.position];
                        c
                    }));
                }
            }
        }

        normalize(&mut script);
        let groups = self.group(&script, left_tokens, right_tokens);
        let stats = DiffStats {
            left_tokens: left_seen.len(),
            right_tokens: right_seen.len(),
            added: script.added.len(),
            removed: script.removed.len(),
            groups: groups.len(),
            blocks: MatchStats::from_records(&matches),
        };
        debug!(changes = stats.changes(), groups = stats.groups, "blocks compared");

        Ok(BlockComparison {
            matches,
            script,
            groups,
            stats,
        })
    }

    fn group(&self, script: &EditScript, left: &[Token], right: &[Token]) -> Vec<ChangeGroup> {
        let grouping = &self.config.grouping;
        let mut groups = group_changes(&script.positions(Side::Removed), left, grouping);
        groups.extend(group_changes(&script.positions(Side::Added), right, grouping));
        groups
    }
}

/// Indices of the tokens a block covers, in document order.
fn covered(block: &Block, tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| block.covers(t))
        .map(|(i, _)| i)
        .collect()
}

fn removed_at(tokens: &[Token], i: usize) -> Change {
    Change::removed(i, tokens[i].text.clone())
}

fn added_at(tokens: &[Token], j: usize) -> Change {
    Change::added(j, tokens[j].text.clone())
}

/// Sort both sides by position and drop duplicates from overlapping blocks.
fn normalize(script: &mut EditScript) {
    for side in [&mut script.added, &mut script.removed] {
        side.sort_by_key(|c| c.position);
        side.dedup_by_key(|c| c.position);
    }
}
