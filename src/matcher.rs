//! Block matching: pair structural regions across two documents.
//!
//! Greedy, single pass over the left blocks in order. Each left block scans
//! the right blocks not yet claimed:
//!
//! 1. same text, page and kind: `Exact`, stop scanning (first hit wins even
//!    if a later candidate would score as well);
//! 2. otherwise both text blocks are scored by the [`SimilarityOracle`] and
//!    the best unclaimed candidate is kept (earliest wins ties);
//! 3. a best score strictly above the threshold is `Similar` and claims the
//!    right block, anything else is a `Deletion`.
//!
//! Right blocks never claimed become `Insertion`s. This is not an optimal
//! bipartite matching: an earlier left block may take a right block a later
//! one would have liked better, and output order depends on input order.
//!
//! Non-text blocks are never sent to the oracle; they pair only exactly.
//!
//! Cost is O(|left| * |right|) oracle calls, the dominant cost of a whole
//! comparison. [`SimilarityOracle::prepare`] is called once with every text
//! before the loop so embeddings can be computed in one batch. With the
//! `parallel` feature the scores are computed across threads first; the
//! claiming pass stays sequential so results are identical.

use std::sync::Arc;

use tracing::{Level, debug, span};

use crate::error::{DiffError, DiffResult, OracleError};
use crate::oracle::SimilarityOracle;
use crate::token::Block;

/// Default cosine similarity a pair must exceed to count as `Similar`.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

// =============================================================================
// Public Types
// =============================================================================

/// How a block pair (or lone block) was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchOp {
    Exact,
    Similar,
    /// Right block with no left counterpart
    Insertion,
    /// Left block with no right counterpart
    Deletion,
}

/// A block together with its index in the input list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockRef {
    pub index: usize,
    pub block: Block,
}

/// One output row of the matcher.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRecord {
    pub op: MatchOp,
    /// Absent for `Insertion`
    pub left: Option<BlockRef>,
    /// Absent for `Deletion`
    pub right: Option<BlockRef>,
    /// Oracle score for `Similar` pairs
    pub score: Option<f32>,
}

impl MatchRecord {
    fn paired(op: MatchOp, i: usize, left: &Block, j: usize, right: &Block, score: Option<f32>) -> Self {
        Self {
            op,
            left: Some(BlockRef { index: i, block: left.clone() }),
            right: Some(BlockRef { index: j, block: right.clone() }),
            score,
        }
    }

    fn deletion(i: usize, left: &Block) -> Self {
        Self {
            op: MatchOp::Deletion,
            left: Some(BlockRef { index: i, block: left.clone() }),
            right: None,
            score: None,
        }
    }

    fn insertion(j: usize, right: &Block) -> Self {
        Self {
            op: MatchOp::Insertion,
            left: None,
            right: Some(BlockRef { index: j, block: right.clone() }),
            score: None,
        }
    }

    pub fn left_index(&self) -> Option<usize> {
        self.left.as_ref().map(|b| b.index)
    }

    pub fn right_index(&self) -> Option<usize> {
        self.right.as_ref().map(|b| b.index)
    }
}

/// Matcher settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// A best score must be strictly greater than this to be `Similar`.
    pub similarity_threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Tally of match operators.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchStats {
    pub exact: usize,
    pub similar: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl MatchStats {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            match record.op {
                MatchOp::Exact => stats.exact += 1,
                MatchOp::Similar => stats.similar += 1,
                MatchOp::Insertion => stats.insertions += 1,
                MatchOp::Deletion => stats.deletions += 1,
            }
        }
        stats
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Greedy block matcher over an injected similarity oracle.
#[derive(Clone)]
pub struct BlockMatcher {
    oracle: Arc<dyn SimilarityOracle>,
    config: MatchConfig,
}

impl std::fmt::Debug for BlockMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockMatcher").field("config", &self.config).finish_non_exhaustive()
    }
}

impl BlockMatcher {
    pub fn new(oracle: Arc<dyn SimilarityOracle>) -> Self {
        Self {
            oracle,
            config: MatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Pair `left` blocks with `right` blocks.
    ///
    /// Every input block appears in exactly one record. Records for left
    /// blocks come first, in left order; insertions follow in right order.
    pub fn match_blocks(&self, left: &[Block], right: &[Block]) -> DiffResult<Vec<MatchRecord>> {
        let span = span!(Level::DEBUG, "match_blocks", left = left.len(), right = right.len());
        let _guard = span.enter();

        let texts: Vec<&str> = left
            .iter()
            .chain(right)
            .filter(|b| b.is_text())
            .map(|b| b.text.as_str())
            .collect();
        self.oracle.prepare(&texts).map_err(DiffError::similarity)?;

        #[cfg(feature = "parallel")]
        let records = {
            let matrix = self.score_matrix(left, right)?;
            claim(left, right, self.config.similarity_threshold, |i, j| Ok(matrix[i][j]))?
        };

        #[cfg(not(feature = "parallel"))]
        let records = claim(left, right, self.config.similarity_threshold, |i, j| {
            self.score(&left[i], &right[j])
        })?;

        let stats = MatchStats::from_records(&records);
        debug!(
            exact = stats.exact,
            similar = stats.similar,
            insertions = stats.insertions,
            deletions = stats.deletions,
            "blocks matched"
        );
        Ok(records)
    }

    fn score(&self, a: &Block, b: &Block) -> DiffResult<f32> {
        let score = self.oracle.similarity(&a.text, &b.text).map_err(DiffError::similarity)?;
        if !score.is_finite() {
            return Err(DiffError::similarity(OracleError::invalid(format!(
                "non-finite similarity score {score}"
            ))));
        }
        Ok(score)
    }

    /// Every left-by-right score the claiming pass could ask for, computed
    /// in parallel over left blocks. Pairs that are exact or not comparable
    /// hold NaN and are never read.
    #[cfg(feature = "parallel")]
    fn score_matrix(&self, left: &[Block], right: &[Block]) -> DiffResult<Vec<Vec<f32>>> {
        use rayon::prelude::*;

        left.par_iter()
            .map(|lb| {
                right
                    .iter()
                    .map(|rb| {
                        if is_exact(lb, rb) || !comparable(lb, rb) {
                            Ok(f32::NAN)
                        } else {
                            self.score(lb, rb)
                        }
                    })
                    .collect::<DiffResult<Vec<f32>>>()
            })
            .collect()
    }
}

#[inline]
fn is_exact(a: &Block, b: &Block) -> bool {
    a.page_index == b.page_index && a.kind == b.kind && a.text == b.text
}

#[inline]
fn comparable(a: &Block, b: &Block) -> bool {
    a.is_text() && b.is_text()
}

/// The sequential claiming pass. `score(i, j)` is only called for unclaimed,
/// comparable, non-exact pairs scanned before any exact hit.
fn claim<F>(left: &[Block], right: &[Block], threshold: f32, mut score: F) -> DiffResult<Vec<MatchRecord>>
where
    F: FnMut(usize, usize) -> DiffResult<f32>,
{
    let mut used = vec![false; right.len()];
    let mut records = Vec::with_capacity(left.len() + right.len());

    for (i, lb) in left.iter().enumerate() {
        let mut exact = None;
        let mut best: Option<(usize, f32)> = None;

        for (j, rb) in right.iter().enumerate() {
            if used[j] {
                continue;
            }
            if is_exact(lb, rb) {
                exact = Some(j);
                break;
            }
            if !comparable(lb, rb) {
                continue;
            }
            let s = score(i, j)?;
            if best.is_none_or(|(_, top)| s > top) {
                best = Some((j, s));
            }
        }

        match (exact, best) {
            (Some(j), _) => {
                used[j] = true;
                records.push(MatchRecord::paired(MatchOp::Exact, i, lb, j, &right[j], None));
            }
            (None, Some((j, s))) if s > threshold => {
                used[j] = true;
                records.push(MatchRecord::paired(MatchOp::Similar, i, lb, j, &right[j], Some(s)));
            }
            _ => records.push(MatchRecord::deletion(i, lb)),
        }
    }

    for (j, rb) in right.iter().enumerate() {
        if !used[j] {
            records.push(MatchRecord::insertion(j, rb));
        }
    }

    Ok(records)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn block(text: &str, page: usize) -> Block {
        Block::text(text, Rect::new(0.0, 0.0, 100.0, 20.0), page)
    }

    /// Scores by shared first letter: 0.9 when equal, 0.1 otherwise.
    fn first_letter(a: &str, b: &str) -> Result<f32, OracleError> {
        Ok(if a.chars().next() == b.chars().next() { 0.9 } else { 0.1 })
    }

    fn matcher<O: SimilarityOracle + 'static>(oracle: O) -> BlockMatcher {
        BlockMatcher::new(Arc::new(oracle))
    }

    #[test]
    fn test_first_exact_match_wins() {
        let left = [block("X", 0)];
        let right = [block("X", 0), block("X", 0)];
        let records = matcher(first_letter).match_blocks(&left, &right).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].op, MatchOp::Exact);
        assert_eq!(records[0].left_index(), Some(0));
        assert_eq!(records[0].right_index(), Some(0));
        assert_eq!(records[1].op, MatchOp::Insertion);
        assert_eq!(records[1].right_index(), Some(1));
    }

    #[test]
    fn test_exact_requires_same_page() {
        let left = [block("same words", 0)];
        let right = [block("same words", 1)];
        let records = matcher(first_letter).match_blocks(&left, &right).unwrap();
        assert_eq!(records[0].op, MatchOp::Similar);
        assert_eq!(records[0].score, Some(0.9));
    }

    #[test]
    fn test_exact_short_circuits_before_better_scores() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let oracle = move |_: &str, _: &str| -> Result<f32, OracleError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1.0)
        };
        let left = [block("b", 0)];
        let right = [block("a", 0), block("b", 0), block("c", 0)];
        let records = matcher(oracle).match_blocks(&left, &right).unwrap();
        assert_eq!(records[0].op, MatchOp::Exact);
        assert_eq!(records[0].right_index(), Some(1));
        // "a" was scored before the exact hit; "c" never was.
        #[cfg(not(feature = "parallel"))]
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let oracle = |_: &str, _: &str| -> Result<f32, OracleError> { Ok(0.8) };
        let records = matcher(oracle).match_blocks(&[block("a", 0)], &[block("b", 0)]).unwrap();
        assert_eq!(records[0].op, MatchOp::Deletion);
        assert_eq!(records[1].op, MatchOp::Insertion);

        let lenient = matcher(oracle).with_config(MatchConfig { similarity_threshold: 0.5 });
        let records = lenient.match_blocks(&[block("a", 0)], &[block("b", 0)]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].op, MatchOp::Similar);
    }

    #[test]
    fn test_earlier_left_block_claims_first() {
        // Both left blocks like the single right block; only the first gets it.
        let left = [block("apple pie", 0), block("apple tart", 0)];
        let right = [block("apple crumble", 0)];
        let records = matcher(first_letter).match_blocks(&left, &right).unwrap();

        assert_eq!(records[0].op, MatchOp::Similar);
        assert_eq!(records[0].left_index(), Some(0));
        assert_eq!(records[1].op, MatchOp::Deletion);
        assert_eq!(records[1].left_index(), Some(1));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_best_candidate_earliest_on_tie() {
        let left = [block("kiwi", 0)];
        let right = [block("lime", 0), block("kale", 0), block("kelp", 0)];
        let records = matcher(first_letter).match_blocks(&left, &right).unwrap();
        assert_eq!(records[0].op, MatchOp::Similar);
        assert_eq!(records[0].right_index(), Some(1));
        let inserted: Vec<_> = records[1..].iter().filter_map(MatchRecord::right_index).collect();
        assert_eq!(inserted, vec![0, 2]);
    }

    #[test]
    fn test_every_block_appears_once() {
        let left = [block("a1", 0), block("b1", 0), block("zz", 1), block("c1", 2)];
        let right = [block("c2", 2), block("a1", 0), block("q", 0), block("b2", 0), block("y", 3)];
        let records = matcher(first_letter).match_blocks(&left, &right).unwrap();

        let mut lefts: Vec<_> = records.iter().filter_map(MatchRecord::left_index).collect();
        let mut rights: Vec<_> = records.iter().filter_map(MatchRecord::right_index).collect();
        lefts.sort_unstable();
        rights.sort_unstable();
        assert_eq!(lefts, vec![0, 1, 2, 3]);
        assert_eq!(rights, vec![0, 1, 2, 3, 4]);

        let stats = MatchStats::from_records(&records);
        assert_eq!(stats.exact, 1);
        assert_eq!(stats.similar + stats.deletions, 3);
        assert_eq!(stats.exact + stats.similar + stats.insertions, 5);
    }

    #[test]
    fn test_non_text_blocks_skip_oracle() {
        let oracle = |_: &str, _: &str| -> Result<f32, OracleError> { Err(OracleError::unavailable("must not be called")) };
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let left = [Block::non_text("figure-1", rect, 0)];
        let right = [Block::non_text("figure-1", rect, 0), Block::non_text("figure-2", rect, 0)];
        let records = matcher(oracle).match_blocks(&left, &right).unwrap();
        assert_eq!(records[0].op, MatchOp::Exact);
        assert_eq!(records[1].op, MatchOp::Insertion);
    }

    #[test]
    fn test_oracle_failure_is_surfaced() {
        let oracle = |_: &str, _: &str| -> Result<f32, OracleError> { Err(OracleError::Timeout { millis: 100 }) };
        let err = matcher(oracle).match_blocks(&[block("a", 0)], &[block("b", 0)]).unwrap_err();
        assert!(matches!(err, DiffError::OracleUnavailable { oracle: "similarity", .. }));
    }

    #[test]
    fn test_nan_score_is_rejected() {
        let oracle = |_: &str, _: &str| -> Result<f32, OracleError> { Ok(f32::NAN) };
        let err = matcher(oracle).match_blocks(&[block("a", 0)], &[block("b", 0)]).unwrap_err();
        assert!(err.is_oracle());
    }

    #[test]
    fn test_empty_inputs() {
        let m = matcher(first_letter);
        assert!(m.match_blocks(&[], &[]).unwrap().is_empty());
        let records = m.match_blocks(&[block("a", 0)], &[]).unwrap();
        assert_eq!(records[0].op, MatchOp::Deletion);
        let records = m.match_blocks(&[], &[block("a", 0)]).unwrap();
        assert_eq!(records[0].op, MatchOp::Insertion);
    }
}
