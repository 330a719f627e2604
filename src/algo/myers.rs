//! Myers shortest-edit-script over token sequences.
//!
//! | Algorithm | Time | Space | Output |
//! |-----------|------|-------|--------|
//! | DP table | O(n*m) | O(n*m) | minimal |
//! | **Myers** | O((n+m)*d) | O(d*(n+m)) | **minimal** |
//! | Opcodes | ~O(n+m) typical | O(n+m) | not minimal |
//!
//! `d` is the edit distance, so near-identical documents cost close to
//! O(n+m). Fully disjoint inputs are the worst case: `d = n+m` and both time
//! and trace memory degrade to O((n+m)^2). The search is never cut short; a
//! caller that cannot afford the worst case should pick another strategy.
//!
//! The trace stores one frontier snapshot per `d` for backtracking. Each
//! snapshot spans `2*(n+m)+1` diagonals.
//!
//! # References
//!
//! - Myers, E.W. "An O(ND) Difference Algorithm and Its Variations" (1986)

use tracing::trace;

use crate::error::DiffResult;
use crate::token::Token;

use super::script::{Aligner, Change, EditScript};

// =============================================================================
// Public Types
// =============================================================================

/// Edit operation in a diff sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Element at old_idx equals element at new_idx
    Keep { old_idx: usize, new_idx: usize },
    /// Element at new_idx exists only in the new sequence
    Insert { new_idx: usize },
    /// Element at old_idx exists only in the old sequence
    Delete { old_idx: usize },
}

impl Edit {
    pub fn is_keep(&self) -> bool {
        matches!(self, Edit::Keep { .. })
    }
}

/// Result of a Myers diff
#[derive(Debug, Default)]
pub struct MyersResult {
    /// Edits in path order (ascending on both sides)
    pub edits: Vec<Edit>,
    pub stats: MyersStats,
}

/// Statistics from a Myers diff
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MyersStats {
    pub kept: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl MyersStats {
    /// Number of inserts plus deletes; the true edit distance.
    pub fn edit_distance(&self) -> usize {
        self.inserted + self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.edit_distance() == 0
    }
}

/// The Myers strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Myers;

impl Aligner for Myers {
    fn name(&self) -> &'static str {
        "myers"
    }

    fn align(&self, left: &[Token], right: &[Token]) -> DiffResult<EditScript> {
        Ok(diff_tokens(left, right))
    }
}

// =============================================================================
// Main API
// =============================================================================

/// Minimal edit script between two token sequences, compared by text.
pub fn diff_tokens(left: &[Token], right: &[Token]) -> EditScript {
    let old: Vec<&str> = left.iter().map(Token::as_str).collect();
    let new: Vec<&str> = right.iter().map(Token::as_str).collect();

    let mut script = EditScript::default();
    for edit in diff_sequences(&old, &new).edits {
        match edit {
            Edit::Insert { new_idx } => script.added.push(Change::added(new_idx, right[new_idx].text.clone())),
            Edit::Delete { old_idx } => script.removed.push(Change::removed(old_idx, left[old_idx].text.clone())),
            Edit::Keep { .. } => {}
        }
    }
    script
}

/// Compute the shortest edit script between two sequences.
pub fn diff_sequences<T: PartialEq>(old: &[T], new: &[T]) -> MyersResult {
    let n = old.len();
    let m = new.len();

    // Common prefix and suffix never need the search
    let mut prefix_len = 0;
    while prefix_len < n && prefix_len < m && old[prefix_len] == new[prefix_len] {
        prefix_len += 1;
    }

    let mut suffix_len = 0;
    while suffix_len < (n - prefix_len)
        && suffix_len < (m - prefix_len)
        && old[n - 1 - suffix_len] == new[m - 1 - suffix_len]
    {
        suffix_len += 1;
    }

    let mut edits: Vec<Edit> = (0..prefix_len).map(|i| Edit::Keep { old_idx: i, new_idx: i }).collect();

    let old_mid = &old[prefix_len..n - suffix_len];
    let new_mid = &new[prefix_len..m - suffix_len];

    if old_mid.is_empty() {
        edits.extend((0..new_mid.len()).map(|i| Edit::Insert { new_idx: i + prefix_len }));
    } else if new_mid.is_empty() {
        edits.extend((0..old_mid.len()).map(|i| Edit::Delete { old_idx: i + prefix_len }));
    } else {
        edits.extend(myers_core(old_mid, new_mid).into_iter().map(|edit| shift(edit, prefix_len)));
    }

    for i in 0..suffix_len {
        edits.push(Edit::Keep {
            old_idx: n - suffix_len + i,
            new_idx: m - suffix_len + i,
        });
    }

    let mut stats = MyersStats::default();
    for edit in &edits {
        match edit {
            Edit::Keep { .. } => stats.kept += 1,
            Edit::Insert { .. } => stats.inserted += 1,
            Edit::Delete { .. } => stats.deleted += 1,
        }
    }

    MyersResult { edits, stats }
}

fn shift(edit: Edit, by: usize) -> Edit {
    match edit {
        Edit::Keep { old_idx, new_idx } => Edit::Keep {
            old_idx: old_idx + by,
            new_idx: new_idx + by,
        },
        Edit::Insert { new_idx } => Edit::Insert { new_idx: new_idx + by },
        Edit::Delete { old_idx } => Edit::Delete { old_idx: old_idx + by },
    }
}

// =============================================================================
// Myers Algorithm Core
// =============================================================================

/// Forward search over diagonals `k = x - y`, then backtrack.
///
/// For each `d`, `v[k]` holds the furthest `x` reached on diagonal `k` using
/// `d` edits. A diagonal extends from its neighbour with the larger `x`;
/// ties go to the deletion neighbour `k - 1`. Equal runs ("snakes") are
/// followed for free. The first `d` reaching `(n, m)` is the edit distance.
///
/// Both inputs must be non-empty.
fn myers_core<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max_d = n + m;
    let offset = max_d;

    let mut v = vec![-1isize; (2 * max_d + 1) as usize];
    v[(offset + 1) as usize] = 0;

    // trace[d] is the frontier as it stood before step d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'outer: for d in 0..=max_d {
        trace.push(v.clone());

        for k in (-d..=d).step_by(2) {
            let kk = (k + offset) as usize;

            let mut x = if k == -d || (k != d && v[kk - 1] < v[kk + 1]) {
                v[kk + 1] // insertion: x unchanged, y grows
            } else {
                v[kk - 1] + 1 // deletion: x grows
            };
            let mut y = x - k;

            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }

            v[kk] = x;

            if x >= n && y >= m {
                trace!(edit_distance = d, "myers reached end corner");
                break 'outer;
            }
        }
    }

    backtrack(&trace, n, m, offset)
}

/// Walk the recorded frontiers back from `(n, m)` to `(0, 0)`.
fn backtrack(trace: &[Vec<isize>], n: isize, m: isize, offset: isize) -> Vec<Edit> {
    let mut x = n;
    let mut y = m;
    let mut edits = Vec::new();

    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let kk = (k + offset) as usize;

        let prev_k = if k == -d || (k != d && v[kk - 1] < v[kk + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;

        // Snake: diagonal moves carry no change record
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit::Keep {
                old_idx: x as usize,
                new_idx: y as usize,
            });
        }

        if d > 0 {
            if x == prev_x {
                edits.push(Edit::Insert { new_idx: prev_y as usize });
            } else {
                edits.push(Edit::Delete { old_idx: prev_x as usize });
            }
        }

        x = prev_x;
        y = prev_y;
    }

    edits.reverse();
    edits
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenSeq;

    fn words(items: &[&str]) -> TokenSeq {
        TokenSeq::from_words(items.iter().copied())
    }

    fn script(old: &[&str], new: &[&str]) -> EditScript {
        diff_tokens(&words(old), &words(new))
    }

    #[test]
    fn test_empty_sequences() {
        let result = diff_sequences::<u32>(&[], &[]);
        assert!(result.edits.is_empty());
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_insert_all() {
        let s = script(&[], &["a", "b", "c"]);
        assert_eq!(s.added, vec![Change::added(0, "a"), Change::added(1, "b"), Change::added(2, "c")]);
        assert!(s.removed.is_empty());
    }

    #[test]
    fn test_delete_all() {
        let s = script(&["a", "b"], &[]);
        assert_eq!(s.removed, vec![Change::removed(0, "a"), Change::removed(1, "b")]);
        assert!(s.added.is_empty());
    }

    #[test]
    fn test_no_changes() {
        let result = diff_sequences(&[1, 2, 3], &[1, 2, 3]);
        assert_eq!(result.stats.kept, 3);
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_substitution_is_one_delete_one_insert() {
        let s = script(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(s.removed, vec![Change::removed(1, "b")]);
        assert_eq!(s.added, vec![Change::added(1, "x")]);
    }

    #[test]
    fn test_disjoint_sequences() {
        let result = diff_sequences(&["a", "b"], &["c", "d", "e"]);
        assert_eq!(result.stats.kept, 0);
        assert_eq!(result.stats.deleted, 2);
        assert_eq!(result.stats.inserted, 3);
    }

    #[test]
    fn test_reorder_is_reported() {
        let s = script(&["a", "b"], &["b", "a"]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.apply(&words(&["a", "b"])), vec!["b", "a"]);
    }

    #[test]
    fn test_tie_prefers_deletion_first() {
        // Both "delete a, insert b" orders are minimal; the deletion
        // neighbour wins ties so the delete comes first in path order.
        let result = diff_sequences(&["a"], &["b"]);
        assert_eq!(result.edits, vec![Edit::Delete { old_idx: 0 }, Edit::Insert { new_idx: 0 }]);
    }

    #[test]
    fn test_classic_myers_example() {
        // ABCABBA -> CBABAC has edit distance 5
        let old: Vec<char> = "ABCABBA".chars().collect();
        let new: Vec<char> = "CBABAC".chars().collect();
        let result = diff_sequences(&old, &new);
        assert_eq!(result.stats.edit_distance(), 5);
        assert_eq!(result.stats.kept, 4);
    }

    #[test]
    fn test_edits_are_path_ordered() {
        let result = diff_sequences(&[1, 2, 3, 4, 5], &[0, 2, 3, 6, 5, 7]);
        let mut last_old = 0;
        let mut last_new = 0;
        for edit in &result.edits {
            match *edit {
                Edit::Keep { old_idx, new_idx } => {
                    assert!(old_idx >= last_old && new_idx >= last_new);
                    last_old = old_idx;
                    last_new = new_idx;
                }
                Edit::Insert { new_idx } => {
                    assert!(new_idx >= last_new);
                    last_new = new_idx;
                }
                Edit::Delete { old_idx } => {
                    assert!(old_idx >= last_old);
                    last_old = old_idx;
                }
            }
        }
        assert_eq!(result.stats.edit_distance(), 5);
    }

    #[test]
    fn test_prefix_and_suffix() {
        let result = diff_sequences(&[1, 2, 3, 4, 5, 100], &[1, 2, 3, 4, 5, 200]);
        assert_eq!(result.stats.kept, 5);
        assert_eq!(result.stats.deleted, 1);
        assert_eq!(result.stats.inserted, 1);

        let result = diff_sequences(&[100, 1, 2, 3], &[200, 1, 2, 3]);
        assert_eq!(result.stats.kept, 3);
        assert_eq!(result.stats.edit_distance(), 2);
    }

    #[test]
    fn test_duplicate_tokens() {
        let s = script(&["the", "cat", "the", "hat"], &["the", "hat"]);
        assert_eq!(s.len(), 2);
        assert!(s.added.is_empty());
        assert_eq!(s.apply(&words(&["the", "cat", "the", "hat"])), vec!["the", "hat"]);
    }
}
