//! Longest-matching-block opcodes (Ratcliff/Obershelp).
//!
//! Finds the longest contiguous run common to both sequences, then recurses
//! on the pieces to its left and right. Opcodes are read off the sorted
//! matching blocks. This is the classic `SequenceMatcher` behaviour,
//! including the popularity cut: when the right side has 200 or more
//! elements, values occurring in more than 1% of it (plus one) never seed a
//! match, though matches may still extend over them.
//!
//! Unlike the patience heuristic it does not need unique anchors, so prose
//! full of repeated function words still aligns on its longest shared runs.

use std::hash::Hash;
use std::ops::Range;

use rustc_hash::FxHashMap;
use similar::DiffTag;

/// Right-side length at which popular values stop seeding matches.
const AUTOJUNK_MIN_LEN: usize = 200;

/// `(left_start, right_start, len)`; the final block is always `(la, lb, 0)`.
pub type MatchingBlock = (usize, usize, usize);

/// Matcher over two borrowed sequences.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each right-side value, ascending
    b2j: FxHashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: FxHashMap<&'a T, Vec<usize>> = FxHashMap::default();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }
        Self { a, b, b2j }
    }

    /// Longest common run inside `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the run starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        // j2len[j]: length of the match ending at a[i - 1], b[j]
        let mut j2len: FxHashMap<usize, usize> = FxHashMap::default();
        let mut next: FxHashMap<usize, usize> = FxHashMap::default();

        for i in alo..ahi {
            next.clear();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            std::mem::swap(&mut j2len, &mut next);
        }

        // Popular values never seed a match but may extend one
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi && bestj + bestsize < bhi && self.a[besti + bestsize] == self.b[bestj + bestsize] {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Maximal matching blocks in ascending order, adjacent blocks merged,
    /// terminated by the `(la, lb, 0)` sentinel.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        blocks.sort_unstable();

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len() + 1);
        for (i, j, k) in blocks {
            match merged.last_mut() {
                Some(last) if last.0 + last.2 == i && last.1 + last.2 == j => last.2 += k,
                _ => merged.push((i, j, k)),
            }
        }
        merged.push((la, lb, 0));
        merged
    }

    /// Opcodes covering both sequences end to end, in order.
    pub fn opcodes(&self) -> Vec<(DiffTag, Range<usize>, Range<usize>)> {
        let (mut i, mut j) = (0, 0);
        let mut ops = Vec::new();

        for (ai, bj, size) in self.matching_blocks() {
            let tag = match (i < ai, j < bj) {
                (true, true) => Some(DiffTag::Replace),
                (true, false) => Some(DiffTag::Delete),
                (false, true) => Some(DiffTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push((tag, i..ai, j..bj));
            }
            i = ai + size;
            j = bj + size;
            if size > 0 {
                ops.push((DiffTag::Equal, ai..i, bj..j));
            }
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_block_wins_over_unique_anchors() {
        let a = ["the", "cat", "the", "dog", "the"];
        let b = ["the", "dog", "the", "cat", "the"];
        let m = SequenceMatcher::new(&a, &b);
        assert_eq!(m.matching_blocks(), vec![(0, 2, 3), (5, 5, 0)]);
        assert_eq!(
            m.opcodes(),
            vec![(DiffTag::Insert, 0..0, 0..2), (DiffTag::Equal, 0..3, 2..5), (DiffTag::Delete, 3..5, 5..5)]
        );
    }

    #[test]
    fn test_recurses_on_both_sides() {
        let a: Vec<char> = "abxcd".chars().collect();
        let b: Vec<char> = "abcd".chars().collect();
        let m = SequenceMatcher::new(&a, &b);
        assert_eq!(m.matching_blocks(), vec![(0, 0, 2), (3, 2, 2), (5, 4, 0)]);
        assert_eq!(
            m.opcodes(),
            vec![(DiffTag::Equal, 0..2, 0..2), (DiffTag::Delete, 2..3, 2..2), (DiffTag::Equal, 3..5, 2..4)]
        );
    }

    #[test]
    fn test_replace_and_empty() {
        let m = SequenceMatcher::new(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(m.opcodes()[1], (DiffTag::Replace, 1..2, 1..2));

        let empty: [&str; 0] = [];
        assert!(SequenceMatcher::new(&empty, &empty).opcodes().is_empty());
        assert_eq!(SequenceMatcher::new(&empty, &["a"]).opcodes(), vec![(DiffTag::Insert, 0..0, 0..1)]);
    }

    #[test]
    fn test_popular_values_do_not_seed_matches() {
        // "x" fills far more than 1% of the right side, so it never matches alone
        let mut b = vec!["y"];
        b.extend(std::iter::repeat_n("x", 200));
        let m = SequenceMatcher::new(&["x"], &b);
        assert_eq!(m.matching_blocks(), vec![(1, 201, 0)]);

        // A seeded match still extends over popular neighbours.
        let mut a = vec!["x"; 3];
        a.push("anchor");
        let mut b = vec!["x"; 199];
        b.push("anchor");
        let m = SequenceMatcher::new(&a, &b);
        assert_eq!(m.matching_blocks(), vec![(0, 196, 4), (4, 200, 0)]);
    }
}
