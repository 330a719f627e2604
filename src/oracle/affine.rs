//! Affine-gap global alignment (Gotoh), score only.
//!
//! Three rolling DP rows track the best score ending in a match/mismatch, a
//! gap in the second string, and a gap in the first. Time is O(n*m) in
//! characters, memory O(m).

use crate::error::OracleError;

use super::{GlobalAligner, GlobalAlignment};

/// Far enough below any reachable score that adding penalties cannot wrap.
const NEG: i64 = i64::MIN / 4;

/// Scoring scheme. A gap of length `L` scores `gap_open + gap_extend * (L - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineScoring {
    pub match_score: i64,
    pub mismatch: i64,
    pub gap_open: i64,
    pub gap_extend: i64,
}

impl Default for AffineScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch: -1,
            gap_open: -2,
            gap_extend: -1,
        }
    }
}

impl AffineScoring {
    fn gap(&self, len: usize) -> i64 {
        if len == 0 {
            0
        } else {
            self.gap_open + self.gap_extend * (len as i64 - 1)
        }
    }
}

/// Built-in [`GlobalAligner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AffineAligner {
    scoring: AffineScoring,
    /// Refuse inputs whose DP table would exceed this many cells
    max_cells: Option<u64>,
}

impl AffineAligner {
    pub fn new(scoring: AffineScoring) -> Self {
        Self {
            scoring,
            max_cells: None,
        }
    }

    /// Fail with [`OracleError::Unavailable`] instead of aligning inputs
    /// larger than `cells` (`chars(a) * chars(b)`).
    pub fn with_cell_limit(mut self, cells: u64) -> Self {
        self.max_cells = Some(cells);
        self
    }

    pub fn scoring(&self) -> AffineScoring {
        self.scoring
    }

    fn score(&self, a: &[char], b: &[char]) -> i64 {
        let s = &self.scoring;
        let (n, m) = (a.len(), b.len());
        if n == 0 || m == 0 {
            return s.gap(n.max(m));
        }

        let mut mat = vec![NEG; m + 1];
        let mut del = vec![NEG; m + 1];
        let mut ins = vec![NEG; m + 1];
        mat[0] = 0;
        for j in 1..=m {
            ins[j] = s.gap(j);
        }

        let mut next_mat = vec![NEG; m + 1];
        let mut next_del = vec![NEG; m + 1];
        let mut next_ins = vec![NEG; m + 1];

        for i in 1..=n {
            next_mat[0] = NEG;
            next_ins[0] = NEG;
            next_del[0] = s.gap(i);

            for j in 1..=m {
                let diag = mat[j - 1].max(del[j - 1]).max(ins[j - 1]);
                let pair = if a[i - 1] == b[j - 1] { s.match_score } else { s.mismatch };
                next_mat[j] = diag + pair;

                next_del[j] = (mat[j] + s.gap_open)
                    .max(del[j] + s.gap_extend)
                    .max(ins[j] + s.gap_open);

                next_ins[j] = (next_mat[j - 1] + s.gap_open)
                    .max(next_ins[j - 1] + s.gap_extend)
                    .max(next_del[j - 1] + s.gap_open);
            }

            std::mem::swap(&mut mat, &mut next_mat);
            std::mem::swap(&mut del, &mut next_del);
            std::mem::swap(&mut ins, &mut next_ins);
        }

        mat[m].max(del[m]).max(ins[m])
    }
}

impl GlobalAligner for AffineAligner {
    fn align(&self, a: &str, b: &str) -> Result<GlobalAlignment, OracleError> {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        if let Some(limit) = self.max_cells {
            let cells = a.len() as u64 * b.len() as u64;
            if cells > limit {
                return Err(OracleError::unavailable(format!(
                    "alignment needs {cells} cells, limit is {limit}"
                )));
            }
        }

        Ok(GlobalAlignment {
            score: self.score(&a, &b),
            left_len: a.len(),
            right_len: b.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(a: &str, b: &str) -> i64 {
        AffineAligner::default().align(a, b).unwrap().score
    }

    #[test]
    fn test_identical_strings_score_all_matches() {
        assert_eq!(score("kitten", "kitten"), 12);
    }

    #[test]
    fn test_empty_inputs_are_one_gap() {
        assert_eq!(score("", ""), 0);
        assert_eq!(score("abc", ""), -4);
        assert_eq!(score("", "ab"), -3);
    }

    #[test]
    fn test_single_gap_beats_scattered_gaps() {
        // "abcd" vs "ad": one gap of 2 (-3) plus two matches (+4)
        assert_eq!(score("abcd", "ad"), 1);
    }

    #[test]
    fn test_mismatch() {
        assert_eq!(score("abc", "axc"), 3);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(score("the cat sat", "a cat sat down"), score("a cat sat down", "the cat sat"));
    }

    #[test]
    fn test_cell_limit() {
        let aligner = AffineAligner::default().with_cell_limit(10);
        assert!(aligner.align("abc", "abc").is_ok());
        let err = aligner.align("abcd", "abcd").unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));
    }
}
