//! Merge positional changes into visual groups for highlighting.
//!
//! Changes are walked in the given order. A change joins the open group when
//! it is on the same page, has the same change type, and is near the last
//! token added to the group: vertically aligned at the top or bottom edge
//! (within `line_threshold`) or starting less than `distance_threshold` to
//! the right of it. Otherwise the open group is closed and a new one starts.
//!
//! The horizontal gap is signed: a token that starts to the left of the
//! previous one (a wrapped line) always counts as near.

use tracing::trace;

use crate::algo::Side;
use crate::geom::Rect;
use crate::token::Token;

pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 20.0;
pub const DEFAULT_LINE_THRESHOLD: f32 = 5.0;

/// Grouping thresholds, in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroupingConfig {
    /// Maximum gap from the previous token's right edge to this token's left edge
    pub distance_threshold: f32,
    /// Maximum difference between top edges or between bottom edges
    pub line_threshold: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            line_threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl GroupingConfig {
    fn adjacent(&self, prev: &Rect, cur: &Rect) -> bool {
        (cur.y0 - prev.y0).abs() < self.line_threshold
            || (cur.y1 - prev.y1).abs() < self.line_threshold
            || cur.x0 - prev.x1 < self.distance_threshold
    }
}

/// A run of same-type changes that sit close together on one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeGroup {
    pub page_index: usize,
    /// Union of every member's box
    pub bbox: Rect,
    /// Member texts joined with single spaces
    pub text: String,
    pub change_type: Side,
    /// Number of tokens merged into the group
    pub len: usize,
}

struct OpenGroup {
    group: ChangeGroup,
    last: Rect,
}

/// Group `changes` (token index and side) against `tokens`.
///
/// Indices outside `tokens` and tokens without a box are skipped. Output
/// order is the order in which groups were closed.
pub fn group_changes(changes: &[(usize, Side)], tokens: &[Token], config: &GroupingConfig) -> Vec<ChangeGroup> {
    let mut groups = Vec::new();
    let mut open: Option<OpenGroup> = None;

    for &(index, side) in changes {
        let Some(token) = tokens.get(index) else {
            trace!(index, len = tokens.len(), "change index out of range");
            continue;
        };
        let Some(bbox) = token.bbox else {
            trace!(index, "token has no box");
            continue;
        };

        if let Some(cur) = open.as_mut() {
            let g = &mut cur.group;
            if g.page_index == token.page_index && g.change_type == side && config.adjacent(&cur.last, &bbox) {
                g.bbox = g.bbox.union(&bbox);
                g.text.push(' ');
                g.text.push_str(token.as_str());
                g.len += 1;
                cur.last = bbox;
                continue;
            }
        }

        if let Some(done) = open.take() {
            groups.push(done.group);
        }
        open = Some(OpenGroup {
            group: ChangeGroup {
                page_index: token.page_index,
                bbox,
                text: token.text.to_string(),
                change_type: side,
                len: 1,
            },
            last: bbox,
        });
    }

    if let Some(done) = open {
        groups.push(done.group);
    }
    groups
}
