//! Document content model: tokens, token sequences, and blocks.
//!
//! Tokens and blocks come from an external text-extraction layer and are
//! read-only here. A [`TokenSeq`] is frozen at construction; its order is the
//! document's reading order and the only order the aligners rely on.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use compact_str::CompactString;

use crate::geom::Rect;

// =============================================================================
// Token
// =============================================================================

/// Smallest diffable unit of content (a word) with its location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub text: CompactString,
    /// Absent when the producer could not place the word
    pub bbox: Option<Rect>,
    pub page_index: usize,
}

impl Token {
    pub fn new(text: impl Into<CompactString>, bbox: Option<Rect>, page_index: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page_index,
        }
    }

    /// Token with a known position on a page.
    pub fn placed(text: impl Into<CompactString>, bbox: Rect, page_index: usize) -> Self {
        Self::new(text, Some(bbox), page_index)
    }

    /// Bare word without location, on page 0.
    pub fn word(text: impl Into<CompactString>) -> Self {
        Self::new(text, None, 0)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// =============================================================================
// TokenSeq
// =============================================================================

/// Immutable, cheaply clonable sequence of tokens for one document side.
#[derive(Clone, PartialEq, Default)]
pub struct TokenSeq {
    tokens: Arc<[Token]>,
}

impl TokenSeq {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }

    /// Build a sequence of unplaced words (page 0, no boxes).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        words.into_iter().map(Token::word).collect()
    }

    /// Token texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::as_str).collect()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl Deref for TokenSeq {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<Vec<Token>> for TokenSeq {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for TokenSeq {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for TokenSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tokens.iter().map(Token::as_str)).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TokenSeq {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TokenSeq {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Token>::deserialize(deserializer).map(Self::new)
    }
}

// =============================================================================
// Block
// =============================================================================

/// Content class of a layout block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlockKind {
    #[default]
    Text,
    /// Images, drawings, anything without extractable text
    NonText,
}

/// Structural region of a page, usually a paragraph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub bbox: Rect,
    pub text: String,
    pub page_index: usize,
    pub kind: BlockKind,
}

impl Block {
    /// A text block.
    pub fn text(text: impl Into<String>, bbox: Rect, page_index: usize) -> Self {
        Self {
            bbox,
            text: text.into(),
            page_index,
            kind: BlockKind::Text,
        }
    }

    /// A non-text block (image, drawing). `label` may be empty.
    pub fn non_text(label: impl Into<String>, bbox: Rect, page_index: usize) -> Self {
        Self {
            bbox,
            text: label.into(),
            page_index,
            kind: BlockKind::NonText,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }

    /// True if the token sits on this block's page and its center falls
    /// inside the block. Tokens without a box never belong to a block.
    pub fn covers(&self, token: &Token) -> bool {
        token.page_index == self.page_index
            && token
                .bbox
                .is_some_and(|bbox| self.bbox.contains_point(bbox.center()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_words_keeps_order() {
        let seq = TokenSeq::from_words(["the", "quick", "fox"]);
        assert_eq!(seq.texts(), vec!["the", "quick", "fox"]);
        assert_eq!(seq.len(), 3);
        assert!(seq.iter().all(|t| t.bbox.is_none() && t.page_index == 0));
    }

    #[test]
    fn test_clone_shares_storage() {
        let seq = TokenSeq::from_words(["a", "b"]);
        let copy = seq.clone();
        assert!(std::ptr::eq(seq.as_slice(), copy.as_slice()));
    }

    #[test]
    fn test_block_covers_by_center() {
        let block = Block::text("hello world", Rect::new(0.0, 0.0, 100.0, 20.0), 1);
        let inside = Token::placed("hello", Rect::new(2.0, 2.0, 30.0, 12.0), 1);
        let other_page = Token::placed("hello", Rect::new(2.0, 2.0, 30.0, 12.0), 0);
        let straddling = Token::placed("world", Rect::new(90.0, 2.0, 130.0, 12.0), 1);
        let unplaced = Token::new("world", None, 1);

        assert!(block.covers(&inside));
        assert!(!block.covers(&other_page));
        assert!(!block.covers(&straddling));
        assert!(!block.covers(&unplaced));
    }

    #[test]
    fn test_debug_lists_texts() {
        let seq = TokenSeq::from_words(["x", "y"]);
        assert_eq!(format!("{seq:?}"), r#"["x", "y"]"#);
    }
}
