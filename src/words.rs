//! Word assembly from positioned glyphs.
//!
//! Text extraction yields characters with boxes, grouped into blocks and
//! lines. Words are rebuilt here by walking each line: whitespace ends a word,
//! and so does a horizontal jump wider than `x_threshold` between consecutive
//! glyphs (kerned text often has no explicit space).

use compact_str::CompactString;
use tracing::{Level, debug, span};

use crate::geom::Rect;
use crate::token::{BlockKind, Token, TokenSeq};

pub const DEFAULT_X_THRESHOLD: f32 = 2.0;

/// One extracted character.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    pub ch: char,
    pub bbox: Option<Rect>,
}

impl Glyph {
    pub fn new(ch: char, bbox: Rect) -> Self {
        Self { ch, bbox: Some(bbox) }
    }
}

/// A layout block: lines of glyphs in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutBlock {
    pub kind: BlockKind,
    pub lines: Vec<Vec<Glyph>>,
}

/// Extracted layout of one page.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutPage {
    pub index: usize,
    pub blocks: Vec<LayoutBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WordConfig {
    /// Largest gap between glyphs of the same word
    pub x_threshold: f32,
}

impl Default for WordConfig {
    fn default() -> Self {
        Self {
            x_threshold: DEFAULT_X_THRESHOLD,
        }
    }
}

/// Word being built on the current line.
struct Pending {
    text: CompactString,
    bbox: Rect,
}

struct LineWalker<'a> {
    page: usize,
    out: &'a mut Vec<Token>,
    word: Option<Pending>,
    last_x1: Option<f32>,
}

impl LineWalker<'_> {
    fn flush(&mut self) {
        if let Some(word) = self.word.take() {
            self.out.push(Token::placed(word.text, word.bbox, self.page));
        }
    }

    fn push(&mut self, ch: char, bbox: Rect, x_threshold: f32) {
        let gap = self.last_x1.is_some_and(|x1| (bbox.x0 - x1).abs() > x_threshold);
        if gap {
            self.flush();
        }
        match self.word.as_mut() {
            Some(word) => {
                word.text.push(ch);
                word.bbox.x1 = word.bbox.x1.max(bbox.x1);
                word.bbox.y1 = word.bbox.y1.max(bbox.y1);
            }
            None => {
                let mut text = CompactString::default();
                text.push(ch);
                self.word = Some(Pending { text, bbox });
            }
        }
        self.last_x1 = Some(bbox.x1);
    }
}

/// Words of one page in reading order, stamped with the page's index.
pub fn assemble_words(page: &LayoutPage, config: &WordConfig) -> Vec<Token> {
    let mut out = Vec::new();
    for block in page.blocks.iter().filter(|b| b.kind == BlockKind::Text) {
        for line in &block.lines {
            let mut walker = LineWalker {
                page: page.index,
                out: &mut out,
                word: None,
                last_x1: None,
            };
            for glyph in line {
                let Some(bbox) = glyph.bbox else { continue };
                if glyph.ch.is_whitespace() {
                    walker.flush();
                    walker.last_x1 = None;
                    continue;
                }
                walker.push(glyph.ch, bbox, config.x_threshold);
            }
            walker.flush();
        }
    }
    out
}

/// Words of every page, concatenated in page order.
pub fn assemble_document(pages: &[LayoutPage], config: &WordConfig) -> TokenSeq {
    let span = span!(Level::DEBUG, "assemble_document", pages = pages.len());
    let _guard = span.enter();

    let tokens: Vec<Token> = pages.iter().flat_map(|p| assemble_words(p, config)).collect();
    debug!(words = tokens.len(), "document assembled");
    TokenSeq::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace glyphs, 5 units wide, starting at `x`.
    fn line(text: &str, x: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| {
                let x0 = x + i as f32 * 5.0;
                Glyph::new(ch, Rect::new(x0, 0.0, x0 + 5.0, 10.0))
            })
            .collect()
    }

    fn page(index: usize, lines: Vec<Vec<Glyph>>) -> LayoutPage {
        LayoutPage {
            index,
            blocks: vec![LayoutBlock {
                kind: BlockKind::Text,
                lines,
            }],
        }
    }

    #[test]
    fn test_spaces_split_words() {
        let words = assemble_words(&page(0, vec![line("hello big world", 0.0)]), &WordConfig::default());
        let texts: Vec<_> = words.iter().map(Token::as_str).collect();
        assert_eq!(texts, vec!["hello", "big", "world"]);
        assert_eq!(words[0].bbox, Some(Rect::new(0.0, 0.0, 25.0, 10.0)));
        assert_eq!(words[1].bbox, Some(Rect::new(30.0, 0.0, 45.0, 10.0)));
    }

    #[test]
    fn test_gap_splits_words() {
        let mut glyphs = line("ab", 0.0);
        glyphs.extend(line("cd", 20.0));
        let words = assemble_words(&page(0, vec![glyphs]), &WordConfig::default());
        let texts: Vec<_> = words.iter().map(Token::as_str).collect();
        assert_eq!(texts, vec!["ab", "cd"]);

        let loose = WordConfig { x_threshold: 15.0 };
        let mut glyphs = line("ab", 0.0);
        glyphs.extend(line("cd", 20.0));
        let words = assemble_words(&page(0, vec![glyphs]), &loose);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].as_str(), "abcd");
    }

    #[test]
    fn test_word_box_grows_right_and_down() {
        let glyphs = vec![
            Glyph::new('T', Rect::new(0.0, 0.0, 6.0, 12.0)),
            Glyph::new('y', Rect::new(6.0, 2.0, 11.0, 14.0)),
        ];
        let words = assemble_words(&page(0, vec![glyphs]), &WordConfig::default());
        assert_eq!(words[0].bbox, Some(Rect::new(0.0, 0.0, 11.0, 14.0)));
    }

    #[test]
    fn test_lines_flush_and_unplaced_glyphs_skipped() {
        let mut first = line("ab", 0.0);
        first.insert(1, Glyph { ch: 'x', bbox: None });
        let words = assemble_words(&page(2, vec![first, line("cd", 10.0)]), &WordConfig::default());
        let texts: Vec<_> = words.iter().map(Token::as_str).collect();
        assert_eq!(texts, vec!["ab", "cd"]);
        assert!(words.iter().all(|w| w.page_index == 2));
    }

    #[test]
    fn test_non_text_blocks_ignored() {
        let mut p = page(0, vec![line("kept", 0.0)]);
        p.blocks.push(LayoutBlock {
            kind: BlockKind::NonText,
            lines: vec![line("figure", 0.0)],
        });
        let words = assemble_words(&p, &WordConfig::default());
        assert_eq!(words.len(), 1);
    }

    #[test]
    fn test_document_stamps_pages() {
        let pages = [page(0, vec![line("one two", 0.0)]), page(1, vec![line("three", 0.0)])];
        let doc = assemble_document(&pages, &WordConfig::default());
        assert_eq!(doc.texts(), vec!["one", "two", "three"]);
        let pages: Vec<_> = doc.iter().map(|t| t.page_index).collect();
        assert_eq!(pages, vec![0, 0, 1]);
    }
}
