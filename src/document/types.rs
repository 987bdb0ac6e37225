//! Core types for document navigation and text

use super::geometry::Rect;

/// Where a link on the current page leads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Page within this document (0-indexed)
    Internal { page: i32 },
    /// Page within another document
    Remote {
        page: i32,
        file_spec: String,
        new_window: bool,
    },
    /// Absolute URI
    Uri { uri: String },
}

/// Link region in target coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub rect: Rect,
    pub target: LinkTarget,
}

/// A single entry of the flattened outline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineItem {
    /// Nesting level (0 = top level)
    pub level: usize,
    /// Destination page (0-indexed)
    pub page_number: i32,
    /// Display title
    pub title: String,
}

/// Bounding box of one search match in target coordinates
pub type SearchHit = Rect;

/// One extracted character and its bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextChar {
    pub c: char,
    pub bbox: Rect,
}

/// Run of characters sharing a style
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextSpan {
    pub chars: Vec<TextChar>,
}

/// One line of text; lines are separated by a pseudo-newline when flattened
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// Structured text of a page as produced by the engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextPage {
    pub blocks: Vec<TextBlock>,
}

impl TextPage {
    /// Iterate every line in reading order
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|block| block.lines.iter())
    }
}
