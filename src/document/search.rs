//! Case-insensitive, whitespace-collapsing text search over one page

use super::geometry::{IRect, Rect};
use super::types::{SearchHit, TextChar, TextPage};

/// Default cap on hits returned for a single page
pub const MAX_SEARCH_HITS: usize = 500;

/// Page text flattened into one character sequence.
///
/// Spans within a line are concatenated directly; every line is followed by
/// one space with an empty box standing in for the line break.
pub struct FlatText {
    chars: Vec<TextChar>,
}

const LINE_BREAK: TextChar = TextChar {
    c: ' ',
    bbox: Rect::EMPTY,
};

impl FlatText {
    #[must_use]
    pub fn new(page: &TextPage) -> Self {
        let mut chars = Vec::new();
        for line in page.lines() {
            for span in &line.spans {
                chars.extend_from_slice(&span.chars);
            }
            chars.push(LINE_BREAK);
        }
        Self { chars }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).map(|ch| ch.c)
    }

    /// Length of the match of `needle` starting at `start`, 0 if none.
    ///
    /// A space in the needle swallows a run of one or more spaces in the
    /// text; everything else compares case-insensitively.
    #[must_use]
    pub fn match_len(&self, needle: &str, start: usize) -> usize {
        let mut pos = start;
        for c in needle.chars() {
            if c == ' ' && self.char_at(pos) == Some(' ') {
                while self.char_at(pos) == Some(' ') {
                    pos += 1;
                }
                continue;
            }
            match self.char_at(pos) {
                Some(doc) if chars_equal_ignore_case(c, doc) => pos += 1,
                _ => return 0,
            }
        }
        pos - start
    }

    /// Union of the rounded boxes of `len` characters starting at `start`
    #[must_use]
    pub fn bbox_of(&self, start: usize, len: usize) -> IRect {
        self.chars[start..start + len]
            .iter()
            .fold(IRect::EMPTY, |acc, ch| acc.union(&ch.bbox.round_out()))
    }
}

fn chars_equal_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Find up to `max_hits` occurrences of `needle`, one hit per starting
/// offset, in text order.
#[must_use]
pub fn search_page(page: &TextPage, needle: &str, max_hits: usize) -> Vec<SearchHit> {
    let text = FlatText::new(page);
    let mut hits = Vec::new();
    if needle.is_empty() || max_hits == 0 {
        return hits;
    }

    for pos in 0..text.len() {
        let n = text.match_len(needle, pos);
        if n == 0 {
            continue;
        }
        let bbox = text.bbox_of(pos, n);
        if bbox.is_empty() {
            continue;
        }
        hits.push(Rect::from(bbox));
        if hits.len() >= max_hits {
            break;
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{TextBlock, TextLine, TextSpan};

    /// One line per entry; each character is a 10x10 box laid left to right.
    fn page_of(lines: &[&str]) -> TextPage {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(row, text)| {
                let y0 = row as f32 * 20.0;
                let chars = text
                    .chars()
                    .enumerate()
                    .map(|(col, c)| TextChar {
                        c,
                        bbox: Rect::new(col as f32 * 10.0, y0, col as f32 * 10.0 + 10.0, y0 + 10.0),
                    })
                    .collect();
                TextLine {
                    spans: vec![TextSpan { chars }],
                }
            })
            .collect();
        TextPage {
            blocks: vec![TextBlock { lines }],
        }
    }

    #[test]
    fn empty_needle_has_no_hits() {
        let page = page_of(&["hello world"]);
        assert!(search_page(&page, "", 10).is_empty());
    }

    #[test]
    fn case_insensitive_hit_has_union_box() {
        let page = page_of(&["Say Hello"]);
        let hits = search_page(&page, "hello", 10);
        assert_eq!(hits, vec![Rect::new(40.0, 0.0, 90.0, 10.0)]);
    }

    #[test]
    fn needle_space_collapses_runs() {
        let page = page_of(&["foo   bar"]);
        let hits = search_page(&page, "foo bar", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], Rect::new(0.0, 0.0, 90.0, 10.0));
    }

    #[test]
    fn match_spans_line_break() {
        let page = page_of(&["end of", "line"]);
        let hits = search_page(&page, "of line", 10);
        assert_eq!(hits.len(), 1);
        // union covers "of" on row 0 and "line" on row 1, separator adds nothing
        assert_eq!(hits[0], Rect::new(0.0, 0.0, 60.0, 30.0));
    }

    #[test]
    fn hits_are_capped() {
        let page = page_of(&["aaaaaaaaaa"]);
        assert_eq!(search_page(&page, "a", 3).len(), 3);
        assert_eq!(search_page(&page, "a", 100).len(), 10);
    }

    #[test]
    fn overlapping_matches_each_count() {
        let page = page_of(&["aaa"]);
        assert_eq!(search_page(&page, "aa", 10).len(), 2);
    }

    #[test]
    fn trailing_needle_space_at_end_of_text_terminates() {
        let page = page_of(&["abc"]);
        let hits = search_page(&page, "abc ", 10);
        assert_eq!(hits, vec![Rect::new(0.0, 0.0, 30.0, 10.0)]);
    }

    #[test]
    fn spans_in_a_line_join_without_separator() {
        let mut page = page_of(&["ab"]);
        let second = TextSpan {
            chars: vec![TextChar {
                c: 'c',
                bbox: Rect::new(20.0, 0.0, 30.0, 10.0),
            }],
        };
        page.blocks[0].lines[0].spans.push(second);
        assert_eq!(search_page(&page, "abc", 10).len(), 1);
    }

    #[test]
    fn multibyte_needle_decodes_per_char() {
        let page = page_of(&["ÉTÉ chaud"]);
        let hits = search_page(&page, "été", 10);
        assert_eq!(hits, vec![Rect::new(0.0, 0.0, 30.0, 10.0)]);
    }
}
