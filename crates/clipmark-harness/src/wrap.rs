#![forbid(unsafe_code)]

//! Deterministic line counting for a fixed-width surface.
//!
//! Greedy word wrap with character fallback for overlong words, measured in
//! cells with Unicode-correct widths. Whitespace at a wrap point is
//! swallowed; non-breaking space is treated as part of the word it joins
//! and never breaks.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const NBSP: char = '\u{a0}';

fn is_breaking_space(c: char) -> bool {
    c.is_whitespace() && c != NBSP
}

/// Number of lines `text` occupies when wrapped at `width` cells.
///
/// Empty text occupies zero lines. A zero width degenerates to one line per
/// word character.
#[must_use]
pub fn line_count(text: &str, width: usize) -> usize {
    let mut counter = LineCounter::new(width.max(1));
    for token in tokens(text) {
        match token {
            Token::Word(word) => counter.place_word(word),
            Token::Space(space) => counter.place_space(space),
        }
    }
    counter.lines
}

enum Token<'a> {
    Word(&'a str),
    Space(&'a str),
}

/// Alternating runs of breaking whitespace and word content.
fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_is_space = rest.chars().next().is_some_and(is_breaking_space);
        let end = rest
            .char_indices()
            .find(|(_, c)| is_breaking_space(*c) != first_is_space)
            .map_or(rest.len(), |(i, _)| i);
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(if first_is_space {
            Token::Space(run)
        } else {
            Token::Word(run)
        })
    })
}

struct LineCounter {
    width: usize,
    lines: usize,
    col: usize,
    line_open: bool,
}

impl LineCounter {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: 0,
            col: 0,
            line_open: false,
        }
    }

    fn open(&mut self) {
        if !self.line_open {
            self.line_open = true;
            self.lines += 1;
        }
    }

    fn close(&mut self) {
        self.line_open = false;
        self.col = 0;
    }

    fn place_word(&mut self, word: &str) {
        let word_width = word.width();
        if word_width > self.width {
            // Character fallback for words wider than the surface.
            for grapheme in word.graphemes(true) {
                let w = grapheme.width();
                if self.line_open && self.col + w > self.width {
                    self.close();
                }
                self.open();
                self.col += w;
            }
            return;
        }
        if self.line_open && self.col + word_width > self.width {
            self.close();
        }
        self.open();
        self.col += word_width;
    }

    fn place_space(&mut self, space: &str) {
        // Whitespace never opens a line, and vanishes at a wrap point.
        if !self.line_open {
            return;
        }
        if self.col + space.width() > self.width {
            self.close();
        } else {
            self.col += space.width();
        }
    }
}
