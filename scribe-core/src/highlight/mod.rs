// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Syntax highlighting.
//!
//! A highlighter turns each buffer row into one [`ColorCode`] per character.
//! Highlighters that need cross-line context keep per-row facts in a
//! [`RowTable`](crate::rows::RowTable) which the document feeds with the
//! buffer's line events, then run a whole-document pass from
//! [`Highlighter::refresh`] when those facts change.
//!
//! Overlays (search matches, irregular whitespace) are independent of the
//! syntax and are combined with the color codes by the document into
//! [`StyledCell`]s.

use std::path::Path;

use bitflags::bitflags;

use crate::buffer::Line;
use crate::error::PatternError;
use crate::range::Position;
use crate::rows::LineEvent;

pub mod clike;
pub mod literal;
pub mod markdown;
pub mod plain;

pub use clike::CLikeHighlighter;
pub use markdown::MarkdownHighlighter;
pub use plain::PlainHighlighter;

/// Visual class of a character. The shell maps each class to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorCode {
    #[default]
    Foreground,
    Important,
    PrimaryBlock,
    SecondaryBlock,
    PrimaryInline,
    SecondaryInline,
}

bitflags! {
    /// Decorations drawn on top of a character's color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Overlay: u8 {
        /// Part of a match of the active search query
        const MATCH = 1 << 0;
        /// Trailing whitespace, space runs, whitespace-only lines
        const IRREGULAR_WHITESPACE = 1 << 1;
    }
}

/// What the shell draws for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyledCell {
    pub code: ColorCode,
    pub overlay: Overlay,
}

/// Which highlighter a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyntaxKind {
    #[default]
    Plain,
    CLike,
    Markdown,
}

impl SyntaxKind {
    /// Pick a highlighter from a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md" | "markdown") => SyntaxKind::Markdown,
            Some("java" | "c" | "h" | "cc" | "cpp" | "hpp" | "cs") => SyntaxKind::CLike,
            _ => SyntaxKind::Plain,
        }
    }

    /// A highlighter of this kind for a buffer of `rows` lines.
    pub fn highlighter(self, rows: usize) -> Result<Box<dyn Highlighter>, PatternError> {
        Ok(match self {
            SyntaxKind::Plain => Box::new(PlainHighlighter::new(rows)),
            SyntaxKind::CLike => Box::new(CLikeHighlighter::new(rows)?),
            SyntaxKind::Markdown => Box::new(MarkdownHighlighter::new(rows)),
        })
    }
}

/// A syntax highlighter bound to one buffer.
///
/// The document calls [`apply`](Highlighter::apply) for every line event in
/// journal order, then [`refresh`](Highlighter::refresh) once with the
/// buffer's lines, all under the document lock. After that,
/// [`row_count`](Highlighter::row_count) equals the buffer's line count and
/// [`color_codes`](Highlighter::color_codes) is valid for every row.
pub trait Highlighter: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> SyntaxKind;

    /// Rows tracked by the highlighter's side table.
    fn row_count(&self) -> usize;

    fn apply(&mut self, event: LineEvent);

    fn refresh(&mut self, lines: &[Line]);

    /// The caret moved; highlighters with caret-dependent output (bracket
    /// matching) update themselves here.
    fn caret_moved(&mut self, _lines: &[Line], _caret: Position) {}

    /// One code per character of `lines[row]`.
    fn color_codes(&self, lines: &[Line], row: usize) -> Vec<ColorCode>;
}

pub(crate) fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Mark whitespace a reader is unlikely to have meant: a line holding only
/// whitespace, runs of two or more spaces between the first and last visible
/// characters, and trailing whitespace.
pub fn mark_irregular_whitespace(line: &[char], cells: &mut [StyledCell]) {
    let mut mark = |from: usize, to: usize| {
        for cell in &mut cells[from..to] {
            cell.overlay |= Overlay::IRREGULAR_WHITESPACE;
        }
    };

    let Some(head) = line.iter().position(|c| !c.is_whitespace()) else {
        mark(0, line.len());
        return;
    };
    // A visible character exists, so rposition finds one too
    let tail = line
        .iter()
        .rposition(|c| !c.is_whitespace())
        .unwrap_or(head);

    let mut col = head + 1;
    while col < tail {
        if line[col] != ' ' {
            col += 1;
            continue;
        }
        let end = col + line[col..].iter().take_while(|&&c| c == ' ').count();
        if end - col > 1 {
            mark(col, end);
        }
        col = end;
    }

    if tail + 1 < line.len() {
        mark(tail + 1, line.len());
    }
}

/// Apply the match overlay to every column covered by a match starting at
/// one of `starts`.
pub fn mark_matches(starts: &[usize], len: usize, cells: &mut [StyledCell]) {
    for &begin in starts {
        let end = (begin + len).min(cells.len());
        for cell in &mut cells[begin..end] {
            cell.overlay |= Overlay::MATCH;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(text: &str) -> String {
        let line: Vec<char> = text.chars().collect();
        let mut cells = vec![StyledCell::default(); line.len()];
        mark_irregular_whitespace(&line, &mut cells);
        cells
            .iter()
            .map(|cell| {
                if cell.overlay.contains(Overlay::IRREGULAR_WHITESPACE) {
                    '^'
                } else {
                    '.'
                }
            })
            .collect()
    }

    #[test]
    fn test_irregular_whitespace() {
        assert_eq!(marked("   "), "^^^");
        assert_eq!(marked("a b"), "...");
        assert_eq!(marked("a  b"), ".^^.");
        assert_eq!(marked("  a b  "), ".....^^");
        assert_eq!(marked("a\t"), ".^");
        assert_eq!(marked(""), "");
    }

    #[test]
    fn test_match_overlay() {
        let mut cells = vec![StyledCell::default(); 6];
        mark_matches(&[0, 4], 2, &mut cells);
        let flags: Vec<bool> = cells
            .iter()
            .map(|c| c.overlay.contains(Overlay::MATCH))
            .collect();
        assert_eq!(flags, vec![true, true, false, false, true, true]);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(SyntaxKind::from_path("README.md"), SyntaxKind::Markdown);
        assert_eq!(SyntaxKind::from_path("src/Main.JAVA"), SyntaxKind::CLike);
        assert_eq!(SyntaxKind::from_path("notes.txt"), SyntaxKind::Plain);
        assert_eq!(SyntaxKind::from_path("Makefile"), SyntaxKind::Plain);
    }
}
