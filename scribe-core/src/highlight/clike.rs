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

//! Highlighter for Java and other C-like languages.
//!
//! Tokens are classified one line at a time. Block comments are the only
//! cross-line construct: each row caches where `/*` and `*/` occur, and when
//! any of those change a forward sweep pairs them into comment ranges.
//! Bracket matching follows the caret.

use crate::buffer::Line;
use crate::error::PatternError;
use crate::range::{Position, TextRange};
use crate::rows::{LineEvent, RowTable};

use super::literal::LiteralSet;
use super::{is_blank, ColorCode, Highlighter, SyntaxKind};

const COLOR_BRACKET: ColorCode = ColorCode::Important;
const COLOR_KEYWORD: ColorCode = ColorCode::PrimaryBlock;
const COLOR_COMMENT: ColorCode = ColorCode::SecondaryBlock;
const COLOR_OPERATOR: ColorCode = ColorCode::PrimaryInline;
const COLOR_LITERAL: ColorCode = ColorCode::SecondaryInline;

const OPERATORS: &str = "=><!~?:+-*/&|^%";

const BRACKETS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Keywords, indexed by length.
const KEYWORDS: [&[&str]; 13] = [
    &[],
    &[],
    &["do", "if"],
    &["for", "int", "new", "try"],
    &["byte", "case", "char", "else", "goto", "long", "this", "void"],
    &[
        "break", "catch", "class", "const", "final", "float", "short", "super", "throw", "while",
    ],
    &[
        "double", "import", "native", "public", "return", "static", "switch", "throws",
    ],
    &["boolean", "default", "extends", "finally", "package", "private"],
    &["abstract", "continue", "volatile"],
    &["interface", "protected", "transient"],
    &["implements", "instanceof"],
    &[],
    &["synchronized"],
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS
        .get(word.chars().count())
        .is_some_and(|bucket| bucket.contains(&word))
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Columns of block comment delimiters on one line. A begin is the column
/// of `/`, an end the column of the closing `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CommentMarks {
    begins: Vec<usize>,
    ends: Vec<usize>,
}

impl CommentMarks {
    fn scan(line: &[char]) -> Self {
        let mut marks = Self::default();
        for (col, pair) in line.windows(2).enumerate() {
            match pair {
                ['/', '*'] => marks.begins.push(col),
                ['*', '/'] => marks.ends.push(col + 1),
                _ => {}
            }
        }
        marks
    }
}

#[derive(Debug)]
pub struct CLikeHighlighter {
    marks: RowTable<CommentMarks>,
    /// Inclusive comment ranges in document order
    comments: Vec<TextRange>,
    /// Bracket at or before the caret and its partner
    bracket: Option<(Position, Position)>,
    numbers: LiteralSet,
}

impl CLikeHighlighter {
    pub fn new(rows: usize) -> Result<Self, PatternError> {
        Ok(Self {
            marks: RowTable::with_rows(rows),
            comments: Vec::new(),
            bracket: None,
            numbers: LiteralSet::numbers()?,
        })
    }

    /// Block comment ranges, for inspection.
    pub fn comment_ranges(&self) -> &[TextRange] {
        &self.comments
    }

    pub fn bracket_pair(&self) -> Option<(Position, Position)> {
        self.bracket
    }

    /// First delimiter at or after (`row`, `col`).
    fn find_mark(&self, row: usize, col: usize, begin: bool) -> Option<Position> {
        (row..self.marks.len()).find_map(|r| {
            let marks = self.marks.entry(r);
            let cols = if begin { &marks.begins } else { &marks.ends };
            let from = if r == row { col } else { 0 };
            cols.iter()
                .find(|&&c| c >= from)
                .map(|&c| Position::new(r, c))
        })
    }

    fn pair_comments(&mut self) {
        self.comments.clear();
        let mut pos = Position::default();
        while let Some(begin) = self.find_mark(pos.row, pos.col, true) {
            // The closer must not reuse the opener's `*`
            match self.find_mark(begin.row, begin.col + 3, false) {
                Some(end) => {
                    self.comments.push(TextRange::new(begin, end));
                    pos = Position::new(end.row, end.col + 1);
                }
                // An opener without a closer pairs with nothing
                None => break,
            }
        }
        tracing::trace!(ranges = self.comments.len(), "paired block comments");
    }

    fn in_comment(&self, pos: Position) -> bool {
        let after = self.comments.partition_point(|range| range.begin <= pos);
        after > 0 && self.comments[after - 1].contains_inclusive(pos)
    }

    /// A bracket counts unless it sits in a comment or a quoted literal.
    fn is_valid_bracket(&self, lines: &[Line], row: usize, col: usize) -> bool {
        if self.in_comment(Position::new(row, col)) {
            return false;
        }
        let line = &lines[row];
        let mut quoted = false;
        let mut i = 0;
        while i < col {
            let c = line[i];
            if c == '/' && line.get(i + 1) == Some(&'/') {
                return false;
            }
            if c == '"' || c == '\'' {
                quoted = true;
                i += 1;
                while i < col {
                    if line[i] == c {
                        quoted = false;
                        break;
                    }
                    if line[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            i += 1;
        }
        !quoted
    }

    fn nesting_step(&self, lines: &[Line], pos: Position, this: char, other: char) -> isize {
        let c = lines[pos.row][pos.col];
        if c == this && self.is_valid_bracket(lines, pos.row, pos.col) {
            1
        } else if c == other && self.is_valid_bracket(lines, pos.row, pos.col) {
            -1
        } else {
            0
        }
    }

    fn find_partner_forward(
        &self,
        lines: &[Line],
        from: Position,
        this: char,
        other: char,
    ) -> Option<Position> {
        let mut level = 1;
        for (row, line) in lines.iter().enumerate().skip(from.row) {
            let start = if row == from.row { from.col + 1 } else { 0 };
            for col in start..line.len() {
                let pos = Position::new(row, col);
                level += self.nesting_step(lines, pos, this, other);
                if level == 0 {
                    return Some(pos);
                }
            }
        }
        None
    }

    fn find_partner_backward(
        &self,
        lines: &[Line],
        from: Position,
        this: char,
        other: char,
    ) -> Option<Position> {
        let mut level = 1;
        for row in (0..=from.row).rev() {
            let end = if row == from.row { from.col } else { lines[row].len() };
            for col in (0..end).rev() {
                let pos = Position::new(row, col);
                level += self.nesting_step(lines, pos, this, other);
                if level == 0 {
                    return Some(pos);
                }
            }
        }
        None
    }

    fn bracket_at(&self, lines: &[Line], pos: Position) -> Option<(Position, Position)> {
        let c = *lines[pos.row].get(pos.col)?;
        let &(open, close) = BRACKETS.iter().find(|&&(o, cl)| c == o || c == cl)?;
        if !self.is_valid_bracket(lines, pos.row, pos.col) {
            return None;
        }
        let partner = if c == open {
            self.find_partner_forward(lines, pos, open, close)
        } else {
            self.find_partner_backward(lines, pos, close, open)
        }?;
        Some((pos, partner))
    }
}

fn scan_identifier(line: &[char], start: usize) -> usize {
    start
        + 1
        + line[start + 1..]
            .iter()
            .take_while(|&&c| is_identifier_part(c))
            .count()
}

fn scan_number(line: &[char], start: usize) -> usize {
    start
        + 1
        + line[start + 1..]
            .iter()
            .take_while(|&&c| {
                let c = c.to_ascii_lowercase();
                c.is_ascii_digit() || c.is_ascii_lowercase() || matches!(c, '.' | '+' | '-')
            })
            .count()
}

/// End of a quoted literal opened at `start`; unterminated literals run to
/// the end of the line.
fn scan_quoted(line: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < line.len() {
        let c = line[i];
        if c == quote {
            return i + 1;
        }
        if c == '\\' && i + 1 < line.len() {
            i += 1;
        }
        i += 1;
    }
    i
}

impl Highlighter for CLikeHighlighter {
    fn kind(&self) -> SyntaxKind {
        SyntaxKind::CLike
    }

    fn row_count(&self) -> usize {
        self.marks.len()
    }

    fn apply(&mut self, event: LineEvent) {
        self.marks.apply(event);
    }

    fn refresh(&mut self, lines: &[Line]) {
        if self.marks.refresh(|row| CommentMarks::scan(&lines[row])) {
            self.pair_comments();
        }
    }

    fn caret_moved(&mut self, lines: &[Line], caret: Position) {
        self.bracket = None;
        let candidates = [Some(caret.col), caret.col.checked_sub(1)];
        for col in candidates.into_iter().flatten() {
            if let Some(pair) = self.bracket_at(lines, Position::new(caret.row, col)) {
                self.bracket = Some(pair);
                return;
            }
        }
    }

    fn color_codes(&self, lines: &[Line], row: usize) -> Vec<ColorCode> {
        let line = &lines[row];
        let mut codes = vec![ColorCode::Foreground; line.len()];
        let mut col = 0;
        while col < line.len() {
            let c = line[col];
            if is_blank(c) {
                col += 1;
                continue;
            }
            if self.in_comment(Position::new(row, col)) {
                codes[col] = COLOR_COMMENT;
                col += 1;
                continue;
            }

            let next = line.get(col + 1).copied();
            let end = if c == '/' && next == Some('/') {
                codes[col..].fill(COLOR_COMMENT);
                break;
            } else if is_identifier_start(c) {
                let end = scan_identifier(line, col);
                let word: String = line[col..end].iter().collect();
                if is_keyword(&word) {
                    codes[col..end].fill(COLOR_KEYWORD);
                } else if matches!(word.as_str(), "true" | "false" | "null") {
                    codes[col..end].fill(COLOR_LITERAL);
                }
                end
            } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
                let end = scan_number(line, col);
                if self.numbers.accepts(&line[col..end]) {
                    codes[col..end].fill(COLOR_LITERAL);
                }
                end
            } else if c == '"' || c == '\'' {
                let end = scan_quoted(line, col, c);
                codes[col..end].fill(COLOR_LITERAL);
                end
            } else {
                if OPERATORS.contains(c) {
                    codes[col] = COLOR_OPERATOR;
                }
                col + 1
            };
            col = end;
        }

        if let Some((a, b)) = self.bracket {
            for pos in [a, b] {
                if pos.row == row {
                    codes[pos.col] = COLOR_BRACKET;
                }
            }
        }
        codes
    }
}
