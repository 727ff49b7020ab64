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

//! Row/column positions and multi-line ranges.

/// A location in the buffer expressed as (row, column).
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// A multi-line text range. `begin` is where the range was anchored and
/// `end` is where it was extended to, so `end` may precede `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub begin: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(begin: Position, end: Position) -> Self {
        Self { begin, end }
    }

    /// A range covering a single row between two columns.
    pub const fn on_row(row: usize, begin_col: usize, end_col: usize) -> Self {
        Self {
            begin: Position::new(row, begin_col),
            end: Position::new(row, end_col),
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.begin
    }

    /// The same range with `begin <= end`.
    pub fn forward(&self) -> TextRange {
        if self.is_reversed() {
            TextRange::new(self.end, self.begin)
        } else {
            *self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Inclusive containment test, used for block comment ranges whose end
    /// position points at the closing delimiter's last character.
    pub fn contains_inclusive(&self, pos: Position) -> bool {
        let range = self.forward();
        range.begin <= pos && pos <= range.end
    }
}
