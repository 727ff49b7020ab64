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

//! Highlighter for text without syntax.

use crate::buffer::Line;
use crate::rows::{LineEvent, RowTable};

use super::{ColorCode, Highlighter, SyntaxKind};

/// Colors everything [`ColorCode::Foreground`]. It still tracks rows so the
/// document can check every highlighter the same way.
#[derive(Debug)]
pub struct PlainHighlighter {
    rows: RowTable<()>,
}

impl PlainHighlighter {
    pub fn new(rows: usize) -> Self {
        Self {
            rows: RowTable::with_rows(rows),
        }
    }
}

impl Highlighter for PlainHighlighter {
    fn kind(&self) -> SyntaxKind {
        SyntaxKind::Plain
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn apply(&mut self, event: LineEvent) {
        self.rows.apply(event);
    }

    fn refresh(&mut self, _lines: &[Line]) {
        self.rows.refresh(|_| ());
    }

    fn color_codes(&self, lines: &[Line], row: usize) -> Vec<ColorCode> {
        vec![ColorCode::Foreground; lines[row].len()]
    }
}
