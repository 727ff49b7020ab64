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

//! The line store behind a document.
//!
//! Text is kept as a vector of lines of `char`s so that (row, column)
//! addressing is direct and every mutation maps onto whole-line events. The
//! buffer never holds zero lines. Each structural change is journaled as a
//! [`LineEvent`]; the owning document drains the journal after every
//! operation and replays it into its row tables.

use crate::range::{Position, TextRange};
use crate::rows::LineEvent;
use crate::search::{MatchQuery, Matcher, SearchDirection};

/// One line of text, without its terminator.
pub type Line = Vec<char>;

/// Normalize `\r\n` and lone `\r` to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<Line>,
    caret: Position,
    /// Selection anchor and active end; equal when nothing is selected
    selection: TextRange,
    /// Total characters, counting one per line break
    char_count: usize,
    /// Query of the last count, used for find-next and match highlighting
    query: Option<MatchQuery>,
    events: Vec<LineEvent>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            caret: Position::default(),
            selection: TextRange::default(),
            char_count: 0,
            query: None,
            events: Vec::new(),
        }
    }

    /// Build a buffer holding `text`. The journal starts empty: the caller
    /// sizes its row tables from [`line_count`](Self::line_count).
    pub fn from_text(text: &str) -> Self {
        let text = normalize_newlines(text);
        let lines: Vec<Line> = text.split('\n').map(|l| l.chars().collect()).collect();
        let char_count = lines.iter().map(Vec::len).sum::<usize>() + lines.len() - 1;
        Self {
            lines,
            char_count,
            ..Self::new()
        }
    }

    /// Drain the line-event journal.
    pub fn take_events(&mut self) -> Vec<LineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn line(&self, row: usize) -> &[char] {
        &self.lines[row]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_len(&self, row: usize) -> usize {
        self.lines[row].len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.char_count);
        for (row, line) in self.lines.iter().enumerate() {
            if row > 0 {
                out.push('\n');
            }
            out.extend(line.iter());
        }
        out
    }

    pub fn is_valid(&self, pos: Position) -> bool {
        pos.row < self.lines.len() && pos.col <= self.lines[pos.row].len()
    }

    pub fn caret(&self) -> Position {
        self.caret
    }

    /// Move the caret. An out-of-range position is a broken invariant.
    pub fn set_caret(&mut self, pos: Position) {
        assert!(
            self.is_valid(pos),
            "caret {pos:?} outside buffer of {} lines",
            self.lines.len()
        );
        self.caret = pos;
    }

    /// Last position in the document.
    pub fn end_position(&self) -> Position {
        let row = self.lines.len() - 1;
        Position::new(row, self.lines[row].len())
    }

    // Line primitives. Every structural change goes through these so the
    // journal stays complete.

    fn set_line(&mut self, row: usize, line: Line) {
        self.lines[row] = line;
        self.events.push(LineEvent::Set(row));
    }

    fn insert_line(&mut self, row: usize, line: Line) {
        self.lines.insert(row, line);
        self.events.push(LineEvent::Insert(row));
    }

    fn remove_line(&mut self, row: usize) {
        self.lines.remove(row);
        self.events.push(LineEvent::Remove(row));
    }

    /// Insert one character at the caret. `'\n'` splits the line.
    pub fn insert(&mut self, c: char) {
        let Position { row, col } = self.caret;
        if c == '\n' {
            let tail = self.lines[row].split_off(col);
            let head = std::mem::take(&mut self.lines[row]);
            self.set_line(row, head);
            self.insert_line(row + 1, tail);
            self.caret = Position::new(row + 1, 0);
        } else {
            let mut line = std::mem::take(&mut self.lines[row]);
            line.insert(col, c);
            self.set_line(row, line);
            self.caret = Position::new(row, col + 1);
        }
        self.char_count += 1;
    }

    /// Delete the character before the caret, joining lines at column 0.
    /// Returns the removed character, or `None` at the document start.
    pub fn backspace(&mut self) -> Option<char> {
        let Position { row, col } = self.caret;
        if col > 0 {
            let mut line = std::mem::take(&mut self.lines[row]);
            let removed = line.remove(col - 1);
            self.set_line(row, line);
            self.caret = Position::new(row, col - 1);
            self.char_count -= 1;
            Some(removed)
        } else if row > 0 {
            let tail = std::mem::take(&mut self.lines[row]);
            let mut prev = std::mem::take(&mut self.lines[row - 1]);
            let prev_len = prev.len();
            prev.extend(tail);
            self.remove_line(row);
            self.set_line(row - 1, prev);
            self.caret = Position::new(row - 1, prev_len);
            self.char_count -= 1;
            Some('\n')
        } else {
            None
        }
    }

    /// Insert `text` at the caret, leaving the caret after it.
    pub fn insert_string(&mut self, text: &str) {
        let Position { row, col } = self.caret;
        let mut current = std::mem::take(&mut self.lines[row]);
        let post = current.split_off(col);
        let mut row = row;
        for c in text.chars() {
            if c == '\n' {
                self.insert_line(row, std::mem::take(&mut current));
                row += 1;
            } else {
                current.push(c);
            }
            self.char_count += 1;
        }
        let col = current.len();
        current.extend(post);
        self.set_line(row, current);
        self.caret = Position::new(row, col);
    }

    /// Remove the text in `range` and leave the caret at its start.
    pub fn delete_range(&mut self, range: TextRange) {
        let TextRange { begin, end } = range.forward();
        assert!(
            self.is_valid(begin) && self.is_valid(end),
            "delete range {range:?} outside buffer"
        );
        let removed = self.range_len(begin, end);
        let tail = self.lines[end.row][end.col..].to_vec();
        let mut head = std::mem::take(&mut self.lines[begin.row]);
        head.truncate(begin.col);
        head.extend(tail);
        self.set_line(begin.row, head);
        for _ in begin.row..end.row {
            self.remove_line(begin.row + 1);
        }
        self.char_count -= removed;
        self.caret = begin;
    }

    fn range_len(&self, begin: Position, end: Position) -> usize {
        if begin.row == end.row {
            return end.col - begin.col;
        }
        let mut len = self.lines[begin.row].len() - begin.col + 1;
        for row in begin.row + 1..end.row {
            len += self.lines[row].len() + 1;
        }
        len + end.col
    }

    /// The text covered by `range`, with `\n` between rows.
    pub fn string_by_range(&self, range: TextRange) -> String {
        let TextRange { begin, end } = range.forward();
        if begin.row == end.row {
            return self.lines[begin.row][begin.col..end.col].iter().collect();
        }
        let mut out: String = self.lines[begin.row][begin.col..].iter().collect();
        for row in begin.row + 1..end.row {
            out.push('\n');
            out.extend(self.lines[row].iter());
        }
        out.push('\n');
        out.extend(self.lines[end.row][..end.col].iter());
        out
    }

    // Selection

    /// Anchor a selection at `pos`.
    pub fn set_selection_begin(&mut self, pos: Position) {
        self.selection = TextRange::new(pos, pos);
    }

    /// Extend the selection to `pos`, keeping its anchor.
    pub fn set_selection_end(&mut self, pos: Position) {
        self.selection.end = pos;
    }

    pub fn set_selection(&mut self, range: TextRange) {
        self.selection = range;
    }

    /// Collapse the selection onto the caret.
    pub fn clear_selection(&mut self) {
        self.selection = TextRange::new(self.caret, self.caret);
    }

    pub fn is_selected(&self) -> bool {
        !self.selection.is_empty()
    }

    /// The selection as stored: anchor first, active end second.
    pub fn raw_selection(&self) -> TextRange {
        self.selection
    }

    /// The selected range with `begin <= end`, if anything is selected.
    pub fn selection(&self) -> Option<TextRange> {
        self.is_selected().then(|| self.selection.forward())
    }

    // Search

    /// Count non-overlapping matches of `query` and make it the active query.
    pub fn count_match(&mut self, query: &MatchQuery) -> usize {
        let matcher = Matcher::new(query);
        self.query = Some(query.clone());
        if matcher.is_empty() {
            return 0;
        }
        self.lines
            .iter()
            .map(|line| matcher.find_all(line).len())
            .sum()
    }

    pub fn active_query(&self) -> Option<&MatchQuery> {
        self.query.as_ref()
    }

    /// Forget the active query; match highlighting stops.
    pub fn disable_match(&mut self) {
        self.query = None;
    }

    /// Start columns of active-query matches on `row`.
    pub fn matches_in_row(&self, row: usize) -> Vec<usize> {
        self.query
            .as_ref()
            .map(|query| Matcher::new(query).find_all(&self.lines[row]))
            .unwrap_or_default()
    }

    /// Move the caret to the next match of the active query in its
    /// direction, wrapping around the document once. A forward search
    /// leaves the caret after the match, a backward search before it.
    /// Returns false when there is no match at all.
    pub fn move_caret_to_next_match(&mut self) -> bool {
        let Some(query) = self.query.as_ref() else {
            return false;
        };
        let matcher = Matcher::new(query);
        if matcher.is_empty() {
            return false;
        }
        let caret = self.caret;
        let last = self.lines.len() - 1;
        let found = match query.direction {
            SearchDirection::Forward => (caret.row..=last)
                .find_map(|row| self.next_match_forward(&matcher, row, caret, false))
                .or_else(|| {
                    (0..=caret.row)
                        .find_map(|row| self.next_match_forward(&matcher, row, caret, true))
                }),
            SearchDirection::Backward => (0..=caret.row)
                .rev()
                .find_map(|row| self.next_match_backward(&matcher, row, caret, false))
                .or_else(|| {
                    (caret.row..=last)
                        .rev()
                        .find_map(|row| self.next_match_backward(&matcher, row, caret, true))
                }),
        };
        match found {
            Some(pos) => {
                self.caret = pos;
                true
            }
            None => false,
        }
    }

    fn next_match_forward(
        &self,
        matcher: &Matcher,
        row: usize,
        caret: Position,
        wrapped: bool,
    ) -> Option<Position> {
        let line = &self.lines[row];
        matcher
            .find_all(line)
            .into_iter()
            .map(|begin| begin + matcher.len())
            .find(|&end| wrapped || row > caret.row || end > caret.col)
            .map(|end| Position::new(row, end))
    }

    fn next_match_backward(
        &self,
        matcher: &Matcher,
        row: usize,
        caret: Position,
        wrapped: bool,
    ) -> Option<Position> {
        let line = &self.lines[row];
        let mut from = line.len();
        loop {
            let begin = matcher.last_index_of(line, from)?;
            if wrapped || row < caret.row || begin < caret.col {
                return Some(Position::new(row, begin));
            }
            from = begin.checked_sub(matcher.len())?;
        }
    }

    /// Whether the caret sits where [`move_caret_to_next_match`] leaves it:
    /// right after a match when searching forward, right before one when
    /// searching backward.
    ///
    /// [`move_caret_to_next_match`]: Self::move_caret_to_next_match
    pub fn is_caret_at_match_end(&self) -> bool {
        let Some(query) = self.query.as_ref() else {
            return false;
        };
        let matcher = Matcher::new(query);
        let Position { row, col } = self.caret;
        let begin = match query.direction {
            SearchDirection::Forward => match col.checked_sub(matcher.len()) {
                Some(begin) => begin,
                None => return false,
            },
            SearchDirection::Backward => col,
        };
        matcher.is_match_at(&self.lines[row], begin)
    }

    /// The range of the match the caret sits at, per
    /// [`is_caret_at_match_end`](Self::is_caret_at_match_end).
    pub fn match_range_at_caret(&self) -> Option<TextRange> {
        if !self.is_caret_at_match_end() {
            return None;
        }
        let query = self.query.as_ref()?;
        let len = query.target_len();
        let Position { row, col } = self.caret;
        Some(match query.direction {
            SearchDirection::Forward => TextRange::on_row(row, col - len, col),
            SearchDirection::Backward => TextRange::on_row(row, col, col + len),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_buffer() -> TextBuffer {
        TextBuffer::from_text("Hello\ncruel\nworld!")
    }

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_from_text() {
        let buffer = test_buffer();
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.char_count(), 18);
        assert_eq!(buffer.text(), "Hello\ncruel\nworld!");

        let buffer = TextBuffer::from_text("a\r\nb\rc");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.text(), "a\nb\nc");

        let empty = TextBuffer::from_text("");
        assert_eq!(empty.line_count(), 1);
        assert_eq!(empty.char_count(), 0);
    }

    #[test]
    fn test_insert_newline_splits() {
        let mut buffer = test_buffer();
        buffer.set_caret(pos(0, 2));
        buffer.insert('\n');
        assert_eq!(buffer.text(), "He\nllo\ncruel\nworld!");
        assert_eq!(buffer.caret(), pos(1, 0));
        assert_eq!(
            buffer.take_events(),
            vec![LineEvent::Set(0), LineEvent::Insert(1)]
        );
        assert_eq!(buffer.char_count(), 19);
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = test_buffer();
        buffer.set_caret(pos(1, 0));
        assert_eq!(buffer.backspace(), Some('\n'));
        assert_eq!(buffer.text(), "Hellocruel\nworld!");
        assert_eq!(buffer.caret(), pos(0, 5));
        assert_eq!(
            buffer.take_events(),
            vec![LineEvent::Remove(1), LineEvent::Set(0)]
        );
    }

    #[test]
    fn test_backspace_at_origin_is_noop() {
        let mut buffer = test_buffer();
        assert_eq!(buffer.backspace(), None);
        assert_eq!(buffer.char_count(), 18);
        assert!(buffer.take_events().is_empty());
    }

    #[test]
    fn test_insert_string_matches_repeated_insert() {
        let text = "ab\ncd\n\nef";
        let mut by_string = test_buffer();
        by_string.set_caret(pos(1, 2));
        by_string.insert_string(text);

        let mut by_char = test_buffer();
        by_char.set_caret(pos(1, 2));
        for c in text.chars() {
            by_char.insert(c);
        }

        assert_eq!(by_string.text(), by_char.text());
        assert_eq!(by_string.caret(), by_char.caret());
        assert_eq!(by_string.char_count(), by_char.char_count());
        assert_eq!(by_string.caret(), pos(4, 2));
    }

    #[test]
    fn test_delete_range_across_rows() {
        let mut buffer = test_buffer();
        let range = TextRange::new(pos(2, 2), pos(0, 3));
        assert_eq!(buffer.string_by_range(range), "lo\ncruel\nwo");
        buffer.delete_range(range);
        assert_eq!(buffer.text(), "Helrld!");
        assert_eq!(buffer.caret(), pos(0, 3));
        assert_eq!(buffer.char_count(), 7);
        assert_eq!(buffer.line_count(), 1);
    }

    #[test]
    #[should_panic]
    fn test_invalid_caret_is_fatal() {
        let mut buffer = test_buffer();
        buffer.set_caret(pos(0, 6));
    }

    #[test]
    fn test_selection() {
        let mut buffer = test_buffer();
        assert_eq!(buffer.selection(), None);
        buffer.set_selection_begin(pos(1, 3));
        buffer.set_selection_end(pos(0, 1));
        assert!(buffer.is_selected());
        assert_eq!(
            buffer.selection(),
            Some(TextRange::new(pos(0, 1), pos(1, 3)))
        );
        buffer.clear_selection();
        assert!(!buffer.is_selected());
    }

    #[test]
    fn test_count_match() {
        let mut buffer = TextBuffer::from_text("Cat cat CAT");
        assert_eq!(buffer.count_match(&MatchQuery::new("cat")), 3);
        assert_eq!(
            buffer.count_match(&MatchQuery::new("cat").with_case_sensitive(true)),
            1
        );
        assert_eq!(buffer.matches_in_row(0), vec![4]);
    }

    #[test]
    fn test_next_match_wraps_around() {
        let mut buffer = TextBuffer::from_text("foo bar\nbaz\nqux");
        buffer.count_match(&MatchQuery::new("foo"));
        buffer.set_caret(pos(2, 3));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 3));
        assert!(buffer.is_caret_at_match_end());
        assert_eq!(
            buffer.match_range_at_caret(),
            Some(TextRange::on_row(0, 0, 3))
        );
    }

    #[test]
    fn test_next_match_advances() {
        let mut buffer = TextBuffer::from_text("ab ab\nab");
        buffer.count_match(&MatchQuery::new("ab"));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 2));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 5));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(1, 2));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 2));
    }

    #[test]
    fn test_backward_search() {
        let mut buffer = TextBuffer::from_text("ab ab\nab");
        buffer.count_match(&MatchQuery::new("ab").backward());
        buffer.set_caret(pos(1, 2));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(1, 0));
        assert!(buffer.is_caret_at_match_end());
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 3));
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(0, 0));
        // Wraps to the last match in the document
        assert!(buffer.move_caret_to_next_match());
        assert_eq!(buffer.caret(), pos(1, 0));
    }

    #[test]
    fn test_no_match() {
        let mut buffer = test_buffer();
        assert_eq!(buffer.count_match(&MatchQuery::new("zzz")), 0);
        assert!(!buffer.move_caret_to_next_match());
        buffer.disable_match();
        assert!(buffer.active_query().is_none());
        assert!(buffer.matches_in_row(0).is_empty());
    }
}
