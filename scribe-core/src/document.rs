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

//! One open document: buffer, highlighter, layout and history bound
//! together behind a single lock.
//!
//! Every operation runs start to finish under the write lock. Edits go
//! through [`Command`]s so they can be undone; afterwards the buffer's line
//! events are replayed into the highlighter and layout row tables before the
//! lock is released, so readers never see the caches out of step with the
//! text.

use std::sync::{Arc, RwLock};

use crate::buffer::{normalize_newlines, TextBuffer};
use crate::config::EngineConfig;
use crate::error::{EditError, PatternError};
use crate::highlight::{
    mark_irregular_whitespace, mark_matches, Highlighter, Overlay, StyledCell, SyntaxKind,
};
use crate::history::{Command, History};
use crate::layout::Layout;
use crate::range::{Position, TextRange};
use crate::search::MatchQuery;

/// The state of a document. Reached through [`Document::with_read`] and
/// [`Document::with_write`].
#[derive(Debug)]
pub struct DocumentInner {
    pub(crate) buffer: TextBuffer,
    pub(crate) highlighter: Box<dyn Highlighter>,
    pub(crate) layout: Layout,
    pub(crate) history: History,
    pub(crate) config: EngineConfig,
    /// x that vertical motion tries to keep
    magic_x: Option<u32>,
    /// Draw the caret at the end of a wrapped visual line rather than at the
    /// start of the next one
    caret_at_wrap: bool,
}

/// Columns to strip from the start of `line` when outdenting: up to
/// `tab_size` spaces, or spaces ended by one tab.
fn outdent_width(line: &[char], tab_size: usize) -> usize {
    let mut width = 0;
    while width < tab_size && width < line.len() {
        match line[width] {
            ' ' => width += 1,
            '\t' => return width + 1,
            _ => break,
        }
    }
    width
}

impl DocumentInner {
    pub fn new(text: &str, kind: SyntaxKind, config: EngineConfig) -> Result<Self, PatternError> {
        let buffer = TextBuffer::from_text(text);
        let rows = buffer.line_count();
        let mut inner = Self {
            highlighter: kind.highlighter(rows)?,
            layout: Layout::new(&config, rows),
            history: History::with_max_history(config.history_limit),
            buffer,
            config,
            magic_x: None,
            caret_at_wrap: false,
        };
        inner.sync();
        Ok(inner)
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn kind(&self) -> SyntaxKind {
        self.highlighter.kind()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replay the buffer's journal into the row tables and bring the
    /// highlighter up to date.
    fn sync(&mut self) {
        for event in self.buffer.take_events() {
            self.highlighter.apply(event);
            self.layout.apply(event);
        }
        let rows = self.buffer.line_count();
        assert_eq!(
            self.highlighter.row_count(),
            rows,
            "highlighter rows out of step with the buffer"
        );
        assert_eq!(
            self.layout.row_count(),
            rows,
            "layout rows out of step with the buffer"
        );
        let lines = self.buffer.lines();
        self.highlighter.refresh(lines);
        self.highlighter.caret_moved(lines, self.buffer.caret());
    }

    fn run(&mut self, cmd: Command) {
        let (caret, selection) = (self.buffer.caret(), self.buffer.raw_selection());
        let inverse = cmd.exec(&mut self.buffer);
        self.history.record(inverse, caret, selection);
    }

    fn edited(&mut self) {
        self.magic_x = None;
        self.caret_at_wrap = false;
        self.sync();
    }

    /// Delete the selection, if any, as one command.
    fn delete_selection(&mut self) -> bool {
        match self.buffer.selection() {
            Some(sel) => {
                self.run(Command::delete_string(sel));
                true
            }
            None => false,
        }
    }

    /// Build a new buffer and caches with a highlighter of `kind`, carrying
    /// over text, caret, selection, active query and history.
    pub fn change_kind(&mut self, kind: SyntaxKind) -> Result<(), PatternError> {
        let mut buffer = TextBuffer::from_text(&self.buffer.text());
        buffer.set_caret(self.buffer.caret());
        buffer.set_selection(self.buffer.raw_selection());
        if let Some(query) = self.buffer.active_query() {
            buffer.count_match(query);
        }
        let rows = buffer.line_count();
        self.highlighter = kind.highlighter(rows)?;
        self.layout.reset(rows);
        self.buffer = buffer;
        self.caret_at_wrap = false;
        self.sync();
        tracing::debug!(?kind, rows, "changed highlighter");
        Ok(())
    }

    // Editing

    /// Type one character. Replaces the selection; Tab over several rows
    /// indents them instead when wrap is off.
    pub fn type_char(&mut self, c: char) {
        let c = if c == '\r' { '\n' } else { c };
        if c == '\t' && !self.layout.is_wrap() {
            if let Some(sel) = self.buffer.selection() {
                if sel.begin.row != sel.end.row {
                    self.indent_selection();
                    return;
                }
            }
        }
        if self.buffer.is_selected() {
            self.history.begin_group();
            self.delete_selection();
            let caret = self.buffer.caret();
            self.run(Command::insert(c, caret));
            self.history.end_group();
        } else {
            let caret = self.buffer.caret();
            self.run(Command::insert(c, caret));
        }
        self.buffer.clear_selection();
        self.edited();
    }

    pub fn enter(&mut self) {
        self.type_char('\n');
    }

    pub fn backspace_key(&mut self) {
        if !self.delete_selection() {
            let caret = self.buffer.caret();
            self.run(Command::backspace(caret));
        }
        self.buffer.clear_selection();
        self.edited();
    }

    pub fn delete_key(&mut self) {
        if !self.delete_selection() {
            let caret = self.buffer.caret();
            self.run(Command::delete(caret));
        }
        self.buffer.clear_selection();
        self.edited();
    }

    /// Insert `text` at the caret, replacing the selection.
    pub fn paste(&mut self, text: &str) -> Result<(), EditError> {
        let text = normalize_newlines(text);
        let len = text.chars().count();
        let limit = self.config.max_paste_chars;
        if len > limit {
            tracing::warn!(len, limit, "refused oversized paste");
            return Err(EditError::PasteTooLarge { len, limit });
        }
        if self.buffer.is_selected() {
            self.history.begin_group();
            self.delete_selection();
            let caret = self.buffer.caret();
            self.run(Command::insert_string(text, caret));
            self.history.end_group();
        } else {
            let caret = self.buffer.caret();
            self.run(Command::insert_string(text, caret));
        }
        self.buffer.clear_selection();
        self.edited();
        Ok(())
    }

    /// Remove the selection and return its text.
    pub fn cut(&mut self) -> Option<String> {
        let sel = self.buffer.selection()?;
        let text = self.buffer.string_by_range(sel);
        self.run(Command::delete_string(sel));
        self.buffer.clear_selection();
        self.edited();
        Some(text)
    }

    pub fn selected_text(&self) -> Option<String> {
        self.buffer
            .selection()
            .map(|sel| self.buffer.string_by_range(sel))
    }

    pub fn select_all(&mut self) {
        let end = self.buffer.end_position();
        self.buffer
            .set_selection(TextRange::new(Position::default(), end));
        self.place_caret(end, false);
        self.magic_x = None;
        self.sync();
    }

    // Search

    pub fn count_matches(&mut self, query: &MatchQuery) -> usize {
        self.buffer.count_match(query)
    }

    /// Select the next match of `query`. Returns false when there is none.
    pub fn find_next(&mut self, query: &MatchQuery) -> bool {
        if self.buffer.count_match(query) == 0 || !self.buffer.move_caret_to_next_match() {
            return false;
        }
        self.select_match_at_caret();
        self.caret_at_wrap = false;
        self.magic_x = None;
        self.sync();
        true
    }

    /// Select the match the caret sits at, anchored at its far end.
    fn select_match_at_caret(&mut self) {
        match self.buffer.match_range_at_caret() {
            Some(range) => {
                let caret = self.buffer.caret();
                let anchor = if range.begin == caret {
                    range.end
                } else {
                    range.begin
                };
                self.buffer.set_selection(TextRange::new(anchor, caret));
            }
            None => self.buffer.clear_selection(),
        }
    }

    pub fn disable_match(&mut self) {
        self.buffer.disable_match();
    }

    /// Replace the match at the caret, or the next one, and select the match
    /// after it.
    pub fn replace(&mut self, query: &MatchQuery) -> bool {
        self.replace_matches(query, false)
    }

    /// Replace every match as one undo unit.
    pub fn replace_all(&mut self, query: &MatchQuery) -> bool {
        self.replace_matches(query, true)
    }

    fn replace_matches(&mut self, query: &MatchQuery, all: bool) -> bool {
        let count = self.buffer.count_match(query);
        if count == 0 {
            return false;
        }
        let replacement = query.replacement.clone().unwrap_or_default();
        let rounds = if all { count } else { 1 };

        self.history.begin_group();
        for round in 0..rounds {
            let at_match = round == 0 && self.buffer.is_caret_at_match_end();
            if !at_match && !self.buffer.move_caret_to_next_match() {
                break;
            }
            let Some(range) = self.buffer.match_range_at_caret() else {
                break;
            };
            self.run(Command::delete_string(range));
            self.run(Command::insert_string(replacement.clone(), range.begin));
            if !query.is_forward() {
                // Continue backward from in front of the replacement
                self.buffer.set_caret(range.begin);
            }
        }
        self.history.end_group();

        if !all && count > 1 && self.buffer.move_caret_to_next_match() {
            self.select_match_at_caret();
        } else {
            self.buffer.clear_selection();
        }
        tracing::debug!(count, all, "replaced matches");
        self.edited();
        true
    }

    // Selection edits

    pub fn indent_selection(&mut self) -> bool {
        self.shift_selection(false)
    }

    pub fn outdent_selection(&mut self) -> bool {
        self.shift_selection(true)
    }

    /// Indent or outdent every row the selection touches. A selection that
    /// starts at the end of a row or ends at column 0 leaves that row alone.
    fn shift_selection(&mut self, outdent: bool) -> bool {
        let Some(sel) = self.buffer.selection() else {
            return false;
        };
        let multi_row = sel.begin.row < sel.end.row;
        let begin_row = if sel.begin.col == self.buffer.line_len(sel.begin.row) {
            if !multi_row {
                return false;
            }
            sel.begin.row + 1
        } else {
            sel.begin.row
        };
        let end_row = if sel.end.col == 0 {
            if !multi_row {
                return false;
            }
            sel.end.row - 1
        } else {
            sel.end.row
        };
        if begin_row > end_row {
            return false;
        }

        self.history.begin_group();
        for row in begin_row..=end_row {
            if outdent {
                let width = outdent_width(self.buffer.line(row), self.config.tab_size);
                if width > 0 {
                    self.run(Command::delete_string(TextRange::on_row(row, 0, width)));
                }
            } else if self.buffer.line_len(row) > 0 {
                self.run(Command::insert('\t', Position::new(row, 0)));
            }
        }
        self.history.end_group();

        let end = Position::new(end_row, self.buffer.line_len(end_row));
        self.buffer
            .set_selection(TextRange::new(Position::new(begin_row, 0), end));
        self.buffer.set_caret(end);
        self.edited();
        true
    }

    /// Upper- or lower-case the selection, keeping it selected.
    pub fn convert_case(&mut self, upper: bool) -> bool {
        let Some(sel) = self.buffer.selection() else {
            return false;
        };
        let before = self.buffer.string_by_range(sel);
        let after = if upper {
            before.to_uppercase()
        } else {
            before.to_lowercase()
        };
        if before == after {
            return false;
        }

        self.history.begin_group();
        self.run(Command::delete_string(sel));
        self.run(Command::insert_string(after, sel.begin));
        self.history.end_group();

        let end = self.buffer.caret();
        self.buffer.set_selection(TextRange::new(sel.begin, end));
        self.edited();
        true
    }

    /// Join the caret's row with the next one, or every row the selection
    /// spans.
    pub fn join_lines(&mut self) -> bool {
        match self.buffer.selection() {
            None => {
                let row = self.buffer.caret().row;
                if row + 1 == self.buffer.line_count() {
                    return false;
                }
                let at = Position::new(row, self.buffer.line_len(row));
                self.run(Command::delete(at));
            }
            Some(sel) => {
                if sel.begin.row == sel.end.row {
                    return false;
                }
                let row = sel.begin.row;
                self.history.begin_group();
                for _ in sel.begin.row..sel.end.row {
                    let at = Position::new(row, self.buffer.line_len(row));
                    self.run(Command::delete(at));
                }
                self.history.end_group();
                self.buffer.clear_selection();
            }
        }
        self.edited();
        true
    }

    // History

    /// Undo the latest edit, putting the caret and selection back where
    /// they were before it.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop_undo() else {
            return false;
        };
        let inverse = entry.command.exec(&mut self.buffer);
        self.buffer.set_caret(entry.caret);
        self.buffer.set_selection(entry.selection);
        self.history.did_undo(inverse, entry);
        self.edited();
        tracing::trace!(undo = self.history.undo_count(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.pop_redo() else {
            return false;
        };
        let inverse = entry.command.exec(&mut self.buffer);
        self.history.did_redo(inverse, entry);
        self.buffer.clear_selection();
        self.edited();
        tracing::trace!(redo = self.history.redo_count(), "redo");
        true
    }

    // Caret motion

    fn place_caret(&mut self, pos: Position, at_wrap: bool) {
        self.buffer.set_caret(pos);
        self.caret_at_wrap = at_wrap;
    }

    /// Anchor a selection at the caret before an extending motion.
    fn begin_motion(&mut self, extend: bool) {
        if extend && !self.buffer.is_selected() {
            self.buffer.clear_selection();
        }
    }

    fn end_motion(&mut self, extend: bool) {
        if extend {
            let caret = self.buffer.caret();
            self.buffer.set_selection_end(caret);
        } else {
            self.buffer.clear_selection();
        }
        self.sync();
    }

    /// Move the caret to `pos`, which must be a valid position.
    pub fn move_to(&mut self, pos: Position, extend: bool) {
        self.begin_motion(extend);
        self.place_caret(pos, false);
        self.magic_x = None;
        self.end_motion(extend);
    }

    /// Move the caret to the character boundary nearest a point, as for a
    /// mouse click.
    pub fn move_to_point(&mut self, x: u32, y: u32, extend: bool) {
        self.begin_motion(extend);
        let (pos, at_wrap) = self.layout.position_at(self.buffer.lines(), x, y);
        self.place_caret(pos, at_wrap);
        self.magic_x = Some(x);
        self.end_motion(extend);
    }

    pub fn move_left(&mut self, extend: bool) {
        let Position { row, col } = self.buffer.caret();
        let to = if col > 0 {
            Position::new(row, col - 1)
        } else if row > 0 {
            Position::new(row - 1, self.buffer.line_len(row - 1))
        } else {
            Position::new(row, col)
        };
        self.move_to(to, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        let Position { row, col } = self.buffer.caret();
        let to = if col < self.buffer.line_len(row) {
            Position::new(row, col + 1)
        } else if row + 1 < self.buffer.line_count() {
            Position::new(row + 1, 0)
        } else {
            Position::new(row, col)
        };
        self.move_to(to, extend);
    }

    /// Move by `dy` pixels, keeping the remembered x.
    fn move_vertically(&mut self, dy: i64, extend: bool) {
        self.begin_motion(extend);
        let x = match self.magic_x {
            Some(x) => x,
            None => self.caret_x(),
        };
        let y = (i64::from(self.caret_y()) + dy).clamp(0, i64::from(u32::MAX)) as u32;
        let (pos, at_wrap) = self.layout.position_at(self.buffer.lines(), x, y);
        self.place_caret(pos, at_wrap);
        self.magic_x = Some(x);
        self.end_motion(extend);
    }

    fn page_height(&self) -> i64 {
        let line_height = self.layout.line_height();
        i64::from(self.layout.viewport_height().max(2 * line_height))
    }

    pub fn move_up(&mut self, extend: bool) {
        self.move_vertically(-i64::from(self.layout.line_height()), extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        self.move_vertically(i64::from(self.layout.line_height()), extend);
    }

    pub fn page_up(&mut self, extend: bool) {
        let dy = self.page_height() - i64::from(self.layout.line_height());
        self.move_vertically(-dy, extend);
    }

    pub fn page_down(&mut self, extend: bool) {
        let dy = self.page_height();
        self.move_vertically(dy, extend);
    }

    /// Start of the visual line when wrapping. Otherwise the first
    /// non-blank column, or column 0 when only blanks precede the caret.
    pub fn home(&mut self, extend: bool) {
        if self.layout.is_wrap() {
            let y = self.caret_y();
            self.begin_motion(extend);
            let (pos, at_wrap) = self.layout.position_at(self.buffer.lines(), 0, y);
            self.place_caret(pos, at_wrap);
            self.magic_x = None;
            self.end_motion(extend);
            return;
        }
        let Position { row, col } = self.buffer.caret();
        let line = self.buffer.line(row);
        let to = if line[..col].iter().all(|c| c.is_whitespace()) {
            0
        } else {
            line.iter()
                .position(|c| !c.is_whitespace())
                .unwrap_or(line.len())
        };
        self.move_to(Position::new(row, to), extend);
    }

    /// End of the visual line when wrapping, else end of the row.
    pub fn end(&mut self, extend: bool) {
        if self.layout.is_wrap() {
            let y = self.caret_y();
            self.begin_motion(extend);
            let (pos, at_wrap) = self.layout.position_at(self.buffer.lines(), u32::MAX, y);
            self.place_caret(pos, at_wrap);
            self.magic_x = None;
            self.end_motion(extend);
            return;
        }
        let row = self.buffer.caret().row;
        let to = Position::new(row, self.buffer.line_len(row));
        self.move_to(to, extend);
    }

    pub fn document_start(&mut self, extend: bool) {
        self.move_to(Position::default(), extend);
    }

    pub fn document_end(&mut self, extend: bool) {
        let end = self.buffer.end_position();
        self.move_to(end, extend);
    }

    /// Move to the start of 1-based line `line`, clamped to the document.
    pub fn go_to_line(&mut self, line: usize) {
        let row = line.saturating_sub(1).min(self.buffer.line_count() - 1);
        self.move_to(Position::new(row, 0), false);
    }

    // Display

    /// Color and overlays of every character of `row`.
    pub fn color_codes(&self, row: usize) -> Vec<StyledCell> {
        let lines = self.buffer.lines();
        let mut cells: Vec<StyledCell> = self
            .highlighter
            .color_codes(lines, row)
            .into_iter()
            .map(|code| StyledCell {
                code,
                overlay: Overlay::empty(),
            })
            .collect();
        mark_irregular_whitespace(&lines[row], &mut cells);
        if let Some(query) = self.buffer.active_query() {
            mark_matches(
                &self.buffer.matches_in_row(row),
                query.target_len(),
                &mut cells,
            );
        }
        cells
    }

    pub fn caret_x(&mut self) -> u32 {
        let Position { row, col } = self.buffer.caret();
        self.layout
            .x(self.buffer.lines(), row, col, self.caret_at_wrap)
    }

    pub fn caret_y(&mut self) -> u32 {
        let Position { row, col } = self.buffer.caret();
        self.layout
            .y(self.buffer.lines(), row, col, self.caret_at_wrap)
    }

    pub fn x(&mut self, row: usize, col: usize) -> u32 {
        self.layout.x(self.buffer.lines(), row, col, false)
    }

    pub fn y(&mut self, row: usize, col: usize) -> u32 {
        self.layout.y(self.buffer.lines(), row, col, false)
    }

    pub fn segment_count(&mut self, row: usize) -> usize {
        self.layout.segment_count(self.buffer.lines(), row)
    }

    pub fn document_width(&mut self) -> u32 {
        self.layout.document_width(self.buffer.lines())
    }

    pub fn document_height(&mut self) -> u32 {
        self.layout.document_height(self.buffer.lines())
    }

    pub fn resize(&mut self, width: u32, height: u32, wrap: bool) {
        self.layout.resize(width, height, wrap);
        if !wrap {
            self.caret_at_wrap = false;
        }
    }
}

/// Thread-safe handle to a document. Clones share the same document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Document {
    pub fn new(text: &str, kind: SyntaxKind, config: EngineConfig) -> Result<Self, PatternError> {
        Ok(Self {
            inner: Arc::new(RwLock::new(DocumentInner::new(text, kind, config)?)),
        })
    }

    /// Execute a function with read access to the document
    pub fn with_read<R>(&self, f: impl FnOnce(&DocumentInner) -> R) -> R {
        f(&self
            .inner
            .read()
            .expect("Document lock should not be poisoned"))
    }

    /// Execute a function with write access to the document
    pub fn with_write<R>(&self, f: impl FnOnce(&mut DocumentInner) -> R) -> R {
        f(&mut self
            .inner
            .write()
            .expect("Document lock should not be poisoned"))
    }

    pub fn text(&self) -> String {
        self.with_read(|d| d.buffer.text())
    }

    pub fn line(&self, row: usize) -> String {
        self.with_read(|d| d.buffer.line(row).iter().collect())
    }

    pub fn line_count(&self) -> usize {
        self.with_read(|d| d.buffer.line_count())
    }

    pub fn char_count(&self) -> usize {
        self.with_read(|d| d.buffer.char_count())
    }

    pub fn caret(&self) -> Position {
        self.with_read(|d| d.buffer.caret())
    }

    pub fn selection(&self) -> Option<TextRange> {
        self.with_read(|d| d.buffer.selection())
    }

    pub fn kind(&self) -> SyntaxKind {
        self.with_read(|d| d.kind())
    }

    pub fn can_undo(&self) -> bool {
        self.with_read(|d| d.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.with_read(|d| d.can_redo())
    }

    pub fn change_kind(&self, kind: SyntaxKind) -> Result<(), PatternError> {
        self.with_write(|d| d.change_kind(kind))
    }

    // Editing
    pub fn type_char(&self, c: char) {
        self.with_write(|d| d.type_char(c))
    }

    pub fn enter(&self) {
        self.with_write(|d| d.enter())
    }

    pub fn backspace_key(&self) {
        self.with_write(|d| d.backspace_key())
    }

    pub fn delete_key(&self) {
        self.with_write(|d| d.delete_key())
    }

    pub fn paste(&self, text: &str) -> Result<(), EditError> {
        self.with_write(|d| d.paste(text))
    }

    pub fn cut(&self) -> Option<String> {
        self.with_write(|d| d.cut())
    }

    pub fn selected_text(&self) -> Option<String> {
        self.with_read(|d| d.selected_text())
    }

    pub fn select_all(&self) {
        self.with_write(|d| d.select_all())
    }

    // Search
    pub fn count_matches(&self, query: &MatchQuery) -> usize {
        self.with_write(|d| d.count_matches(query))
    }

    pub fn find_next(&self, query: &MatchQuery) -> bool {
        self.with_write(|d| d.find_next(query))
    }

    pub fn replace(&self, query: &MatchQuery) -> bool {
        self.with_write(|d| d.replace(query))
    }

    pub fn replace_all(&self, query: &MatchQuery) -> bool {
        self.with_write(|d| d.replace_all(query))
    }

    pub fn disable_match(&self) {
        self.with_write(|d| d.disable_match())
    }

    // Selection edits
    pub fn indent_selection(&self) -> bool {
        self.with_write(|d| d.indent_selection())
    }

    pub fn outdent_selection(&self) -> bool {
        self.with_write(|d| d.outdent_selection())
    }

    pub fn convert_case(&self, upper: bool) -> bool {
        self.with_write(|d| d.convert_case(upper))
    }

    pub fn join_lines(&self) -> bool {
        self.with_write(|d| d.join_lines())
    }

    // History
    pub fn undo(&self) -> bool {
        self.with_write(|d| d.undo())
    }

    pub fn redo(&self) -> bool {
        self.with_write(|d| d.redo())
    }

    // Caret motion
    pub fn move_to(&self, pos: Position, extend: bool) {
        self.with_write(|d| d.move_to(pos, extend))
    }

    pub fn move_to_point(&self, x: u32, y: u32, extend: bool) {
        self.with_write(|d| d.move_to_point(x, y, extend))
    }

    pub fn move_left(&self, extend: bool) {
        self.with_write(|d| d.move_left(extend))
    }

    pub fn move_right(&self, extend: bool) {
        self.with_write(|d| d.move_right(extend))
    }

    pub fn move_up(&self, extend: bool) {
        self.with_write(|d| d.move_up(extend))
    }

    pub fn move_down(&self, extend: bool) {
        self.with_write(|d| d.move_down(extend))
    }

    pub fn page_up(&self, extend: bool) {
        self.with_write(|d| d.page_up(extend))
    }

    pub fn page_down(&self, extend: bool) {
        self.with_write(|d| d.page_down(extend))
    }

    pub fn home(&self, extend: bool) {
        self.with_write(|d| d.home(extend))
    }

    pub fn end(&self, extend: bool) {
        self.with_write(|d| d.end(extend))
    }

    pub fn document_start(&self, extend: bool) {
        self.with_write(|d| d.document_start(extend))
    }

    pub fn document_end(&self, extend: bool) {
        self.with_write(|d| d.document_end(extend))
    }

    pub fn go_to_line(&self, line: usize) {
        self.with_write(|d| d.go_to_line(line))
    }

    // Display
    pub fn color_codes(&self, row: usize) -> Vec<StyledCell> {
        self.with_read(|d| d.color_codes(row))
    }

    pub fn caret_x(&self) -> u32 {
        self.with_write(|d| d.caret_x())
    }

    pub fn caret_y(&self) -> u32 {
        self.with_write(|d| d.caret_y())
    }

    pub fn x(&self, row: usize, col: usize) -> u32 {
        self.with_write(|d| d.x(row, col))
    }

    pub fn y(&self, row: usize, col: usize) -> u32 {
        self.with_write(|d| d.y(row, col))
    }

    pub fn segment_count(&self, row: usize) -> usize {
        self.with_write(|d| d.segment_count(row))
    }

    pub fn document_width(&self) -> u32 {
        self.with_write(|d| d.document_width())
    }

    pub fn document_height(&self) -> u32 {
        self.with_write(|d| d.document_height())
    }

    pub fn resize(&self, width: u32, height: u32, wrap: bool) {
        self.with_write(|d| d.resize(width, height, wrap))
    }
}
