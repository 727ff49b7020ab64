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

//! Undo/redo for buffer edits.
//!
//! Every edit is a [`Command`]. Executing a command against a buffer returns
//! its exact inverse, which is what goes on the undo stack; undoing executes
//! that inverse and pushes the result onto the redo stack, and so on.
//!
//! Commands issued as one user action (replace-all, typing over a
//! selection, indenting a block) are recorded between
//! [`History::begin_group`] and [`History::end_group`] and become a single
//! [`CommandKind::Composite`].
//!
//! Each undo unit also remembers the caret and selection from just before
//! the edit, so undoing puts both back exactly.

use crate::buffer::TextBuffer;
use crate::range::{Position, TextRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Type a character at the caret
    Insert(char),
    /// Remove the character before the caret
    BackSpace(char),
    /// Remove the character after the caret
    Delete(char),
    /// Put back a character removed by `Delete`, leaving the caret in front
    /// of it
    Undelete(char),
    InsertString(String),
    DeleteString(TextRange),
    /// Executing runs the children last to first
    Composite(Vec<Command>),
}

/// An edit and the caret position it applies at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub caret: Position,
}

impl Command {
    pub fn new(kind: CommandKind, caret: Position) -> Self {
        Self { kind, caret }
    }

    pub fn insert(c: char, caret: Position) -> Self {
        Self::new(CommandKind::Insert(c), caret)
    }

    pub fn backspace(caret: Position) -> Self {
        Self::new(CommandKind::BackSpace('\0'), caret)
    }

    pub fn delete(caret: Position) -> Self {
        Self::new(CommandKind::Delete('\0'), caret)
    }

    pub fn insert_string(text: impl Into<String>, caret: Position) -> Self {
        Self::new(CommandKind::InsertString(text.into()), caret)
    }

    /// Delete `range`. The caret is recorded at the range end, where
    /// reinserting the text leaves it.
    pub fn delete_string(range: TextRange) -> Self {
        let range = range.forward();
        Self::new(CommandKind::DeleteString(range), range.end)
    }

    pub fn composite(children: Vec<Command>) -> Self {
        Self::new(CommandKind::Composite(children), Position::default())
    }

    /// A command that changed nothing, e.g. backspace at the document start.
    pub fn is_noop(&self) -> bool {
        match &self.kind {
            CommandKind::Composite(children) => children.iter().all(Command::is_noop),
            CommandKind::InsertString(text) => text.is_empty(),
            CommandKind::DeleteString(range) => range.is_empty(),
            _ => false,
        }
    }

    fn noop() -> Self {
        Self::composite(Vec::new())
    }

    /// Apply the command and return the command that reverses it.
    pub fn exec(&self, buffer: &mut TextBuffer) -> Command {
        match &self.kind {
            CommandKind::Insert(c) => {
                buffer.set_caret(self.caret);
                buffer.insert(*c);
                Command::new(CommandKind::BackSpace(*c), buffer.caret())
            }
            CommandKind::BackSpace(_) => {
                buffer.set_caret(self.caret);
                match buffer.backspace() {
                    Some(removed) => Command::insert(removed, buffer.caret()),
                    None => Command::noop(),
                }
            }
            CommandKind::Delete(_) => {
                let Position { row, col } = self.caret;
                let next = if col < buffer.line_len(row) {
                    Position::new(row, col + 1)
                } else if row + 1 < buffer.line_count() {
                    Position::new(row + 1, 0)
                } else {
                    return Command::noop();
                };
                buffer.set_caret(next);
                match buffer.backspace() {
                    Some(removed) => {
                        Command::new(CommandKind::Undelete(removed), buffer.caret())
                    }
                    None => Command::noop(),
                }
            }
            CommandKind::Undelete(c) => {
                buffer.set_caret(self.caret);
                buffer.insert(*c);
                buffer.set_caret(self.caret);
                Command::new(CommandKind::Delete(*c), self.caret)
            }
            CommandKind::InsertString(text) => {
                buffer.set_caret(self.caret);
                buffer.insert_string(text);
                let end = buffer.caret();
                Command::new(
                    CommandKind::DeleteString(TextRange::new(self.caret, end)),
                    end,
                )
            }
            CommandKind::DeleteString(range) => {
                let range = range.forward();
                let text = buffer.string_by_range(range);
                buffer.delete_range(range);
                Command::insert_string(text, range.begin)
            }
            CommandKind::Composite(children) => {
                let inverses = children
                    .iter()
                    .rev()
                    .map(|child| child.exec(buffer))
                    .collect();
                Command::composite(inverses)
            }
        }
    }
}

/// One step on the undo or redo stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: Command,
    /// Caret before the edit this entry undoes
    pub caret: Position,
    /// Selection before the edit, anchor first
    pub selection: TextRange,
}

/// Undo and redo stacks for one document.
#[derive(Debug)]
pub struct History {
    /// Inverses of applied edits
    undo_stack: Vec<HistoryEntry>,
    /// Inverses of undone edits
    redo_stack: Vec<HistoryEntry>,
    /// Maximum undo stack size (0 = unlimited)
    max_history: usize,
    /// Inverses collected since `begin_group`, in execution order
    pending_group: Option<Vec<Command>>,
    /// Caret and selection before the first edit of the pending group
    group_state: Option<(Position, TextRange)>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_max_history(0)
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
            pending_group: None,
            group_state: None,
        }
    }

    /// Record the inverse of an edit that was just applied. `caret` and
    /// `selection` are the buffer's state from before the edit.
    pub fn record(&mut self, inverse: Command, caret: Position, selection: TextRange) {
        if inverse.is_noop() {
            return;
        }
        self.redo_stack.clear();
        match self.pending_group.as_mut() {
            Some(group) => {
                group.push(inverse);
                self.group_state.get_or_insert((caret, selection));
            }
            None => {
                self.undo_stack.push(HistoryEntry {
                    command: inverse,
                    caret,
                    selection,
                });
                self.trim_history();
            }
        }
    }

    /// Start collecting edits into one undo unit.
    pub fn begin_group(&mut self) {
        self.end_group();
        self.pending_group = Some(Vec::new());
    }

    /// Commit the collected edits as a single undo unit.
    pub fn end_group(&mut self) {
        let Some(mut ops) = self.pending_group.take() else {
            return;
        };
        let Some((caret, selection)) = self.group_state.take() else {
            return;
        };
        let command = match ops.len() {
            0 => return,
            // Single op - no need for a composite wrapper
            1 => ops.remove(0),
            _ => Command::composite(ops),
        };
        self.undo_stack.push(HistoryEntry {
            command,
            caret,
            selection,
        });
        self.trim_history();
    }

    /// Drop the current group without committing it. The edits themselves
    /// stay applied.
    pub fn cancel_group(&mut self) {
        self.pending_group = None;
        self.group_state = None;
    }

    /// Pop the entry that undoes the latest edit. The caller executes its
    /// command, restores its caret and selection, and hands the result to
    /// [`did_undo`](Self::did_undo).
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.end_group();
        self.undo_stack.pop()
    }

    /// Push the inverse of an undone entry onto the redo stack, keeping the
    /// entry's pre-edit state for when it is undone again.
    pub fn did_undo(&mut self, inverse: Command, undone: HistoryEntry) {
        self.redo_stack.push(HistoryEntry {
            command: inverse,
            caret: undone.caret,
            selection: undone.selection,
        });
    }

    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    pub fn did_redo(&mut self, inverse: Command, redone: HistoryEntry) {
        self.undo_stack.push(HistoryEntry {
            command: inverse,
            caret: redone.caret,
            selection: redone.selection,
        });
        self.trim_history();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.pending_group.as_ref().is_some_and(|g| !g.is_empty())
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn trim_history(&mut self) {
        if self.max_history > 0 && self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            self.undo_stack.drain(0..excess);
        }
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn run(buffer: &mut TextBuffer, history: &mut History, cmd: Command) {
        let (caret, selection) = (buffer.caret(), buffer.raw_selection());
        let inverse = cmd.exec(buffer);
        history.record(inverse, caret, selection);
    }

    fn undo(buffer: &mut TextBuffer, history: &mut History) {
        if let Some(entry) = history.pop_undo() {
            let inverse = entry.command.exec(buffer);
            buffer.set_caret(entry.caret);
            buffer.set_selection(entry.selection);
            history.did_undo(inverse, entry);
        }
    }

    fn redo(buffer: &mut TextBuffer, history: &mut History) {
        if let Some(entry) = history.pop_redo() {
            let inverse = entry.command.exec(buffer);
            history.did_redo(inverse, entry);
        }
    }

    #[test]
    fn test_insert_inverse() {
        let mut buffer = TextBuffer::from_text("ac");
        let inverse = Command::insert('b', pos(0, 1)).exec(&mut buffer);
        assert_eq!(buffer.text(), "abc");
        assert_eq!(inverse, Command::new(CommandKind::BackSpace('b'), pos(0, 2)));
        let again = inverse.exec(&mut buffer);
        assert_eq!(buffer.text(), "ac");
        assert_eq!(again, Command::insert('b', pos(0, 1)));
    }

    #[test]
    fn test_delete_inverse_keeps_caret() {
        let mut buffer = TextBuffer::from_text("ab\ncd");
        let inverse = Command::delete(pos(0, 2)).exec(&mut buffer);
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(inverse, Command::new(CommandKind::Undelete('\n'), pos(0, 2)));
        inverse.exec(&mut buffer);
        assert_eq!(buffer.text(), "ab\ncd");
        assert_eq!(buffer.caret(), pos(0, 2));
    }

    #[test]
    fn test_noop_edits() {
        let mut buffer = TextBuffer::from_text("x");
        assert!(Command::backspace(pos(0, 0)).exec(&mut buffer).is_noop());
        assert!(Command::delete(pos(0, 1)).exec(&mut buffer).is_noop());

        let mut history = History::new();
        run(&mut buffer, &mut history, Command::backspace(pos(0, 0)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_string_inverse() {
        let mut buffer = TextBuffer::from_text("one\ntwo");
        let inverse = Command::insert_string("A\nB", pos(1, 1)).exec(&mut buffer);
        assert_eq!(buffer.text(), "one\ntA\nBwo");
        assert_eq!(
            inverse.kind,
            CommandKind::DeleteString(TextRange::new(pos(1, 1), pos(2, 1)))
        );
        let back = inverse.exec(&mut buffer);
        assert_eq!(buffer.text(), "one\ntwo");
        assert_eq!(back, Command::insert_string("A\nB", pos(1, 1)));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buffer = TextBuffer::new();
        let mut history = History::new();
        run(&mut buffer, &mut history, Command::insert('a', pos(0, 0)));
        undo(&mut buffer, &mut history);
        assert!(history.can_redo());

        run(&mut buffer, &mut history, Command::insert('b', pos(0, 0)));
        assert!(!history.can_redo());
        assert_eq!(buffer.text(), "b");
    }

    #[test]
    fn test_undo_on_empty_stack_is_noop() {
        let mut buffer = TextBuffer::from_text("keep");
        let mut history = History::new();
        assert!(!history.can_undo());
        undo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "keep");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_group_is_one_unit() {
        let mut buffer = TextBuffer::from_text("abc");
        let mut history = History::new();

        history.begin_group();
        run(
            &mut buffer,
            &mut history,
            Command::delete_string(TextRange::on_row(0, 0, 1)),
        );
        run(&mut buffer, &mut history, Command::insert_string("XY", pos(0, 0)));
        run(&mut buffer, &mut history, Command::insert('!', pos(0, 4)));
        history.end_group();
        assert_eq!(buffer.text(), "XYbc!");
        assert_eq!(history.undo_count(), 1);

        undo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "abc");
        redo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "XYbc!");
        undo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_single_op_group_is_unwrapped() {
        let mut buffer = TextBuffer::new();
        let mut history = History::new();
        history.begin_group();
        run(&mut buffer, &mut history, Command::insert('a', pos(0, 0)));
        history.end_group();
        let entry = history.pop_undo().unwrap();
        assert!(matches!(entry.command.kind, CommandKind::BackSpace('a')));
        assert_eq!(entry.caret, pos(0, 0));
    }

    #[test]
    fn test_undo_restores_caret_and_selection() {
        let mut buffer = TextBuffer::from_text("hello world");
        let mut history = History::new();
        // Selected from the end back to the start
        buffer.set_caret(pos(0, 0));
        buffer.set_selection(TextRange::new(pos(0, 5), pos(0, 0)));

        history.begin_group();
        let sel = buffer.selection().unwrap();
        run(&mut buffer, &mut history, Command::delete_string(sel));
        run(&mut buffer, &mut history, Command::insert('J', pos(0, 0)));
        history.end_group();
        buffer.clear_selection();
        assert_eq!(buffer.text(), "J world");

        buffer.set_caret(pos(0, 7));
        undo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "hello world");
        assert_eq!(buffer.caret(), pos(0, 0));
        assert_eq!(buffer.raw_selection(), TextRange::new(pos(0, 5), pos(0, 0)));

        redo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "J world");
        assert_eq!(buffer.caret(), pos(0, 1));
        undo(&mut buffer, &mut history);
        assert_eq!(buffer.caret(), pos(0, 0));
    }

    #[test]
    fn test_cancel_group() {
        let mut buffer = TextBuffer::new();
        let mut history = History::new();
        history.begin_group();
        run(&mut buffer, &mut history, Command::insert('a', pos(0, 0)));
        assert!(history.can_undo());
        history.cancel_group();
        assert!(!history.can_undo());
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn test_history_limit() {
        let mut buffer = TextBuffer::new();
        let mut history = History::with_max_history(2);
        for (i, c) in "abc".chars().enumerate() {
            run(&mut buffer, &mut history, Command::insert(c, pos(0, i)));
        }
        assert_eq!(history.undo_count(), 2);
        undo(&mut buffer, &mut history);
        undo(&mut buffer, &mut history);
        undo(&mut buffer, &mut history);
        assert_eq!(buffer.text(), "a");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        BackSpace,
        Delete,
        InsertString(String),
        DeleteRange(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::char::range('a', 'e').prop_map(Op::Insert),
            Just(Op::Insert('\n')),
            Just(Op::BackSpace),
            Just(Op::Delete),
            "[a-c\n]{0,6}".prop_map(Op::InsertString),
            (0usize..12).prop_map(Op::DeleteRange),
        ]
    }

    /// Map a seed onto a valid position of the buffer.
    fn position_for(buffer: &TextBuffer, seed: usize) -> Position {
        let row = seed % buffer.line_count();
        Position::new(row, (seed / 7) % (buffer.line_len(row) + 1))
    }

    fn command_for(buffer: &TextBuffer, op: &Op, seed: usize) -> Command {
        let at = position_for(buffer, seed);
        match op {
            Op::Insert(c) => Command::insert(*c, at),
            Op::BackSpace => Command::backspace(at),
            Op::Delete => Command::delete(at),
            Op::InsertString(s) => Command::insert_string(s.clone(), at),
            Op::DeleteRange(to) => {
                Command::delete_string(TextRange::new(at, position_for(buffer, *to)))
            }
        }
    }

    proptest! {
        #[test]
        fn inverse_restores_text_and_caret(
            text in "[a-c\n]{0,20}",
            op in op_strategy(),
            seed in 0usize..200,
        ) {
            let mut buffer = TextBuffer::from_text(&text);
            let cmd = command_for(&buffer, &op, seed);
            buffer.set_caret(cmd.caret);
            let before_text = buffer.text();
            let before_count = buffer.char_count();

            let inverse = cmd.exec(&mut buffer);
            let after_text = buffer.text();
            let after_caret = buffer.caret();

            let redo = inverse.exec(&mut buffer);
            prop_assert_eq!(buffer.text(), before_text);
            prop_assert_eq!(buffer.char_count(), before_count);
            if !inverse.is_noop() {
                prop_assert_eq!(buffer.caret(), cmd.caret);
            }

            redo.exec(&mut buffer);
            prop_assert_eq!(buffer.text(), after_text);
            if !inverse.is_noop() {
                prop_assert_eq!(buffer.caret(), after_caret);
            }
        }

        #[test]
        fn undo_redo_roundtrip(
            ops in prop::collection::vec((op_strategy(), 0usize..200), 1..20),
            grouped in any::<bool>(),
        ) {
            let mut buffer = TextBuffer::from_text("ab\nc");
            let mut history = History::new();
            let original = buffer.text();

            if grouped {
                history.begin_group();
            }
            for (op, seed) in &ops {
                let cmd = command_for(&buffer, op, *seed);
                run(&mut buffer, &mut history, cmd);
            }
            history.end_group();
            let final_text = buffer.text();

            while history.can_undo() {
                undo(&mut buffer, &mut history);
            }
            prop_assert_eq!(buffer.text(), original);

            while history.can_redo() {
                redo(&mut buffer, &mut history);
            }
            prop_assert_eq!(buffer.text(), final_text);
        }
    }
}
