//! Text entry and deletion.
//!
//! Each operation runs buffer primitives and records every resulting
//! `EditOp` with the selection before and after it. Replacing a selection is a
//! recorded delete followed by an insert marked `combined`, so both are undone
//! in one step.
//!
//! The `_timed` variants take the clock reading used for coalescing; the plain
//! forms read `Instant::now()`.

use core_state::{EditRecord, Selection};
use core_text::{EditOp, Position, grapheme, segment::normalize_input};
use std::time::Instant;
use tracing::trace;

use super::Editor;

impl Editor {
    /// Insert `text` at the head, replacing the selection if there is one.
    pub fn insert(&mut self, text: &str) {
        self.insert_timed(text, Instant::now());
    }

    pub fn insert_timed(&mut self, text: &str, now: Instant) {
        let text = normalize_input(text);
        let before = self.state.selection;
        let (mut at, combined) = match self.delete_selection(before, now) {
            Some(start) => (start, true),
            None => (before.head(), false),
        };
        if !text.is_empty() {
            let op = self.state.buffer.insert_at(at.row, at.col, &text);
            at = op.end();
            trace!(target: "model.edit", op = "insert", row = op.row, col = op.col, len = op.char_len(), to_row = at.row, to_col = at.col, combined, "edit");
            self.commit(op, before, Selection::cursor(at), combined, now);
        }
        self.state.selection = Selection::cursor(at);
        self.state.goal_col = at.col;
        self.reveal_head();
    }

    /// Backspace: delete the selection, else one grapheme left of the head,
    /// else (at column 0) the newline joining this row to the previous one.
    /// Returns false at the document start.
    pub fn delete(&mut self) -> bool {
        self.delete_timed(Instant::now())
    }

    pub fn delete_timed(&mut self, now: Instant) -> bool {
        if self.is_selection() {
            self.insert_timed("", now);
            return true;
        }
        let head = self.head();
        let (row, col, text) = if head.col > 0 {
            let line = self.state.buffer.line(head.row);
            let prev = grapheme::prev_boundary(&line, head.col);
            (head.row, prev, char_slice(&line, prev, head.col))
        } else if head.row > 0 {
            (head.row - 1, self.state.buffer.line_len(head.row - 1), "\n".to_string())
        } else {
            return false;
        };
        self.delete_and_record(row, col, &text, Position::new(row, col), now, "backspace");
        true
    }

    /// Delete key: delete the selection, else one grapheme right of the head,
    /// else (at the phantom column) the newline joining the next row. Returns
    /// false at the document end.
    pub fn delete_forward(&mut self) -> bool {
        self.delete_forward_timed(Instant::now())
    }

    pub fn delete_forward_timed(&mut self, now: Instant) -> bool {
        if self.is_selection() {
            self.insert_timed("", now);
            return true;
        }
        let head = self.head();
        let line = self.state.buffer.line(head.row);
        let len = line.chars().count();
        let text = if head.col < len {
            let next = grapheme::next_boundary(&line, head.col);
            char_slice(&line, head.col, next)
        } else if head.row < self.state.buffer.last_index() {
            "\n".to_string()
        } else {
            return false;
        };
        self.delete_and_record(head.row, head.col, &text, head, now, "delete_forward");
        true
    }

    /// Split the line at the head (replacing the selection first).
    pub fn new_line(&mut self) {
        self.new_line_timed(Instant::now());
    }

    pub fn new_line_timed(&mut self, now: Instant) {
        self.insert_timed("\n", now);
    }

    /// Delete the ordered selection range and record it. Returns the start
    /// position, or `None` (recording nothing) when there is no selection or
    /// it is empty. An empty range still collapses to a cursor in the caller.
    fn delete_selection(&mut self, before: Selection, now: Instant) -> Option<Position> {
        if !before.is_selection() {
            return None;
        }
        let (start, end) = before.ordered();
        if start == end {
            return None;
        }
        let removed = self.state.buffer.slice(start, end);
        let op = self.state.buffer.delete_at(start.row, start.col, &removed);
        trace!(target: "model.edit", op = "delete_selection", row = start.row, col = start.col, to_row = end.row, to_col = end.col, "edit");
        // A one-character selection must not extend a preceding backspace run.
        let record = EditRecord::new(op, before, Selection::cursor(start)).mergeable(false);
        self.state.record(record, now);
        Some(start)
    }

    fn delete_and_record(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        after: Position,
        now: Instant,
        kind: &'static str,
    ) {
        let before = self.state.selection;
        let op = self.state.buffer.delete_at(row, col, text);
        trace!(target: "model.edit", op = kind, row = before.head().row, col = before.head().col, to_row = after.row, to_col = after.col, "edit");
        self.commit(op, before, Selection::cursor(after), false, now);
        self.state.selection = Selection::cursor(after);
        self.state.goal_col = after.col;
        self.reveal_head();
    }

    pub(super) fn commit(
        &mut self,
        op: EditOp,
        before: Selection,
        after: Selection,
        combined: bool,
        now: Instant,
    ) {
        let record = EditRecord::new(op, before, after).combined(combined);
        self.state.record(record, now);
    }
}

fn char_slice(line: &str, from: usize, to: usize) -> String {
    line.chars().skip(from).take(to - from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::EditorOptions;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ed(text: &str) -> Editor {
        Editor::new(text, EditorOptions::default(), 10)
    }

    fn at(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn insert_multiline_places_cursor_after_text() {
        let mut e = ed("ab");
        e.set_cursor(at(0, 1));
        e.insert("x\ny\nz");
        assert_eq!(e.text(), "ax\ny\nzb");
        assert_eq!(e.head(), at(2, 1));
        assert_eq!(e.goal_col(), 1);
    }

    #[test]
    fn insert_normalizes_input() {
        let mut e = ed("");
        e.insert("e\u{0301}\r\n");
        assert_eq!(e.text(), "\u{00E9}\n");
        assert_eq!(e.head(), at(1, 0));
    }

    #[test]
    fn insert_replaces_selection_as_one_step() {
        let mut e = ed("Hello World");
        e.make_selection();
        e.set_cursor(at(0, 5));
        e.insert("Hi");
        assert_eq!(e.text(), "Hi World");
        assert!(!e.is_selection());
        assert!(e.undo());
        assert_eq!(e.text(), "Hello World");
        assert_eq!(e.ordered(), (at(0, 0), at(0, 5)));
        assert!(e.is_selection());
    }

    #[test]
    fn backspace_joins_lines() {
        let mut e = ed("ab\ncd");
        e.set_cursor(at(1, 0));
        assert!(e.delete());
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.head(), at(0, 2));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut e = ed("ab");
        assert!(!e.delete());
        assert!(!e.can_undo());
    }

    #[test]
    fn backspace_removes_whole_cluster() {
        let mut e = ed("a👍🏽");
        e.move_end_of_line();
        e.delete();
        assert_eq!(e.text(), "a");
    }

    #[test]
    fn delete_with_selection_is_single_delete() {
        let mut e = ed("abcdef");
        e.set_cursor(at(0, 4));
        e.make_selection();
        e.set_cursor(at(0, 1));
        e.delete();
        assert_eq!(e.text(), "aef");
        assert_eq!(e.head(), at(0, 1));
        assert_eq!(e.history().map(|h| h.undo_depth()), Some(1));
    }

    #[test]
    fn empty_range_collapses_without_recording() {
        let mut e = ed("abc");
        e.make_selection();
        e.delete();
        assert!(!e.is_selection());
        assert_eq!(e.text(), "abc");
        assert!(!e.can_undo());
    }

    #[test]
    fn delete_forward_joins_next_line() {
        let mut e = ed("ab\ncd");
        e.move_end_of_line();
        assert!(e.delete_forward());
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.head(), at(0, 2));
        assert!(e.delete_forward());
        assert_eq!(e.text(), "abd");
        e.move_document_end();
        assert!(!e.delete_forward());
    }

    #[test]
    fn new_line_replaces_selection() {
        let mut e = ed("foo bar");
        e.set_cursor(at(0, 3));
        e.make_selection();
        e.set_cursor(at(0, 4));
        e.new_line();
        assert_eq!(e.text(), "foo\nbar");
        assert_eq!(e.head(), at(1, 0));
        e.undo();
        assert_eq!(e.text(), "foo bar");
    }

    #[test]
    fn typing_run_undoes_together() {
        let mut e = ed("");
        let t = Instant::now();
        for (i, c) in "ABC".chars().enumerate() {
            e.insert_timed(&c.to_string(), t + Duration::from_millis(i as u64 * 100));
        }
        e.undo();
        assert_eq!(e.text(), "");
        assert_eq!(e.head(), at(0, 0));
    }
}
