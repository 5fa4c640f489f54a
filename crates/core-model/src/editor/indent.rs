//! Block indent / unindent over the lines a selection touches.
//!
//! Both are no-ops without a selection. Each line change is its own buffer
//! primitive; the first is recorded plain and the rest `combined`, so the whole
//! block undoes in one step. Every record carries the final selection as its
//! `cursor_after`, which is what redo restores.
//!
//! Unindent only removes `' '` characters from the leading-space run of a line.
//! On the first and last selected lines the removal is centred on the
//! selection edge: up to `indent_width` spaces, taken right of the edge first
//! and then left of it. Interior lines lose up to `indent_width` leading
//! spaces. See `core_text::motion::unindent_edge_range`.

use core_state::{EditRecord, Selection};
use core_text::{EditOp, Position, motion};
use std::time::Instant;
use tracing::debug;

use super::Editor;

impl Editor {
    /// Prepend `indent_width` spaces to every selected line. Returns false without a selection.
    pub fn indent(&mut self) -> bool {
        self.indent_timed(Instant::now())
    }

    pub fn indent_timed(&mut self, now: Instant) -> bool {
        let before = self.state.selection;
        if !before.is_selection() {
            return false;
        }
        let width = self.state.options.indent_width;
        let pad = " ".repeat(width);
        let (start, end) = before.ordered();
        let ops: Vec<EditOp> = (start.row..=end.row)
            .map(|row| self.state.buffer.insert_at(row, 0, &pad))
            .collect();
        let after = before.map(|p| Position::new(p.row, p.col + width));
        debug!(target: "model.edit", op = "indent", from_row = start.row, to_row = end.row, width, "indent");
        self.record_block(ops, before, after, now);
        true
    }

    /// Strip up to `indent_width` leading spaces from every selected line.
    /// Returns false without a selection or when nothing could be removed.
    pub fn unindent(&mut self) -> bool {
        self.unindent_timed(Instant::now())
    }

    pub fn unindent_timed(&mut self, now: Instant) -> bool {
        let before = self.state.selection;
        if !before.is_selection() {
            return false;
        }
        let width = self.state.options.indent_width;
        let (start, end) = before.ordered();
        // Removed char range per row, in row order.
        let ranges: Vec<(usize, (usize, usize))> = (start.row..=end.row)
            .map(|row| {
                let line = self.state.buffer.line(row);
                let range = if row == start.row {
                    motion::unindent_edge_range(&line, start.col, width)
                } else if row == end.row {
                    motion::unindent_edge_range(&line, end.col, width)
                } else {
                    motion::unindent_interior_range(&line, width)
                };
                (row, range)
            })
            .collect();
        let ops: Vec<EditOp> = ranges
            .iter()
            .filter(|(_, (a, b))| a < b)
            .map(|&(row, (a, b))| self.state.buffer.delete_at(row, a, &" ".repeat(b - a)))
            .collect();
        if ops.is_empty() {
            return false;
        }
        let after = before.map(|p| {
            match ranges.iter().find(|(row, _)| *row == p.row) {
                Some(&(_, (a, b))) => Position::new(p.row, shift_col(p.col, a, b)),
                None => p,
            }
        });
        debug!(target: "model.edit", op = "unindent", from_row = start.row, to_row = end.row, lines = ops.len(), width, "indent");
        self.record_block(ops, before, after, now);
        true
    }

    fn record_block(&mut self, ops: Vec<EditOp>, before: Selection, after: Selection, now: Instant) {
        for (i, op) in ops.into_iter().enumerate() {
            let record = EditRecord::new(op, before, after)
                .combined(i > 0)
                .mergeable(false);
            self.state.record(record, now);
        }
        self.state.selection = after;
        self.state.goal_col = after.head().col;
        self.reveal_head();
    }
}

/// Where column `c` lands after chars `a..b` are removed from its line.
fn shift_col(c: usize, a: usize, b: usize) -> usize {
    if c <= a {
        c
    } else if c >= b {
        c - (b - a)
    } else {
        a
    }
}
