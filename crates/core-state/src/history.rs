//! Linear undo/redo stacks with time-windowed coalescing.
//!
//! Each entry holds one invertible [`EditOp`]. A run of `combined` entries is
//! undone and redone as one step together with the plain entry that starts
//! the run (selection replacement is a delete followed by a combined insert).
//!
//! New edits clear the redo stack; undo and redo never discard anything.
//! After an undo or redo the next edit always opens a fresh entry.

use core_text::{Buffer, EditOp};
use std::time::Instant;
use tracing::{debug, trace};

use crate::Selection;
use crate::undo::{CoalescePolicy, EditRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub op: EditOp,
    pub cursor_before: Selection,
    pub cursor_after: Selection,
    pub combined: bool,
    /// Created from a unit edit, so later unit edits may merge into it.
    coalescable: bool,
    last_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    policy: CoalescePolicy,
    /// Maximum retained undo steps; 0 keeps everything.
    max_depth: usize,
    sealed: bool,
}

impl History {
    pub fn new(policy: CoalescePolicy, max_depth: usize) -> Self {
        Self {
            policy,
            max_depth,
            ..Self::default()
        }
    }

    pub fn undo_stack(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }
    pub fn redo_stack(&self) -> &[HistoryEntry] {
        &self.redo_stack
    }
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn record(&mut self, record: EditRecord, now: Instant) {
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
        let sealed = std::mem::take(&mut self.sealed);
        if !sealed
            && !record.combined
            && record.mergeable
            && let Some(top) = self.undo_stack.last_mut()
            && top.coalescable
            && !top.combined
            && self.policy.try_merge(&mut top.op, top.last_at, &record.op, now)
        {
            top.cursor_after = record.cursor_after;
            top.last_at = now;
            trace!(target: "state.undo", row = top.op.row, col = top.op.col, len = top.op.char_len(), "coalesce");
            return;
        }
        let coalescable = record.accepts_merges();
        self.undo_stack.push(HistoryEntry {
            op: record.op,
            cursor_before: record.cursor_before,
            cursor_after: record.cursor_after,
            combined: record.combined,
            coalescable,
            last_at: now,
        });
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), combined = record.combined, "push_entry");
        self.trim();
    }

    /// Drop whole undo steps from the front until at most `max_depth` remain.
    /// A step is a plain entry plus the `combined` entries after it, so the
    /// step still being recorded is never split.
    fn trim(&mut self) {
        if self.max_depth == 0 {
            return;
        }
        let mut steps = self.step_starts().count();
        let mut dropped = 0;
        while steps > self.max_depth {
            let len = 1 + self.undo_stack[1..].iter().take_while(|e| e.combined).count();
            self.undo_stack.drain(..len);
            dropped += len;
            steps -= 1;
        }
        if dropped > 0 {
            debug!(target: "state.undo", dropped, undo_depth = self.undo_stack.len(), "undo_stack_trimmed");
        }
    }

    /// Indices of entries that begin an undo step.
    fn step_starts(&self) -> impl Iterator<Item = usize> + '_ {
        self.undo_stack
            .iter()
            .enumerate()
            .filter(|(i, e)| *i == 0 || !e.combined)
            .map(|(i, _)| i)
    }

    pub fn undo(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        let mut entry = self.undo_stack.pop()?;
        loop {
            buffer.apply(&entry.op.inverse());
            let combined = entry.combined;
            let cursor = entry.cursor_before;
            self.redo_stack.push(entry);
            if !combined {
                self.sealed = true;
                trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
                return Some(cursor);
            }
            match self.undo_stack.pop() {
                Some(prev) => entry = prev,
                None => {
                    self.sealed = true;
                    return Some(cursor);
                }
            }
        }
    }

    pub fn redo(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        let first = self.redo_stack.pop()?;
        buffer.apply(&first.op);
        let mut cursor = first.cursor_after;
        self.undo_stack.push(first);
        while self.redo_stack.last().is_some_and(|e| e.combined) {
            if let Some(next) = self.redo_stack.pop() {
                buffer.apply(&next.op);
                cursor = next.cursor_after;
                self.undo_stack.push(next);
            }
        }
        self.sealed = true;
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Some(cursor)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.sealed = false;
        debug!(target: "state.undo", "history_cleared");
    }
}
