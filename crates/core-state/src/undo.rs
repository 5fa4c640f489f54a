use core_text::{Buffer, EditKind, EditOp};
use std::time::{Duration, Instant};
use tracing::trace;

use crate::Selection;
use crate::history::History;
use crate::undo_tree::UndoTree;

/// Default window within which single-grapheme edits merge into one undo step.
pub const DEFAULT_COALESCE_TIMEOUT: Duration = Duration::from_millis(500);

/// One recorded mutation: the primitive's descriptor plus the cursor state
/// around it. `combined` ties the record to the one recorded just before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub op: EditOp,
    pub cursor_before: Selection,
    pub cursor_after: Selection,
    pub combined: bool,
    /// False for structural edits (indent, unindent) that must stay their own
    /// undo step even when the op happens to be a single character.
    pub mergeable: bool,
}

impl EditRecord {
    pub fn new(op: EditOp, cursor_before: Selection, cursor_after: Selection) -> Self {
        Self {
            op,
            cursor_before,
            cursor_after,
            combined: false,
            mergeable: true,
        }
    }

    pub fn combined(mut self, combined: bool) -> Self {
        self.combined = combined;
        self
    }

    pub fn mergeable(mut self, mergeable: bool) -> Self {
        self.mergeable = mergeable;
        self
    }

    /// Whether later unit edits may merge into the entry this record creates.
    pub(crate) fn accepts_merges(&self) -> bool {
        self.mergeable && self.op.is_unit()
    }
}

/// Coalescing rule shared by the linear history and the undo tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescePolicy {
    pub timeout: Duration,
}

impl Default for CoalescePolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COALESCE_TIMEOUT,
        }
    }
}

impl CoalescePolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Merge `next` into `prev` when both are unit edits of the same kind,
    /// contiguous on one row, and `next` arrives within the window. Returns
    /// whether the merge happened; `prev` is untouched otherwise.
    pub fn try_merge(&self, prev: &mut EditOp, last_at: Instant, next: &EditOp, now: Instant) -> bool {
        if prev.kind != next.kind || !next.is_unit() || prev.text.contains('\n') {
            return false;
        }
        if now.saturating_duration_since(last_at) > self.timeout || prev.row != next.row {
            return false;
        }
        match next.kind {
            EditKind::Insert if next.col == prev.col + prev.char_len() => {
                prev.text.push_str(&next.text);
                true
            }
            // Backspace runs accumulate leftward.
            EditKind::Delete if next.col + next.char_len() == prev.col => {
                prev.text.insert_str(0, &next.text);
                prev.col = next.col;
                true
            }
            _ => false,
        }
    }
}

/// Undo engine selected at construction: linear stacks or a branching tree.
#[derive(Debug, Clone)]
pub enum UndoEngine {
    Linear(History),
    Tree(UndoTree),
}

impl Default for UndoEngine {
    fn default() -> Self {
        UndoEngine::Linear(History::default())
    }
}

impl UndoEngine {
    pub fn new(branching: bool, policy: CoalescePolicy, max_depth: usize) -> Self {
        if branching {
            UndoEngine::Tree(UndoTree::new(policy))
        } else {
            UndoEngine::Linear(History::new(policy, max_depth))
        }
    }

    pub fn record(&mut self, record: EditRecord, now: Instant) {
        trace!(target: "state.undo", kind = ?record.op.kind, row = record.op.row, col = record.op.col, len = record.op.char_len(), combined = record.combined, "record");
        match self {
            UndoEngine::Linear(h) => h.record(record, now),
            UndoEngine::Tree(t) => t.record(record, now),
        }
    }

    /// Step back one edit. Returns the selection to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        match self {
            UndoEngine::Linear(h) => h.undo(buffer),
            UndoEngine::Tree(t) => t.undo(buffer),
        }
    }

    /// Step forward one edit (the tree follows its remembered branch).
    pub fn redo(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        match self {
            UndoEngine::Linear(h) => h.redo(buffer),
            UndoEngine::Tree(t) => t.redo(buffer, None),
        }
    }

    pub fn clear(&mut self) {
        match self {
            UndoEngine::Linear(h) => h.clear(),
            UndoEngine::Tree(t) => t.clear(),
        }
    }

    pub fn can_undo(&self) -> bool {
        match self {
            UndoEngine::Linear(h) => h.can_undo(),
            UndoEngine::Tree(t) => t.can_undo(),
        }
    }

    pub fn can_redo(&self) -> bool {
        match self {
            UndoEngine::Linear(h) => h.can_redo(),
            UndoEngine::Tree(t) => t.can_redo(),
        }
    }

    pub fn as_history(&self) -> Option<&History> {
        match self {
            UndoEngine::Linear(h) => Some(h),
            UndoEngine::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&UndoTree> {
        match self {
            UndoEngine::Tree(t) => Some(t),
            UndoEngine::Linear(_) => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut UndoTree> {
        match self {
            UndoEngine::Tree(t) => Some(t),
            UndoEngine::Linear(_) => None,
        }
    }
}
