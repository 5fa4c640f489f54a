//! Editor state: the buffer, the selection, and the undo engine that records
//! every mutation made through them.
//!
//! Undo comes in two flavours selected at construction by
//! [`EditorOptions::branching`]:
//! - [`History`]: linear undo/redo stacks. A new edit clears the redo stack.
//! - [`UndoTree`]: every edit becomes a child of the current node, so no
//!   forward history is ever lost.
//!
//! Both consume [`EditRecord`]s built from the [`core_text::EditOp`]
//! descriptors the buffer primitives return and share one [`CoalescePolicy`]:
//! single-grapheme edits of the same kind, contiguous on one row and within
//! the timeout, merge into one undo step. A record marked `combined` is undone
//! and redone together with the one before it (selection replacement).
//!
//! Cursor movement and edit policy live in `core-model`; this crate only
//! holds the values they operate on.

use core_text::{Buffer, LineEnding};
use std::time::{Duration, Instant};

pub mod history;
pub mod selection;
pub mod undo;
pub mod undo_tree;

pub use history::{History, HistoryEntry};
pub use selection::Selection;
pub use undo::{CoalescePolicy, DEFAULT_COALESCE_TIMEOUT, EditRecord, UndoEngine};
pub use undo_tree::{TreeView, UndoNode, UndoTree, UndoTreeError};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Per-editor settings. Built from configuration by higher layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    /// Spaces added or removed by indent / unindent.
    pub indent_width: usize,
    pub coalesce_timeout: Duration,
    /// Select the branching undo tree instead of linear history.
    pub branching: bool,
    /// Linear history depth limit in undo steps; 0 = unbounded.
    pub max_depth: usize,
    /// Rows of context kept between the head and the viewport edge.
    pub vertical_margin: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            coalesce_timeout: DEFAULT_COALESCE_TIMEOUT,
            branching: false,
            max_depth: 0,
            vertical_margin: 0,
        }
    }
}

impl EditorOptions {
    pub fn undo_engine(&self) -> UndoEngine {
        UndoEngine::new(
            self.branching,
            CoalescePolicy::new(self.coalesce_timeout),
            self.max_depth,
        )
    }
}

/// Top-level editing state container (single buffer).
#[derive(Debug, Clone)]
pub struct EditorState {
    pub buffer: Buffer,
    pub selection: Selection,
    /// Column vertical movement tries to return to.
    pub goal_col: usize,
    pub options: EditorOptions,
    /// Set by any recorded mutation; cleared only by the caller.
    pub dirty: bool,
    undo: UndoEngine,
}

impl EditorState {
    pub fn new(text: &str, options: EditorOptions) -> Self {
        Self {
            buffer: Buffer::new(text),
            selection: Selection::default(),
            goal_col: 0,
            options,
            dirty: false,
            undo: options.undo_engine(),
        }
    }

    pub fn line_ending(&self) -> LineEnding {
        self.buffer.line_ending()
    }

    pub fn undo_engine(&self) -> &UndoEngine {
        &self.undo
    }

    pub fn undo_engine_mut(&mut self) -> &mut UndoEngine {
        &mut self.undo
    }

    pub fn record(&mut self, record: EditRecord, now: Instant) {
        self.dirty = true;
        self.undo.record(record, now);
    }

    /// Undo one step, restoring the recorded selection. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.undo(&mut self.buffer) {
            Some(sel) => {
                self.restore(sel);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo(&mut self.buffer) {
            Some(sel) => {
                self.restore(sel);
                true
            }
            None => false,
        }
    }

    /// Redo into child `branch` of the current undo tree node. False on linear history
    /// or when the branch does not exist.
    pub fn redo_branch(&mut self, branch: usize) -> bool {
        let Some(tree) = self.undo.as_tree_mut() else {
            return false;
        };
        match tree.redo(&mut self.buffer, Some(branch)) {
            Some(sel) => {
                self.restore(sel);
                true
            }
            None => false,
        }
    }

    pub fn go_to_node(&mut self, id: usize) -> Result<bool, UndoTreeError> {
        let Some(tree) = self.undo.as_tree_mut() else {
            return Ok(false);
        };
        match tree.go_to_node(&mut self.buffer, id)? {
            Some(sel) => {
                self.restore(sel);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the document, resetting selection and history.
    pub fn set_text(&mut self, text: &str) -> LineEnding {
        let ending = self.buffer.set_text(text);
        self.selection = Selection::default();
        self.goal_col = 0;
        self.dirty = false;
        self.undo.clear();
        ending
    }

    fn restore(&mut self, sel: Selection) {
        // The buffer may have been edited outside the engine.
        self.selection = sel.map(|mut p| {
            p.clamp_to(&self.buffer);
            p
        });
        self.goal_col = self.selection.head().col;
    }
}
