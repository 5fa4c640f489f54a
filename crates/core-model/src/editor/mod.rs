//! The editor: one buffer, one selection, one viewport, one undo engine.
//!
//! Every public operation runs to completion and leaves these invariants in
//! place:
//! * The head (and tail) lie inside the buffer: row in `[0, last_index]`,
//!   column in `[0, line_len(row)]`.
//! * `viewport.start() <= last_index`.
//! * After a movement or an edit the head row is visible (when the viewport
//!   has a non-zero size).
//!
//! Operations are split by concern: `motion.rs` moves the head, `edit.rs`
//! inserts and deletes, `indent.rs` shifts line blocks. Edits record each
//! buffer primitive they run into the undo engine; nothing else touches the
//! buffer.

use core_config::Config;
use core_state::{EditorOptions, EditorState, History, Selection, TreeView, UndoTreeError};
use core_text::{Buffer, LineEnding, Position, grapheme};
use tracing::{debug, trace};

use crate::Viewport;

mod edit;
mod indent;
mod motion;

pub use motion::Motion;

#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    viewport: Viewport,
}

impl Editor {
    pub fn new(text: &str, options: EditorOptions, viewport_size: usize) -> Self {
        let state = EditorState::new(text, options);
        debug!(
            target: "model.edit",
            lines = state.buffer.line_count(),
            viewport_size,
            branching = options.branching,
            "editor_created"
        );
        Self {
            state,
            viewport: Viewport::new(viewport_size),
        }
    }

    /// Build from loaded configuration. The scroll margin is clamped against
    /// `viewport_size` first.
    pub fn from_config(text: &str, config: &Config, viewport_size: usize) -> Self {
        let mut config = config.clone();
        let margin = config.apply_viewport_height(viewport_size);
        let options = EditorOptions {
            indent_width: config.effective_indent_width(),
            coalesce_timeout: config.coalesce_timeout(),
            branching: config.file.history.branching,
            max_depth: config.file.history.max_depth,
            vertical_margin: margin,
        };
        Self::new(text, options, viewport_size)
    }

    // --- queries ---------------------------------------------------------

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn buffer(&self) -> &Buffer {
        &self.state.buffer
    }

    pub fn text(&self) -> String {
        self.state.buffer.text()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.state.options
    }

    pub fn line_ending(&self) -> LineEnding {
        self.state.line_ending()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    pub fn head(&self) -> Position {
        self.state.selection.head()
    }

    pub fn tail(&self) -> Position {
        self.state.selection.tail()
    }

    pub fn goal_col(&self) -> usize {
        self.state.goal_col
    }

    /// Selection ends in document order; `(head, head)` without a selection.
    pub fn ordered(&self) -> (Position, Position) {
        self.state.selection.ordered()
    }

    pub fn is_selection(&self) -> bool {
        self.state.selection.is_selection()
    }

    pub fn is_forward_selection(&self) -> bool {
        self.state.selection.is_forward()
    }

    /// Text between the ordered selection ends (empty for a bare cursor).
    pub fn selected_text(&self) -> String {
        let (start, end) = self.ordered();
        self.state.buffer.slice(start, end)
    }

    /// Whole lines touched by the selection (the head's line for a bare cursor).
    pub fn selected_lines(&self) -> Vec<String> {
        let (start, end) = self.ordered();
        self.state.buffer.lines_in(start.row..end.row + 1)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn visible_lines(&self) -> Vec<String> {
        self.viewport.lines(&self.state.buffer)
    }

    pub fn can_undo(&self) -> bool {
        self.state.undo_engine().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.undo_engine().can_redo()
    }

    pub fn history(&self) -> Option<&History> {
        self.state.undo_engine().as_history()
    }

    pub fn undo_tree(&self) -> Option<TreeView<'_>> {
        self.state.undo_engine().as_tree().map(|t| t.tree())
    }

    // --- selection control -----------------------------------------------

    /// Move the head to `pos` (clamped into the buffer and back to a cluster
    /// boundary). A range keeps its anchor.
    pub fn set_cursor(&mut self, pos: Position) {
        let mut pos = pos;
        pos.clamp_to(&self.state.buffer);
        pos.col = grapheme::floor_boundary(&self.state.buffer.line(pos.row), pos.col);
        self.state.selection.set_head(pos);
        self.state.goal_col = pos.col;
        self.reveal_head();
    }

    pub fn make_selection(&mut self) {
        self.state.selection.make_selection();
    }

    pub fn make_cursor(&mut self) {
        self.state.selection.make_cursor();
    }

    /// Select the whole document, head at the end.
    pub fn select_all(&mut self) {
        let buf = &self.state.buffer;
        let end = Position::new(buf.last_index(), buf.line_len(buf.last_index()));
        self.state.selection = Selection::range(Position::origin(), end);
        self.state.goal_col = end.col;
        self.reveal_head();
    }

    // --- history ----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let changed = self.state.undo();
        trace!(target: "model.edit", op = "undo", changed, "history");
        self.after_history_step(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.state.redo();
        trace!(target: "model.edit", op = "redo", changed, "history");
        self.after_history_step(changed)
    }

    /// Redo into child `branch` of the current undo tree node. False with linear history.
    pub fn redo_branch(&mut self, branch: usize) -> bool {
        let changed = self.state.redo_branch(branch);
        trace!(target: "model.edit", op = "redo_branch", branch, changed, "history");
        self.after_history_step(changed)
    }

    /// Child node ids of the current undo tree node (empty with linear history).
    pub fn branches(&self) -> Vec<usize> {
        self.state
            .undo_engine()
            .as_tree()
            .map(|t| t.branches().to_vec())
            .unwrap_or_default()
    }

    pub fn go_to_node(&mut self, id: usize) -> Result<bool, UndoTreeError> {
        let changed = self.state.go_to_node(id)?;
        trace!(target: "model.edit", op = "go_to_node", id, changed, "history");
        Ok(self.after_history_step(changed))
    }

    pub fn clear_history(&mut self) {
        self.state.undo_engine_mut().clear();
    }

    fn after_history_step(&mut self, changed: bool) -> bool {
        if changed {
            self.viewport.clamp(&self.state.buffer);
            self.reveal_head();
        }
        changed
    }

    // --- document & viewport ---------------------------------------------

    /// Replace the whole document. Resets the selection, the viewport start
    /// and the undo history.
    pub fn set_text(&mut self, text: &str) -> LineEnding {
        let ending = self.state.set_text(text);
        self.viewport.set_window(0, self.viewport.size(), &self.state.buffer);
        ending
    }

    pub fn scroll(&mut self, delta: isize) {
        self.viewport.scroll(delta, &self.state.buffer);
    }

    pub fn set_window(&mut self, start: usize, size: usize) {
        self.viewport.set_window(start, size, &self.state.buffer);
    }

    /// Change the viewport size and bring the head back into view.
    pub fn resize(&mut self, size: usize) {
        self.viewport.resize(size);
        self.reveal_head();
    }

    fn reveal_head(&mut self) {
        self.viewport.clamp(&self.state.buffer);
        let row = self.state.selection.head().row;
        self.viewport.reveal(row, self.state.options.vertical_margin);
    }
}
