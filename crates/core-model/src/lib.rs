//! High-level editing model: an [`Editor`] owning one buffer, its selection,
//! a [`Viewport`] and the undo engine.
//!
//! This is the surface a host drives. An input layer translates keys and
//! pointer events into calls such as [`Editor::insert`], [`Editor::move_word`]
//! or [`Editor::undo`]; after each call a rendering layer reads
//! [`Editor::visible_lines`] and [`Editor::ordered`] and repaints. The model
//! never paints and never blocks.
//!
//! Data flow for an edit:
//! 1. The operation computes the buffer primitives it needs (`insert_at`,
//!    `delete_at`) and runs them on `core_text::Buffer`.
//! 2. Each returned `EditOp` is recorded with the selection before and after
//!    into the undo engine (`core_state::History` or `core_state::UndoTree`),
//!    which may coalesce it into the previous step.
//! 3. The viewport scrolls the minimum needed to keep the head visible.
//!
//! Columns everywhere are `char` indices within a line; cursor stepping and
//! deletion move by grapheme cluster.

mod editor;
mod viewport;

pub use editor::{Editor, Motion};
pub use viewport::Viewport;

pub use core_state::{EditorOptions, Selection};
pub use core_text::{LineEnding, Position};
