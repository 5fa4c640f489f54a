//! Invertible edit descriptors produced by the buffer primitives.

use crate::{Position, grapheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete,
}

/// One primitive mutation: `text` inserted at, or deleted from, `(row, col)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub row: usize,
    pub col: usize,
    pub text: String,
}

impl EditOp {
    pub fn insert(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            row,
            col,
            text: text.into(),
        }
    }

    pub fn delete(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            row,
            col,
            text: text.into(),
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Position just past `text` when it sits at `start()` (accounts for line breaks).
    pub fn end(&self) -> Position {
        end_of_text(self.start(), &self.text)
    }

    /// The operation that undoes this one.
    pub fn inverse(&self) -> Self {
        let kind = match self.kind {
            EditKind::Insert => EditKind::Delete,
            EditKind::Delete => EditKind::Insert,
        };
        Self {
            kind,
            row: self.row,
            col: self.col,
            text: self.text.clone(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// A single grapheme without a line break: the only shape that may coalesce.
    pub fn is_unit(&self) -> bool {
        !self.text.contains('\n') && grapheme::is_single_cluster(&self.text)
    }
}

/// Where the cursor lands after `text` is placed at `start`.
pub fn end_of_text(start: Position, text: &str) -> Position {
    match text.rsplit_once('\n') {
        Some((head, tail)) => Position::new(
            start.row + head.matches('\n').count() + 1,
            tail.chars().count(),
        ),
        None => Position::new(start.row, start.col + text.chars().count()),
    }
}
