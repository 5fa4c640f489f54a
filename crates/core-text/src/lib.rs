//! Rope-backed line buffer: the single source of truth for document content.
//!
//! Rows are line indices, columns count `char`s within a line. The rope is
//! built with LF as the only line break, so `"a\n"` is two lines (`"a"` and
//! `""`) and an empty document is exactly one empty line.
//!
//! Mutation primitives return an [`EditOp`] describing what they did. The
//! undo engines consume those descriptors and replay their inverse, which is
//! why `delete_at` must be the exact inverse of `insert_at`.

use ropey::Rope;
use thiserror::Error;
use tracing::debug;

pub mod line_ending;
pub mod motion;
pub mod op;
pub mod segment;

pub use line_ending::{LfNormalizer, LineEnding, NormalizedText, normalize_line_endings};
pub use op::{EditKind, EditOp};

/// A position inside a buffer expressed as (row, char column within that row).
///
/// Ordering is document order: row first, then column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
    pub fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
    /// Clamp into the valid range of `buf` (row to the last line, column to the phantom end).
    pub fn clamp_to(&mut self, buf: &Buffer) {
        if self.row > buf.last_index() {
            self.row = buf.last_index();
        }
        let max_len = buf.line_len(self.row);
        if self.col > max_len {
            self.col = max_len;
        }
    }
}

/// Invalid input to a buffer primitive. These indicate a caller that is out of
/// sync with the buffer; the unchecked primitives panic with this message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("row {row} out of range (last index {last})")]
    RowOutOfRange { row: usize, last: usize },
    #[error("column {col} out of range on row {row} (line length {len})")]
    ColOutOfRange { row: usize, col: usize, len: usize },
    #[error("text at {row}:{col} does not match the text to delete")]
    DeleteMismatch { row: usize, col: usize },
    #[error("line range {start}..{end} out of range ({count} lines)")]
    LineRangeOutOfRange {
        start: usize,
        end: usize,
        count: usize,
    },
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
    /// Line break state carried between `set_text` and following `append`s.
    loader: LfNormalizer,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice (line endings normalized to LF).
    pub fn new(content: &str) -> Self {
        let mut buf = Self::default();
        buf.set_text(content);
        buf
    }

    /// Replace the whole document. Returns the line ending style detected in `content`.
    pub fn set_text(&mut self, content: &str) -> LineEnding {
        self.loader = LfNormalizer::default();
        self.rope = Rope::from_str(&self.loader.push(content));
        self.line_ending = self.loader.ending();
        debug!(target: "text.buffer", lines = self.line_count(), chars = self.len_chars(), line_ending = ?self.line_ending, mixed = self.loader.is_mixed(), "set_text");
        self.line_ending
    }

    /// Full document text with LF line endings.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Line ending style detected on the last wholesale load.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Total number of lines in the buffer (never zero).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn last_index(&self) -> usize {
        self.line_count() - 1
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Content of line `row` without its trailing newline. Panics when `row` is out of range.
    pub fn line(&self, row: usize) -> String {
        let mut s = self.rope.line(row).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Char length of a line (excluding the newline). Zero for rows past the end.
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.line_count() {
            return 0;
        }
        let line = self.rope.line(row);
        let n = line.len_chars();
        if n > 0 && line.char(n - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    /// All lines in document order.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|row| self.line(row)).collect()
    }

    /// Lines in `range`, clamped to the buffer.
    pub fn lines_in(&self, range: std::ops::Range<usize>) -> Vec<String> {
        let end = range.end.min(self.line_count());
        (range.start.min(end)..end).map(|row| self.line(row)).collect()
    }

    /// Text between two positions (`start <= end`, both valid).
    pub fn slice(&self, start: Position, end: Position) -> String {
        let a = self.char_index(start);
        let b = self.char_index(end);
        debug_assert!(a <= b, "slice bounds out of order");
        self.rope.slice(a..b).to_string()
    }

    fn char_index(&self, pos: Position) -> usize {
        self.rope.line_to_char(pos.row) + pos.col
    }

    fn check_position(&self, row: usize, col: usize) -> Result<(), BufferError> {
        let last = self.last_index();
        if row > last {
            return Err(BufferError::RowOutOfRange { row, last });
        }
        let len = self.line_len(row);
        if col > len {
            return Err(BufferError::ColOutOfRange { row, col, len });
        }
        Ok(())
    }

    /// Insert `text` (which may contain line breaks) at `(row, col)`.
    pub fn checked_insert_at(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
    ) -> Result<EditOp, BufferError> {
        self.check_position(row, col)?;
        self.loader.break_run();
        let idx = self.char_index(Position::new(row, col));
        self.rope.insert(idx, text);
        Ok(EditOp::insert(row, col, text))
    }

    /// Remove `text` starting at `(row, col)`. The text must match the buffer exactly.
    pub fn checked_delete_at(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
    ) -> Result<EditOp, BufferError> {
        self.check_position(row, col)?;
        let start = self.char_index(Position::new(row, col));
        let end = start + text.chars().count();
        if end > self.len_chars() || !self.rope.slice(start..end).chars().eq(text.chars()) {
            return Err(BufferError::DeleteMismatch { row, col });
        }
        self.rope.remove(start..end);
        self.loader.break_run();
        Ok(EditOp::delete(row, col, text))
    }

    /// Panicking form of [`Buffer::checked_insert_at`].
    pub fn insert_at(&mut self, row: usize, col: usize, text: &str) -> EditOp {
        match self.checked_insert_at(row, col, text) {
            Ok(op) => op,
            Err(e) => panic!("insert_at: {e}"),
        }
    }

    /// Panicking form of [`Buffer::checked_delete_at`].
    pub fn delete_at(&mut self, row: usize, col: usize, text: &str) -> EditOp {
        match self.checked_delete_at(row, col, text) {
            Ok(op) => op,
            Err(e) => panic!("delete_at: {e}"),
        }
    }

    /// Replay an operation descriptor.
    pub fn apply(&mut self, op: &EditOp) {
        match op.kind {
            EditKind::Insert => {
                self.insert_at(op.row, op.col, &op.text);
            }
            EditKind::Delete => {
                self.delete_at(op.row, op.col, &op.text);
            }
        }
    }

    /// Replace `remove_count` whole lines starting at `index` with `new_lines`.
    /// `index == line_count()` appends after the last line. Returns the removed lines.
    pub fn checked_splice_lines<S: AsRef<str>>(
        &mut self,
        index: usize,
        new_lines: &[S],
        remove_count: usize,
    ) -> Result<Vec<String>, BufferError> {
        let count = self.line_count();
        let end = index + remove_count;
        if index > count || end > count {
            return Err(BufferError::LineRangeOutOfRange {
                start: index,
                end,
                count,
            });
        }
        let removed = self.lines_in(index..end);
        self.loader.break_run();
        let joined = new_lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        if end < count {
            let start = self.rope.line_to_char(index);
            let stop = self.rope.line_to_char(end);
            self.rope.remove(start..stop);
            if !new_lines.is_empty() {
                self.rope.insert(start, &format!("{joined}\n"));
            }
        } else if index < count {
            // The removed range runs to the end of the document.
            let total = self.len_chars();
            if new_lines.is_empty() {
                let start = if index == 0 {
                    0
                } else {
                    // Also drop the newline that terminated the previous line.
                    self.rope.line_to_char(index) - 1
                };
                self.rope.remove(start..total);
            } else {
                let start = self.rope.line_to_char(index);
                self.rope.remove(start..total);
                self.rope.insert(start, &joined);
            }
        } else if !new_lines.is_empty() {
            let total = self.len_chars();
            self.rope.insert(total, &format!("\n{joined}"));
        }
        debug!(target: "text.buffer", index, inserted = new_lines.len(), removed = removed.len(), lines = self.line_count(), "splice_lines");
        Ok(removed)
    }

    /// Panicking form of [`Buffer::checked_splice_lines`].
    pub fn splice_lines<S: AsRef<str>>(
        &mut self,
        index: usize,
        new_lines: &[S],
        remove_count: usize,
    ) -> Vec<String> {
        match self.checked_splice_lines(index, new_lines, remove_count) {
            Ok(removed) => removed,
            Err(e) => panic!("splice_lines: {e}"),
        }
    }

    /// Remove line `index`. Deleting the only line leaves one empty line.
    pub fn delete_line(&mut self, index: usize) -> String {
        self.splice_lines::<&str>(index, &[], 1)
            .pop()
            .unwrap_or_default()
    }

    /// Append raw text at the end of the document (bulk loading in chunks).
    /// A CRLF split between two chunks still counts as one line break, and
    /// the detected line ending covers every chunk loaded since `set_text`.
    pub fn append(&mut self, text: &str) {
        let lf = self.loader.push(text);
        let total = self.len_chars();
        self.rope.insert(total, &lf);
        self.line_ending = self.loader.ending();
    }
}

/// Grapheme helpers over char columns. Pure functions operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;

    /// Next grapheme boundary after `col` (returns the line's char length at or beyond the end).
    pub fn next_boundary(line: &str, col: usize) -> usize {
        let mut c = 0;
        for g in line.graphemes(true) {
            c += g.chars().count();
            if c > col {
                return c;
            }
        }
        c
    }

    /// Previous grapheme boundary before `col` (0 when already at the first boundary).
    pub fn prev_boundary(line: &str, col: usize) -> usize {
        let mut c = 0;
        let mut last = 0;
        for g in line.graphemes(true) {
            if c >= col {
                break;
            }
            last = c;
            c += g.chars().count();
        }
        last
    }

    /// Nearest boundary at or before `col` (the line's char length when `col` is past the end).
    pub fn floor_boundary(line: &str, col: usize) -> usize {
        let mut c = 0;
        for g in line.graphemes(true) {
            let next = c + g.chars().count();
            if next > col {
                return c;
            }
            c = next;
        }
        c
    }

    /// True when `text` is exactly one grapheme cluster.
    pub fn is_single_cluster(text: &str) -> bool {
        let mut it = text.graphemes(true);
        it.next().is_some() && it.next().is_none()
    }
}
