//! Vertical window over the buffer's lines.
//!
//! The viewport only knows `start` and `size`; the last visible row is derived
//! from the buffer on demand so it can never point past the document.
//! Invariant: `start <= buffer.last_index()` after every call that takes the
//! buffer.

use core_text::Buffer;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    start: usize,
    size: usize,
}

impl Viewport {
    pub fn new(size: usize) -> Self {
        Self { start: 0, size }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Last visible row: `min(start + size - 1, last_index)`, or `start` for an empty viewport.
    pub fn end(&self, buffer: &Buffer) -> usize {
        if self.size == 0 {
            return self.start;
        }
        (self.start + self.size - 1).min(buffer.last_index())
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.start + self.size
    }

    /// The visible lines `start..=end`. Empty for a zero-size viewport.
    pub fn lines(&self, buffer: &Buffer) -> Vec<String> {
        if self.size == 0 {
            return Vec::new();
        }
        buffer.lines_in(self.start..self.end(buffer) + 1)
    }

    /// Shift the window by `delta` rows, clamped to `[0, last_index]`.
    pub fn scroll(&mut self, delta: isize, buffer: &Buffer) {
        let target = self.start.saturating_add_signed(delta);
        self.start = target.min(buffer.last_index());
        trace!(target: "model.viewport", delta, start = self.start, "scroll");
    }

    pub fn set_window(&mut self, start: usize, size: usize, buffer: &Buffer) {
        self.size = size;
        self.start = start.min(buffer.last_index());
        trace!(target: "model.viewport", start = self.start, size, "set_window");
    }

    /// Change the size, keeping `start`.
    pub fn resize(&mut self, size: usize) {
        self.size = size;
    }

    /// Pull `start` back into range after the document shrank.
    pub fn clamp(&mut self, buffer: &Buffer) {
        self.start = self.start.min(buffer.last_index());
    }

    /// Scroll the minimum needed for `row` to be visible with `margin` rows of
    /// context above and below. With no margin a row above the window becomes
    /// the first visible row and a row below it the last; nothing is centred.
    /// Returns true when `start` changed.
    pub fn reveal(&mut self, row: usize, margin: usize) -> bool {
        if self.size == 0 {
            return false;
        }
        // At least one row must sit between the two context bands.
        let margin = margin.min((self.size - 1) / 2);
        let min_start = (row + margin + 1).saturating_sub(self.size);
        let max_start = row.saturating_sub(margin);
        let start = self.start.clamp(min_start, max_start);
        if start == self.start {
            return false;
        }
        trace!(target: "model.viewport", row, margin, from = self.start, to = start, "reveal");
        self.start = start;
        true
    }
}
