#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_model::{Editor, EditorOptions, Position};
use std::time::{Duration, Instant};

pub const VIEWPORT: usize = 5;

pub fn editor(text: &str) -> Editor {
    Editor::new(text, EditorOptions::default(), VIEWPORT)
}

pub fn branching(text: &str) -> Editor {
    Editor::new(
        text,
        EditorOptions {
            branching: true,
            ..EditorOptions::default()
        },
        VIEWPORT,
    )
}

pub fn at(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

/// Select from `anchor` to `head` (head is the active end).
pub fn select(e: &mut Editor, anchor: Position, head: Position) {
    e.make_cursor();
    e.set_cursor(anchor);
    e.make_selection();
    e.set_cursor(head);
}

/// Deterministic clock for coalescing tests.
pub struct Clock {
    base: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.base + Duration::from_millis(ms)
    }
}

/// Type `text` one char at a time, `step_ms` apart starting at `start_ms`.
pub fn type_slowly(e: &mut Editor, clock: &Clock, text: &str, start_ms: u64, step_ms: u64) {
    for (i, c) in text.chars().enumerate() {
        e.insert_timed(&c.to_string(), clock.at(start_ms + i as u64 * step_ms));
    }
}

pub fn lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
