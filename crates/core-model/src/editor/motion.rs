//! Head movement.
//!
//! Motions move the head only; a range keeps its anchor. Callers wanting a
//! plain cursor move call `make_cursor()` first. Horizontal motions update the
//! goal column, vertical ones (rows and pages) read it.
//!
//! Columns step by grapheme cluster, so a cursor never lands inside a
//! combining sequence or a multi-codepoint emoji.

use core_text::{Position, grapheme, motion};
use tracing::trace;

use super::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    PageUp,
    PageDown,
}

impl Motion {
    fn is_vertical(self) -> bool {
        matches!(
            self,
            Motion::Up | Motion::Down | Motion::PageUp | Motion::PageDown
        )
    }
}

impl Editor {
    /// Apply `kind` to the head. Returns true when the head moved.
    pub fn apply_motion(&mut self, kind: Motion) -> bool {
        let before = self.head();
        let target = match kind {
            Motion::Left => self.col_left(before),
            Motion::Right => self.col_right(before),
            Motion::Up => self.row_step(before, -1),
            Motion::Down => self.row_step(before, 1),
            Motion::WordForward => self.word_forward(before),
            Motion::WordBackward => self.word_backward(before),
            Motion::LineStart => {
                let line = self.state.buffer.line(before.row);
                Some(Position::new(
                    before.row,
                    motion::smart_line_start(&line, before.col),
                ))
            }
            Motion::LineEnd => Some(Position::new(
                before.row,
                self.state.buffer.line_len(before.row),
            )),
            Motion::DocumentStart => Some(Position::origin()),
            Motion::DocumentEnd => {
                let last = self.state.buffer.last_index();
                Some(Position::new(last, self.state.buffer.line_len(last)))
            }
            Motion::PageUp => self.page_step(before, -1),
            Motion::PageDown => self.page_step(before, 1),
        };
        let Some(target) = target else {
            return false;
        };
        if !kind.is_vertical() {
            self.state.goal_col = target.col;
        }
        if target == before {
            return false;
        }
        self.state.selection.set_head(target);
        self.reveal_head();
        trace!(target: "model.motion", motion = ?kind, row = before.row, col = before.col, to_row = target.row, to_col = target.col, "motion");
        true
    }

    /// One grapheme left (`delta < 0`) or right (`delta > 0`), wrapping across lines.
    pub fn move_col(&mut self, delta: isize) -> bool {
        match delta.signum() {
            -1 => self.apply_motion(Motion::Left),
            1 => self.apply_motion(Motion::Right),
            _ => false,
        }
    }

    /// One row up or down, landing on the goal column (clamped to the line).
    pub fn move_row(&mut self, delta: isize) -> bool {
        match delta.signum() {
            -1 => self.apply_motion(Motion::Up),
            1 => self.apply_motion(Motion::Down),
            _ => false,
        }
    }

    pub fn move_word(&mut self) -> bool {
        self.apply_motion(Motion::WordForward)
    }

    pub fn move_back_word(&mut self) -> bool {
        self.apply_motion(Motion::WordBackward)
    }

    /// Toggle between the first non-space column and column 0.
    pub fn move_start_of_line(&mut self) -> bool {
        self.apply_motion(Motion::LineStart)
    }

    pub fn move_end_of_line(&mut self) -> bool {
        self.apply_motion(Motion::LineEnd)
    }

    pub fn move_document_start(&mut self) -> bool {
        self.apply_motion(Motion::DocumentStart)
    }

    pub fn move_document_end(&mut self) -> bool {
        self.apply_motion(Motion::DocumentEnd)
    }

    /// Move a viewport height up or down and scroll by the same amount.
    pub fn move_page(&mut self, delta: isize) -> bool {
        match delta.signum() {
            -1 => self.apply_motion(Motion::PageUp),
            1 => self.apply_motion(Motion::PageDown),
            _ => false,
        }
    }

    fn col_left(&self, p: Position) -> Option<Position> {
        if p.col > 0 {
            let line = self.state.buffer.line(p.row);
            Some(Position::new(p.row, grapheme::prev_boundary(&line, p.col)))
        } else if p.row > 0 {
            Some(Position::new(p.row - 1, self.state.buffer.line_len(p.row - 1)))
        } else {
            None
        }
    }

    fn col_right(&self, p: Position) -> Option<Position> {
        let len = self.state.buffer.line_len(p.row);
        if p.col < len {
            let line = self.state.buffer.line(p.row);
            Some(Position::new(p.row, grapheme::next_boundary(&line, p.col)))
        } else if p.row < self.state.buffer.last_index() {
            Some(Position::new(p.row + 1, 0))
        } else {
            None
        }
    }

    fn row_step(&self, p: Position, delta: isize) -> Option<Position> {
        let row = p.row.checked_add_signed(delta)?;
        if row > self.state.buffer.last_index() {
            return None;
        }
        Some(self.at_goal(row))
    }

    fn page_step(&mut self, p: Position, delta: isize) -> Option<Position> {
        let last = self.state.buffer.last_index();
        let page = self.viewport.size().max(1);
        let row = if delta < 0 {
            p.row.saturating_sub(page)
        } else {
            (p.row + page).min(last)
        };
        if row == p.row {
            return None;
        }
        self.viewport
            .scroll(delta.signum() * page as isize, &self.state.buffer);
        Some(self.at_goal(row))
    }

    /// The goal column on `row`, clamped to the line and pulled back to a cluster boundary.
    fn at_goal(&self, row: usize) -> Position {
        let line = self.state.buffer.line(row);
        Position::new(row, grapheme::floor_boundary(&line, self.state.goal_col))
    }

    fn word_forward(&self, p: Position) -> Option<Position> {
        let line = self.state.buffer.line(p.row);
        if p.col < line.chars().count() {
            return Some(Position::new(p.row, motion::word_end_forward(&line, p.col)));
        }
        (p.row < self.state.buffer.last_index()).then(|| Position::new(p.row + 1, 0))
    }

    fn word_backward(&self, p: Position) -> Option<Position> {
        if p.col > 0 {
            let line = self.state.buffer.line(p.row);
            return Some(Position::new(p.row, motion::word_start_backward(&line, p.col)));
        }
        (p.row > 0).then(|| Position::new(p.row - 1, self.state.buffer.line_len(p.row - 1)))
    }
}
