//! Cursor / selection value.
//!
//! A bare cursor and a range are distinct variants, so "is there a
//! selection" is a match on the variant rather than a comparison of the two
//! ends. A range whose ends coincide is still a selection: it was explicitly
//! begun and will be treated as one by editing operations.

use core_text::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Cursor(Position),
    Range { anchor: Position, active: Position },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Cursor(Position::origin())
    }
}

impl Selection {
    pub fn cursor(pos: Position) -> Self {
        Selection::Cursor(pos)
    }

    pub fn range(anchor: Position, active: Position) -> Self {
        Selection::Range { anchor, active }
    }

    /// Active end, moved by user input.
    pub fn head(&self) -> Position {
        match *self {
            Selection::Cursor(p) => p,
            Selection::Range { active, .. } => active,
        }
    }

    /// Anchor end; equal to the head for a bare cursor.
    pub fn tail(&self) -> Position {
        match *self {
            Selection::Cursor(p) => p,
            Selection::Range { anchor, .. } => anchor,
        }
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Selection::Range { .. })
    }

    /// True when the anchor precedes the head (or for a bare cursor).
    pub fn is_forward(&self) -> bool {
        self.tail() <= self.head()
    }

    /// `(start, end)` in document order; `(head, head)` for a cursor.
    pub fn ordered(&self) -> (Position, Position) {
        let (h, t) = (self.head(), self.tail());
        if t <= h { (t, h) } else { (h, t) }
    }

    /// Move the head, keeping the anchor (or the cursor itself) in sync.
    pub fn set_head(&mut self, pos: Position) {
        match self {
            Selection::Cursor(p) => *p = pos,
            Selection::Range { active, .. } => *active = pos,
        }
    }

    /// Begin a range anchored at the current cursor. No effect on an existing range.
    pub fn make_selection(&mut self) {
        if let Selection::Cursor(p) = *self {
            *self = Selection::Range {
                anchor: p,
                active: p,
            };
        }
    }

    /// Collapse onto the head.
    pub fn make_cursor(&mut self) {
        *self = Selection::Cursor(self.head());
    }

    /// Apply `f` to both ends.
    pub fn map(self, mut f: impl FnMut(Position) -> Position) -> Self {
        match self {
            Selection::Cursor(p) => Selection::Cursor(f(p)),
            Selection::Range { anchor, active } => Selection::Range {
                anchor: f(anchor),
                active: f(active),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn cursor_orders_to_itself() {
        let s = Selection::cursor(p(2, 3));
        assert!(!s.is_selection());
        assert_eq!(s.ordered(), (p(2, 3), p(2, 3)));
        assert_eq!(s.head(), s.tail());
    }

    #[test]
    fn backward_range_is_reordered() {
        let s = Selection::range(p(4, 1), p(1, 7));
        assert!(s.is_selection());
        assert!(!s.is_forward());
        assert_eq!(s.ordered(), (p(1, 7), p(4, 1)));
    }

    #[test]
    fn same_row_orders_by_column() {
        let s = Selection::range(p(0, 5), p(0, 2));
        assert_eq!(s.ordered(), (p(0, 2), p(0, 5)));
    }

    #[test]
    fn make_selection_then_cursor() {
        let mut s = Selection::cursor(p(1, 1));
        s.make_selection();
        assert!(s.is_selection());
        assert_eq!(s.ordered(), (p(1, 1), p(1, 1)));
        s.set_head(p(3, 0));
        assert_eq!(s.tail(), p(1, 1));
        s.make_cursor();
        assert_eq!(s, Selection::cursor(p(3, 0)));
    }

    #[test]
    fn make_selection_keeps_existing_anchor() {
        let mut s = Selection::range(p(0, 0), p(0, 4));
        s.make_selection();
        assert_eq!(s.tail(), p(0, 0));
        assert_eq!(s.head(), p(0, 4));
    }

    #[test]
    fn set_head_moves_bare_cursor() {
        let mut s = Selection::default();
        s.set_head(p(0, 9));
        assert_eq!(s, Selection::cursor(p(0, 9)));
    }

    proptest::proptest! {
        #[test]
        fn ordered_is_sorted_and_keeps_both_ends(ar in 0usize..50, ac in 0usize..50, hr in 0usize..50, hc in 0usize..50) {
            let s = Selection::range(p(ar, ac), p(hr, hc));
            let (start, end) = s.ordered();
            proptest::prop_assert!(start <= end);
            proptest::prop_assert_eq!(s.is_forward(), start == s.tail());
            let mut ends = [s.tail(), s.head()];
            ends.sort();
            proptest::prop_assert_eq!(ends, [start, end]);
        }
    }
}
