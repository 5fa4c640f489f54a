//! Word and indentation policy helpers.
//!
//! These operate on a single line and a char column, free of cursor or
//! viewport state. Crossing into adjacent lines is the caller's job.
//!
//! Word movement classifies the run at the cursor into exactly one of three
//! kinds: whitespace, word (letters, digits, underscore), or punctuation,
//! where a punctuation run is a maximal run of the *same* character. `===` is
//! one unit, `=-=` is three.

use unicode_segmentation::UnicodeSegmentation;

/// Character class used by word movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Word,
    Punct(char),
}

pub fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punct(c)
    }
}

pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Grapheme clusters of `line` as `(start column, cluster)`.
fn clusters(line: &str) -> Vec<(usize, &str)> {
    let mut col = 0;
    line.graphemes(true)
        .map(|g| {
            let start = col;
            col += g.chars().count();
            (start, g)
        })
        .collect()
}

/// A cluster takes the class of its base character, so combining marks
/// never split a word.
fn cluster_class(g: &str) -> CharClass {
    g.chars().next().map_or(CharClass::Whitespace, classify)
}

/// Column reached by one forward word step from `col` (which must be before the phantom end).
///
/// On whitespace: skip it, then the word run that directly follows (a
/// punctuation run is left for the next step). On a word run: its end. On
/// punctuation: the end of the repeated-character run. Steps whole grapheme
/// clusters, so the result is always a cluster boundary.
pub fn word_end_forward(line: &str, col: usize) -> usize {
    let cs = clusters(line);
    let n = line.chars().count();
    let Some(mut i) = cs.iter().position(|(s, g)| col < s + g.chars().count()) else {
        return n;
    };
    let class = |i: usize| cs.get(i).map(|(_, g)| cluster_class(g));
    match cluster_class(cs[i].1) {
        CharClass::Whitespace => {
            while class(i) == Some(CharClass::Whitespace) {
                i += 1;
            }
            while class(i) == Some(CharClass::Word) {
                i += 1;
            }
        }
        c => {
            while class(i) == Some(c) {
                i += 1;
            }
        }
    }
    cs.get(i).map_or(n, |(s, _)| *s)
}

/// Mirror of [`word_end_forward`]: classifies the cluster left of `col`.
pub fn word_start_backward(line: &str, col: usize) -> usize {
    let cs = clusters(line);
    let mut i = cs.iter().take_while(|(s, _)| *s < col).count();
    if i == 0 {
        return 0;
    }
    let class = |i: usize| cluster_class(cs[i - 1].1);
    match class(i) {
        CharClass::Whitespace => {
            while i > 0 && class(i) == CharClass::Whitespace {
                i -= 1;
            }
            while i > 0 && class(i) == CharClass::Word {
                i -= 1;
            }
        }
        c => {
            while i > 0 && class(i) == c {
                i -= 1;
            }
        }
    }
    cs.get(i).map_or(0, |(s, _)| *s)
}

/// Column of the first non-whitespace character (the line length when there is none).
pub fn first_non_space(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Number of leading `' '` characters; the indent-eligible prefix.
pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

/// Toggle target for "start of line": the indent column, or column 0 when already there.
pub fn smart_line_start(line: &str, col: usize) -> usize {
    let indent = first_non_space(line);
    if col == indent { 0 } else { indent }
}

/// Spaces to strip around an edge column on a selection's first or last line.
///
/// Returns the removed char range `(start, end)`. At most `width` of the line's
/// leading spaces are removed, taken from the right of the edge first and then
/// from its left. An edge inside the text counts all leading spaces as left of it.
pub fn unindent_edge_range(line: &str, edge_col: usize, width: usize) -> (usize, usize) {
    let leading = leading_spaces(line);
    let total = width.min(leading);
    let edge = edge_col.min(leading);
    let right = total.min(leading - edge);
    let left = total - right;
    (edge - left, edge + right)
}

/// Leading spaces to strip on an interior line: `(0, min(width, leading))`.
pub fn unindent_interior_range(line: &str, width: usize) -> (usize, usize) {
    (0, width.min(leading_spaces(line)))
}
