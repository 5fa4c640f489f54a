//! Insert / delete / new line policy.

mod common;

use common::*;
use core_model::{LineEnding, Selection};
use pretty_assertions::assert_eq;

#[test]
fn empty_document_is_one_empty_line() {
    let e = editor("");
    assert_eq!(e.buffer().line_count(), 1);
    assert_eq!(e.visible_lines(), vec![String::new()]);
}

#[test]
fn trailing_newline_makes_an_empty_last_line() {
    let e = editor("a\n");
    assert_eq!(e.buffer().lines(), lines("a\n"));
    assert_eq!(e.buffer().last_index(), 1);
}

#[test]
fn crlf_input_is_stored_as_lf() {
    let e = editor("one\r\ntwo\r\n");
    assert_eq!(e.text(), "one\ntwo\n");
    assert_eq!(e.line_ending(), LineEnding::Crlf);
}

#[test]
fn multi_line_insert_splits_and_rejoins() {
    let mut e = editor("start end");
    e.set_cursor(at(0, 6));
    e.insert("one\ntwo\nthree ");
    assert_eq!(e.buffer().lines(), lines("start one\ntwo\nthree end"));
    assert_eq!(e.head(), at(2, 6));
    e.undo();
    assert_eq!(e.text(), "start end");
}

#[test]
fn new_line_moves_to_column_zero_of_next_row() {
    let mut e = editor("abcd");
    e.set_cursor(at(0, 2));
    e.new_line();
    assert_eq!(e.buffer().lines(), lines("ab\ncd"));
    assert_eq!(e.head(), at(1, 0));
    assert_eq!(e.goal_col(), 0);
}

#[test]
fn new_line_scrolls_viewport() {
    let mut e = editor("0\n1\n2\n3\n4");
    e.move_document_end();
    assert_eq!(e.viewport().start(), 0);
    e.new_line();
    assert_eq!(e.head(), at(5, 0));
    assert_eq!(e.viewport().start(), 1);
}

#[test]
fn backspace_at_line_start_joins_with_previous() {
    let mut e = editor("first\nsecond");
    e.set_cursor(at(1, 0));
    assert!(e.delete());
    assert_eq!(e.text(), "firstsecond");
    assert_eq!(e.head(), at(0, 5));
}

#[test]
fn backspace_on_backward_selection_deletes_range() {
    let mut e = editor("one two three");
    select(&mut e, at(0, 7), at(0, 3));
    assert!(e.delete());
    assert_eq!(e.text(), "one three");
    assert_eq!(e.selection(), Selection::cursor(at(0, 3)));
}

#[test]
fn multi_line_selection_replace() {
    let mut e = editor("alpha\nbeta\ngamma");
    select(&mut e, at(0, 2), at(2, 3));
    e.insert("X");
    assert_eq!(e.text(), "alXma");
    assert_eq!(e.head(), at(0, 3));
    e.undo();
    assert_eq!(e.text(), "alpha\nbeta\ngamma");
    assert_eq!(e.ordered(), (at(0, 2), at(2, 3)));
}

#[test]
fn deleting_lines_pulls_viewport_back() {
    let mut e = editor("0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
    e.set_window(8, 5);
    select(&mut e, at(1, 0), at(9, 1));
    e.delete();
    assert_eq!(e.buffer().line_count(), 2);
    assert!(e.viewport().start() <= e.buffer().last_index());
    assert!(e.viewport().contains(e.head().row));
}

#[test]
fn selected_text_spans_lines() {
    let mut e = editor("ab\ncd\nef");
    select(&mut e, at(2, 1), at(0, 1));
    assert_eq!(e.selected_text(), "b\ncd\ne");
    assert_eq!(e.selected_lines(), lines("ab\ncd\nef"));
}

#[test]
fn delete_forward_removes_cluster_at_head() {
    let mut e = editor("x👍🏽y");
    e.set_cursor(at(0, 1));
    assert!(e.delete_forward());
    assert_eq!(e.text(), "xy");
    assert_eq!(e.head(), at(0, 1));
}
