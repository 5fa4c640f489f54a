//! Branching undo: every edit is a node, nothing is discarded.
//!
//! Node 0 is the root (the document as loaded). Each other node holds the ops
//! that take its parent's document to its own. Undo walks to the parent, redo
//! walks to a child, and `go_to_node` combines both through the lowest common
//! ancestor of the current and target nodes.

use core_text::{Buffer, EditOp};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

use crate::Selection;
use crate::undo::{CoalescePolicy, EditRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoTreeError {
    #[error("undo tree has no node {id} ({len} nodes)")]
    UnknownNode { id: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoNode {
    pub id: usize,
    /// `None` only for the root.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Applied in order to the parent's document.
    pub ops: Vec<EditOp>,
    pub cursor_before: Selection,
    pub cursor_after: Selection,
    /// Child most recently visited; redo without a branch index resumes it.
    pub active_child: Option<usize>,
    coalescable: bool,
    last_at: Option<Instant>,
}

impl UndoNode {
    fn root() -> Self {
        Self {
            id: 0,
            parent: None,
            children: Vec::new(),
            ops: Vec::new(),
            cursor_before: Selection::default(),
            cursor_after: Selection::default(),
            active_child: None,
            coalescable: false,
            last_at: None,
        }
    }
}

/// Read-only snapshot of the tree for display.
#[derive(Debug, Clone, Copy)]
pub struct TreeView<'a> {
    pub nodes: &'a [UndoNode],
    pub current: usize,
}

#[derive(Debug, Clone)]
pub struct UndoTree {
    nodes: Vec<UndoNode>,
    current: usize,
    policy: CoalescePolicy,
    sealed: bool,
}

impl Default for UndoTree {
    fn default() -> Self {
        Self::new(CoalescePolicy::default())
    }
}

impl UndoTree {
    pub fn new(policy: CoalescePolicy) -> Self {
        Self {
            nodes: vec![UndoNode::root()],
            current: 0,
            policy,
            sealed: false,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of nodes, counting the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether any edit was recorded. The root alone means none.
    pub fn has_edits(&self) -> bool {
        self.nodes.len() > 1
    }

    pub fn node(&self, id: usize) -> Option<&UndoNode> {
        self.nodes.get(id)
    }

    pub fn tree(&self) -> TreeView<'_> {
        TreeView {
            nodes: &self.nodes,
            current: self.current,
        }
    }

    /// Children of the current node; redo branch indices index into this.
    pub fn branches(&self) -> &[usize] {
        &self.nodes[self.current].children
    }

    pub fn can_undo(&self) -> bool {
        self.current != 0
    }

    pub fn can_redo(&self) -> bool {
        !self.nodes[self.current].children.is_empty()
    }

    pub fn record(&mut self, record: EditRecord, now: Instant) {
        let sealed = std::mem::take(&mut self.sealed);
        let cur = self.current;
        if cur != 0 && record.combined {
            let node = &mut self.nodes[cur];
            node.ops.push(record.op);
            node.cursor_after = record.cursor_after;
            node.coalescable = false;
            node.last_at = Some(now);
            trace!(target: "state.tree", node = cur, ops = node.ops.len(), "combine");
            return;
        }
        if cur != 0 && !sealed && record.mergeable {
            let policy = self.policy;
            let node = &mut self.nodes[cur];
            if node.children.is_empty()
                && node.coalescable
                && node.ops.len() == 1
                && let Some(last_at) = node.last_at
                && policy.try_merge(&mut node.ops[0], last_at, &record.op, now)
            {
                node.cursor_after = record.cursor_after;
                node.last_at = Some(now);
                trace!(target: "state.tree", node = cur, "coalesce");
                return;
            }
        }
        let id = self.nodes.len();
        let coalescable = record.accepts_merges();
        self.nodes.push(UndoNode {
            id,
            parent: Some(cur),
            children: Vec::new(),
            ops: vec![record.op],
            cursor_before: record.cursor_before,
            cursor_after: record.cursor_after,
            active_child: None,
            coalescable,
            last_at: Some(now),
        });
        let parent = &mut self.nodes[cur];
        parent.children.push(id);
        parent.active_child = Some(id);
        if parent.children.len() > 1 {
            debug!(target: "state.tree", parent = cur, node = id, branches = parent.children.len(), "branch");
        }
        self.current = id;
        trace!(target: "state.tree", node = id, parent = cur, "push_node");
    }

    /// Move to the parent. Returns the cursor from before the undone node.
    pub fn undo(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        let cursor = self.step_up(buffer)?;
        self.sealed = true;
        trace!(target: "state.tree", node = self.current, "undo");
        Some(cursor)
    }

    /// Move to a child: `branch` indexes [`UndoTree::branches`]; `None`
    /// resumes the active child, falling back to the first.
    pub fn redo(&mut self, buffer: &mut Buffer, branch: Option<usize>) -> Option<Selection> {
        let node = &self.nodes[self.current];
        let child = match branch {
            Some(i) => node.children.get(i).copied(),
            None => node.active_child.or_else(|| node.children.first().copied()),
        }?;
        let cursor = self.step_down(buffer, child);
        self.sealed = true;
        trace!(target: "state.tree", node = child, branch = ?branch, "redo");
        Some(cursor)
    }

    /// Move to any node through the lowest common ancestor. `Ok(None)` when
    /// already there.
    pub fn go_to_node(
        &mut self,
        buffer: &mut Buffer,
        id: usize,
    ) -> Result<Option<Selection>, UndoTreeError> {
        if id >= self.nodes.len() {
            return Err(UndoTreeError::UnknownNode {
                id,
                len: self.nodes.len(),
            });
        }
        if id == self.current {
            return Ok(None);
        }
        let from = self.current;
        let lca = self.lowest_common_ancestor(from, id);
        let down = self.path_up(id, lca);
        let mut cursor = None;
        while self.current != lca {
            cursor = self.step_up(buffer);
        }
        for &node in down.iter().rev() {
            cursor = Some(self.step_down(buffer, node));
        }
        self.sealed = true;
        debug!(target: "state.tree", from, to = id, lca, down = down.len(), "jump");
        Ok(cursor)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(UndoNode::root());
        self.current = 0;
        self.sealed = false;
        debug!(target: "state.tree", "tree_cleared");
    }

    fn step_up(&mut self, buffer: &mut Buffer) -> Option<Selection> {
        let id = self.current;
        let parent = self.nodes[id].parent?;
        for op in self.nodes[id].ops.iter().rev() {
            buffer.apply(&op.inverse());
        }
        self.nodes[parent].active_child = Some(id);
        self.current = parent;
        Some(self.nodes[id].cursor_before)
    }

    fn step_down(&mut self, buffer: &mut Buffer, child: usize) -> Selection {
        for op in &self.nodes[child].ops {
            buffer.apply(op);
        }
        self.nodes[self.current].active_child = Some(child);
        self.current = child;
        self.nodes[child].cursor_after
    }

    fn depth(&self, mut n: usize) -> usize {
        let mut d = 0;
        while let Some(p) = self.nodes[n].parent {
            n = p;
            d += 1;
        }
        d
    }

    fn lowest_common_ancestor(&self, mut a: usize, mut b: usize) -> usize {
        let (mut da, mut db) = (self.depth(a), self.depth(b));
        while da > db {
            a = self.nodes[a].parent.unwrap_or(0);
            da -= 1;
        }
        while db > da {
            b = self.nodes[b].parent.unwrap_or(0);
            db -= 1;
        }
        while a != b {
            a = self.nodes[a].parent.unwrap_or(0);
            b = self.nodes[b].parent.unwrap_or(0);
        }
        a
    }

    /// Nodes from `n` up to, not including, its ancestor `a`.
    fn path_up(&self, mut n: usize, a: usize) -> Vec<usize> {
        let mut path = Vec::new();
        while n != a {
            path.push(n);
            n = self.nodes[n].parent.unwrap_or(0);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Position;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn cur(col: usize) -> Selection {
        Selection::cursor(Position::new(0, col))
    }

    fn type_at(t: &mut UndoTree, b: &mut Buffer, col: usize, text: &str, now: Instant) {
        let op = b.insert_at(0, col, text);
        let end = op.end().col;
        t.record(EditRecord::new(op, cur(col), cur(end)), now);
    }

    #[test]
    fn new_edit_after_undo_opens_a_branch() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        let now = Instant::now();
        type_at(&mut t, &mut b, 0, "A", now);
        t.undo(&mut b);
        type_at(&mut t, &mut b, 0, "B", now);
        assert_eq!(b.text(), "B");

        t.undo(&mut b);
        assert_eq!(t.current(), 0);
        assert_eq!(t.branches(), &[1, 2]);

        t.redo(&mut b, Some(0));
        assert_eq!(b.text(), "A");
        t.undo(&mut b);
        t.redo(&mut b, Some(1));
        assert_eq!(b.text(), "B");
    }

    #[test]
    fn redo_follows_active_child() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        let now = Instant::now();
        type_at(&mut t, &mut b, 0, "A", now);
        t.undo(&mut b);
        type_at(&mut t, &mut b, 0, "B", now);
        t.undo(&mut b);
        t.redo(&mut b, Some(0));
        t.undo(&mut b);
        // Last visited branch wins over the newest one.
        assert_eq!(t.redo(&mut b, None), Some(cur(1)));
        assert_eq!(b.text(), "A");
    }

    #[test]
    fn redo_out_of_range_is_noop() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        type_at(&mut t, &mut b, 0, "A", Instant::now());
        t.undo(&mut b);
        assert_eq!(t.redo(&mut b, Some(3)), None);
        assert_eq!(b.text(), "");
        assert_eq!(t.undo(&mut b), None);
    }

    #[test]
    fn coalesces_only_at_leaf() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        let now = Instant::now();
        type_at(&mut t, &mut b, 0, "a", now);
        type_at(&mut t, &mut b, 1, "b", now + Duration::from_millis(50));
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.node(1).map(|n| n.ops.clone()), Some(vec![EditOp::insert(0, 0, "ab")]));
        t.undo(&mut b);
        t.redo(&mut b, None);
        // Sealed by the redo even though the node is still a leaf.
        type_at(&mut t, &mut b, 2, "c", now + Duration::from_millis(60));
        assert_eq!(t.node_count(), 3);
    }

    #[test]
    fn combined_record_joins_current_node() {
        let mut b = Buffer::new("Hello");
        let mut t = UndoTree::default();
        let now = Instant::now();
        let sel = Selection::range(Position::new(0, 0), Position::new(0, 5));
        let del = b.delete_at(0, 0, "Hello");
        t.record(EditRecord::new(del, sel, cur(0)), now);
        let ins = b.insert_at(0, 0, "Hi");
        t.record(EditRecord::new(ins, sel, cur(2)).combined(true), now);
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.undo(&mut b), Some(sel));
        assert_eq!(b.text(), "Hello");
        assert_eq!(t.redo(&mut b, None), Some(cur(2)));
        assert_eq!(b.text(), "Hi");
    }

    #[test]
    fn go_to_node_crosses_branches() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        let now = Instant::now();
        let later = |ms| now + Duration::from_millis(ms);
        type_at(&mut t, &mut b, 0, "x", now); // 1
        type_at(&mut t, &mut b, 1, "yy", later(10)); // 2
        t.undo(&mut b);
        type_at(&mut t, &mut b, 1, "zz", later(20)); // 3
        type_at(&mut t, &mut b, 3, "!", later(30)); // 4
        assert_eq!(b.text(), "xzz!");

        assert_eq!(t.go_to_node(&mut b, 2), Ok(Some(cur(3))));
        assert_eq!(b.text(), "xyy");
        assert_eq!(t.current(), 2);

        assert_eq!(t.go_to_node(&mut b, 4), Ok(Some(cur(4))));
        assert_eq!(b.text(), "xzz!");

        // Straight up to an ancestor restores the cursor before its child.
        assert_eq!(t.go_to_node(&mut b, 1), Ok(Some(cur(1))));
        assert_eq!(b.text(), "x");
        // The path just walked is remembered for plain redo.
        t.redo(&mut b, None);
        assert_eq!(b.text(), "xzz");

        assert_eq!(t.go_to_node(&mut b, 0), Ok(Some(cur(0))));
        assert_eq!(b.text(), "");
        assert_eq!(t.go_to_node(&mut b, 0), Ok(None));
    }

    #[test]
    fn go_to_unknown_node_errors() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        assert_eq!(
            t.go_to_node(&mut b, 9),
            Err(UndoTreeError::UnknownNode { id: 9, len: 1 })
        );
    }

    #[test]
    fn clear_resets_to_root() {
        let mut b = Buffer::new("");
        let mut t = UndoTree::default();
        type_at(&mut t, &mut b, 0, "A", Instant::now());
        assert!(t.has_edits());
        assert_eq!(t.node_count(), 2);
        t.clear();
        assert!(!t.has_edits());
        assert_eq!(t.node_count(), 1);
        assert!(!t.can_undo());
        assert!(!t.can_redo());
        assert_eq!(t.tree().current, 0);
    }
}
