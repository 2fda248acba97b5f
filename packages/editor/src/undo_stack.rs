//! # Undo/Redo Stack
//!
//! Linear history over whole-tree snapshots.
//!
//! ## Design
//!
//! - Entries are full canonical serializations of the tree, never diffs
//! - `last_snapshot` is the serialization the stack last observed; recording
//!   pushes it (the state before the change) and moves the cursor forward
//! - Recording an unchanged tree is a no-op, so repeated checkpoints without
//!   an edit in between add nothing
//! - New entries clear the redo stack
//! - Nothing is recorded while a snapshot is being restored
//!
//! ```text
//!   record(L)   undo: [.., S0]  cursor S1     redo: []
//!   undo()      undo: [..]      cursor S0     redo: [S1]
//!   redo()      undo: [.., S0]  cursor S1     redo: []
//! ```

use chrono::{DateTime, Utc};
use sitegen_tree::{SiteTree, TreeResult};

/// One recorded tree state
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Canonical serialization of the tree
    pub snapshot: String,

    /// Label of the edit that moved away from this state
    pub label: String,

    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(snapshot: String, label: impl Into<String>) -> Self {
        Self {
            snapshot,
            label: label.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Undo/redo stack for tree editing
#[derive(Debug)]
pub struct UndoStack {
    /// States to return to (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// States undone (most recent last)
    redo_stack: Vec<HistoryEntry>,

    last_snapshot: String,

    is_restoring: bool,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a stack for `tree` with default max levels (100)
    pub fn new(tree: &SiteTree) -> TreeResult<Self> {
        Self::with_max_levels(tree, 100)
    }

    /// Create a stack for `tree` with custom max levels
    pub fn with_max_levels(tree: &SiteTree, max_levels: usize) -> TreeResult<Self> {
        Ok(Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_snapshot: tree.serialize()?,
            is_restoring: false,
            max_levels,
        })
    }

    /// Checkpoint the tree after an edit
    ///
    /// Returns whether an entry was added.
    pub fn record(&mut self, label: &str, tree: &SiteTree) -> TreeResult<bool> {
        if self.is_restoring {
            return Ok(false);
        }

        let current = tree.serialize()?;
        if current == self.last_snapshot {
            return Ok(false);
        }

        let previous = std::mem::replace(&mut self.last_snapshot, current);
        self.undo_stack.push(HistoryEntry::new(previous, label));
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New edit invalidates the redo branch
        self.redo_stack.clear();
        tracing::debug!(label, levels = self.undo_stack.len(), "recorded history entry");
        Ok(true)
    }

    /// Restore the most recent undo entry into `tree`
    pub fn undo(&mut self, tree: &mut SiteTree) -> TreeResult<bool> {
        let Some(entry) = self.undo_stack.last() else {
            return Ok(false);
        };
        let restored = SiteTree::deserialize(&entry.snapshot)?;
        let current = tree.serialize()?;

        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(HistoryEntry::new(current, entry.label));
            self.restore(tree, restored, entry.snapshot);
        }
        Ok(true)
    }

    /// Reapply the most recently undone entry
    pub fn redo(&mut self, tree: &mut SiteTree) -> TreeResult<bool> {
        let Some(entry) = self.redo_stack.last() else {
            return Ok(false);
        };
        let restored = SiteTree::deserialize(&entry.snapshot)?;
        let current = tree.serialize()?;

        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push(HistoryEntry::new(current, entry.label));
            self.restore(tree, restored, entry.snapshot);
        }
        Ok(true)
    }

    fn restore(&mut self, tree: &mut SiteTree, restored: SiteTree, snapshot: String) {
        // An enclosing begin_restore keeps the flag set past the swap
        let outer = std::mem::replace(&mut self.is_restoring, true);
        *tree = restored;
        self.last_snapshot = snapshot;
        self.is_restoring = outer;
    }

    /// Drop all history and take `tree` as the new baseline
    pub fn reset(&mut self, tree: &SiteTree) -> TreeResult<()> {
        self.last_snapshot = tree.serialize()?;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.is_restoring = false;
        Ok(())
    }

    /// Suppress recording until `end_restore`
    pub fn begin_restore(&mut self) {
        self.is_restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.is_restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.is_restoring
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the edit the next undo reverts
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    /// Label of the edit the next redo reapplies
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    /// Undo entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_tree::{Node, ROOT_ID};

    fn tree_with(text: &str) -> SiteTree {
        SiteTree::new(
            Node::container(ROOT_ID).with_child(Node::html("p", format!("<p id=\"p\">{}</p>", text))),
        )
        .unwrap()
    }

    fn set_text(tree: &mut SiteTree, text: &str) {
        tree.find_mut("p").unwrap().code = format!("<p id=\"p\">{}</p>", text);
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new(&tree_with("a")).unwrap();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_record_twice_adds_one_entry() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();

        set_text(&mut tree, "b");
        assert!(stack.record("Edit", &tree).unwrap());
        assert!(!stack.record("Edit again", &tree).unwrap());
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_label(), Some("Edit"));
    }

    #[test]
    fn test_undo_then_redo_restores_state() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();

        set_text(&mut tree, "b");
        stack.record("Edit", &tree).unwrap();
        let edited = tree.serialize().unwrap();

        assert!(stack.undo(&mut tree).unwrap());
        assert_eq!(tree, tree_with("a"));
        assert_eq!(stack.redo_label(), Some("Edit"));

        assert!(stack.redo(&mut tree).unwrap());
        assert_eq!(tree.serialize().unwrap(), edited);
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.is_restoring());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();
        assert!(!stack.undo(&mut tree).unwrap());
        assert!(!stack.redo(&mut tree).unwrap());
        assert_eq!(tree, tree_with("a"));
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();

        set_text(&mut tree, "b");
        stack.record("First", &tree).unwrap();
        stack.undo(&mut tree).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        set_text(&mut tree, "c");
        stack.record("Second", &tree).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_recording_suppressed_while_restoring() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();

        stack.begin_restore();
        set_text(&mut tree, "b");
        assert!(!stack.record("Ignored", &tree).unwrap());
        stack.end_restore();

        assert!(stack.record("Kept", &tree).unwrap());
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();
        set_text(&mut tree, "b");
        stack.record("Edit", &tree).unwrap();

        let other = tree_with("other project");
        stack.reset(&other).unwrap();
        assert!(!stack.can_undo());
        assert!(!stack.record("Same", &other).unwrap());
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut tree = tree_with("0");
        let mut stack = UndoStack::with_max_levels(&tree, 2).unwrap();

        for i in 1..=3 {
            set_text(&mut tree, &i.to_string());
            stack.record(&format!("Edit {}", i), &tree).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.entries()[0].label, "Edit 2");
    }

    #[test]
    fn test_restore_keeps_outer_restoring_flag() {
        let mut tree = tree_with("a");
        let mut stack = UndoStack::new(&tree).unwrap();
        set_text(&mut tree, "b");
        stack.record("Edit", &tree).unwrap();

        stack.begin_restore();
        assert!(stack.undo(&mut tree).unwrap());
        assert!(stack.is_restoring());

        // Changes made while regenerating after the swap are not recorded
        set_text(&mut tree, "c");
        assert!(!stack.record("During restore", &tree).unwrap());
        stack.end_restore();

        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_label(), Some("Edit"));
        assert!(!stack.is_restoring());
    }
}
