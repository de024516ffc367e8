//! Ordered child sets for directory nodes.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// One entry in a directory's child set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    /// The child's final path component.
    pub name: CompactString,
    /// Arena handle of the child node.
    pub id: NodeId,
}

impl ChildEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<CompactString>, id: NodeId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// A directory's children, kept strictly sorted ascending by name with no
/// duplicates.
///
/// Siblings all share their parent's path prefix, so name order here is
/// the same as full-path lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSet {
    entries: Vec<ChildEntry>,
}

impl ChildSet {
    /// Create an empty child set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binary search by name: `Ok(index)` if a child with `name` is
    /// present, `Err(insertion_point)` otherwise.
    pub fn locate(&self, name: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.name.as_str().cmp(name))
    }

    /// Look up a child's id by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.locate(name).ok().map(|i| self.entries[i].id)
    }

    /// The entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ChildEntry> {
        self.entries.get(index)
    }

    /// Insert `entry` at `index`. The index must come from [`locate`] for
    /// the sort order to be preserved.
    ///
    /// [`locate`]: ChildSet::locate
    pub fn insert_at(&mut self, index: usize, entry: ChildEntry) {
        self.entries.insert(index, entry);
    }

    /// Remove and return the entry at `index`, if any.
    pub fn remove_at(&mut self, index: usize) -> Option<ChildEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Iterate over entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ChildEntry> {
        self.entries.iter()
    }

    /// Iterate over child ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.id)
    }
}
