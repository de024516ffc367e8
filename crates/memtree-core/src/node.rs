//! File and directory node types.

use serde::{Deserialize, Serialize};

use crate::children::ChildSet;
use crate::path::TreePath;

/// Unique identifier for a node within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Type of node with its kind-specific payload.
///
/// Only directories carry a child set and only files carry content, so
/// "files are leaves" and "directories have no content" hold by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Directory: an ordered set of children.
    Directory {
        /// Immediate children, sorted ascending by name.
        children: ChildSet,
    },
    /// Regular file: an opaque content buffer whose length is the file size.
    File {
        /// File content.
        content: Vec<u8>,
    },
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory { .. })
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }
}

/// A single directory or file in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,

    /// This node's full absolute path.
    pub path: TreePath,

    /// Back-reference to the owning directory; `None` only for the root.
    pub parent: Option<NodeId>,

    /// Node kind and associated payload.
    pub kind: NodeKind,
}

impl Node {
    /// Create a new directory node with no children.
    pub fn new_directory(id: NodeId, path: TreePath, parent: Option<NodeId>) -> Self {
        Self {
            id,
            path,
            parent,
            kind: NodeKind::Directory {
                children: ChildSet::new(),
            },
        }
    }

    /// Create a new file node holding `content`.
    pub fn new_file(id: NodeId, path: TreePath, parent: Option<NodeId>, content: Vec<u8>) -> Self {
        Self {
            id,
            path,
            parent,
            kind: NodeKind::File { content },
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// The node's final path component.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// The node's depth (root has depth 1).
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// The child set, for directories.
    pub fn children(&self) -> Option<&ChildSet> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Mutable child set, for directories.
    pub fn children_mut(&mut self) -> Option<&mut ChildSet> {
        match &mut self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Number of direct children (0 for files).
    pub fn child_count(&self) -> usize {
        self.children().map_or(0, ChildSet::len)
    }

    /// The content buffer, for files.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Content length for files, 0 for directories.
    pub fn size(&self) -> usize {
        self.content().map_or(0, <[u8]>::len)
    }
}
