//! Structural invariant checking.
//!
//! Read-only validation of a [`FileTree`]: [`check_node`] spot-checks one
//! node and its direct children, [`check_tree`] is the authoritative
//! whole-tree oracle run after every mutation in validating trees. Both
//! fail fast on the first violation found.

use itertools::Itertools;
use thiserror::Error;

use memtree_core::NodeId;

use crate::tree::FileTree;

/// A broken structural invariant, with the offending paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A referenced node is not present in the arena.
    #[error("node {id:?} is not present in the arena")]
    DanglingNode { id: NodeId },

    /// A node carries an empty path string.
    #[error("node {id:?} has an empty path")]
    EmptyPath { id: NodeId },

    /// A non-root node has no parent link.
    #[error("node {path} has no parent but sits at depth {depth}")]
    MissingParent { path: String, depth: usize },

    /// A depth-1 node has a parent link.
    #[error("node {path} has a parent but sits at depth 1")]
    ParentAtDepthOne { path: String },

    /// A node's recorded parent is a file.
    #[error("parent of {path} is a file")]
    FileParent { path: String },

    /// Child depth is not parent depth + 1.
    #[error("depth of {path} is not the depth of its parent {parent} plus 1")]
    DepthMismatch { path: String, parent: String },

    /// The parent's path is not a full-length prefix of the child's.
    #[error("parent path {parent} is not a full prefix of {path}")]
    PrefixMismatch { path: String, parent: String },

    /// A node's recorded parent does not hold it in its child set.
    #[error("node {path} is missing from the child set of its parent {parent}")]
    NotInParentChildSet { path: String, parent: String },

    /// A held child's parent link points elsewhere.
    #[error("child {path} does not point back to the directory {parent} holding it")]
    ParentLinkMismatch { path: String, parent: String },

    /// A child-set entry name disagrees with the child's own path.
    #[error("child set entry {name:?} under {parent} does not match the child path {path}")]
    ChildNameMismatch {
        parent: String,
        name: String,
        path: String,
    },

    /// Two siblings share a name.
    #[error("sibling name {name:?} appears twice under {parent}")]
    DuplicateChild { parent: String, name: String },

    /// Siblings are out of order.
    #[error("children of {parent} are not sorted: {prev:?} precedes {next:?}")]
    UnsortedChildren {
        parent: String,
        prev: String,
        next: String,
    },

    /// The root is a file and the configuration forbids that.
    #[error("root {path} is a file")]
    FileRoot { path: String },

    /// The root node carries a parent link.
    #[error("root {path} has a parent")]
    RootWithParent { path: String },

    /// An uninitialized tree still references a root.
    #[error("tree is not initialized but has a root")]
    UninitializedWithRoot,

    /// An uninitialized tree has a nonzero count.
    #[error("tree is not initialized but its count is {count}")]
    UninitializedWithCount { count: usize },

    /// Count is zero while a root exists.
    #[error("count is 0 but a root is present")]
    RootWithZeroCount,

    /// A positive count with no root.
    #[error("count is {count} but there is no root")]
    CountWithoutRoot { count: usize },

    /// Stored count disagrees with an independent traversal.
    #[error("stored count {stored} does not match the {reachable} reachable nodes")]
    CountMismatch { stored: usize, reachable: usize },
}

/// Validate one node and its direct children, reporting the first
/// violation found. Never mutates.
pub fn check_node(tree: &FileTree, id: NodeId) -> Result<(), InvariantViolation> {
    let Some(node) = tree.get(id) else {
        return Err(InvariantViolation::DanglingNode { id });
    };

    if node.path.as_str().is_empty() {
        return Err(InvariantViolation::EmptyPath { id });
    }

    match node.parent {
        Some(pid) => {
            if node.depth() == 1 {
                return Err(InvariantViolation::ParentAtDepthOne {
                    path: node.path.to_string(),
                });
            }
            let Some(parent) = tree.get(pid) else {
                return Err(InvariantViolation::DanglingNode { id: pid });
            };
            if parent.is_file() {
                return Err(InvariantViolation::FileParent {
                    path: node.path.to_string(),
                });
            }
            if node.depth() != parent.depth() + 1 {
                return Err(InvariantViolation::DepthMismatch {
                    path: node.path.to_string(),
                    parent: parent.path.to_string(),
                });
            }
            if node.path.shared_prefix_depth(&parent.path) != parent.depth() {
                return Err(InvariantViolation::PrefixMismatch {
                    path: node.path.to_string(),
                    parent: parent.path.to_string(),
                });
            }
            if parent.children().and_then(|c| c.find(node.name())) != Some(id) {
                return Err(InvariantViolation::NotInParentChildSet {
                    path: node.path.to_string(),
                    parent: parent.path.to_string(),
                });
            }
        }
        None => {
            if node.depth() != 1 {
                return Err(InvariantViolation::MissingParent {
                    path: node.path.to_string(),
                    depth: node.depth(),
                });
            }
            if node.is_file() && !tree.config().allow_file_root {
                return Err(InvariantViolation::FileRoot {
                    path: node.path.to_string(),
                });
            }
        }
    }

    let Some(children) = node.children() else {
        // files carry no child set, so nothing further to verify
        return Ok(());
    };

    for entry in children.iter() {
        let Some(child) = tree.get(entry.id) else {
            return Err(InvariantViolation::DanglingNode { id: entry.id });
        };
        if child.parent != Some(id) {
            return Err(InvariantViolation::ParentLinkMismatch {
                path: child.path.to_string(),
                parent: node.path.to_string(),
            });
        }
        if entry.name.as_str() != child.name() {
            return Err(InvariantViolation::ChildNameMismatch {
                parent: node.path.to_string(),
                name: entry.name.to_string(),
                path: child.path.to_string(),
            });
        }
        if child.path.shared_prefix_depth(&node.path) != node.depth() {
            return Err(InvariantViolation::PrefixMismatch {
                path: child.path.to_string(),
                parent: node.path.to_string(),
            });
        }
        if child.depth() != node.depth() + 1 {
            return Err(InvariantViolation::DepthMismatch {
                path: child.path.to_string(),
                parent: node.path.to_string(),
            });
        }
    }

    for (prev, next) in children.iter().tuple_windows() {
        if prev.name == next.name {
            return Err(InvariantViolation::DuplicateChild {
                parent: node.path.to_string(),
                name: next.name.to_string(),
            });
        }
        if prev.name > next.name {
            return Err(InvariantViolation::UnsortedChildren {
                parent: node.path.to_string(),
                prev: prev.name.to_string(),
                next: next.name.to_string(),
            });
        }
    }

    Ok(())
}

/// Validate the whole tree: initialization/root/count coherence, then a
/// full pre-order walk running [`check_node`] at every node with an
/// independent count of reachable nodes. Never mutates.
pub fn check_tree(tree: &FileTree) -> Result<(), InvariantViolation> {
    if !tree.is_initialized() {
        if tree.root_id().is_some() {
            return Err(InvariantViolation::UninitializedWithRoot);
        }
        if tree.count() != 0 {
            return Err(InvariantViolation::UninitializedWithCount {
                count: tree.count(),
            });
        }
        return Ok(());
    }

    let Some(root) = tree.root_id() else {
        if tree.count() != 0 {
            return Err(InvariantViolation::CountWithoutRoot {
                count: tree.count(),
            });
        }
        return Ok(());
    };

    if tree.count() == 0 {
        return Err(InvariantViolation::RootWithZeroCount);
    }
    if let Some(node) = tree.get(root) {
        if node.parent.is_some() {
            return Err(InvariantViolation::RootWithParent {
                path: node.path.to_string(),
            });
        }
    }

    let mut reachable = 0;
    walk(tree, root, &mut reachable)?;
    if reachable != tree.count() {
        return Err(InvariantViolation::CountMismatch {
            stored: tree.count(),
            reachable,
        });
    }

    Ok(())
}

fn walk(tree: &FileTree, id: NodeId, reachable: &mut usize) -> Result<(), InvariantViolation> {
    *reachable += 1;
    check_node(tree, id)?;
    if let Some(children) = tree.get(id).and_then(|n| n.children()) {
        for child in children.ids() {
            walk(tree, child, reachable)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_core::{ChildEntry, NodeKind, TreeConfig, TreePath};

    fn valid_tree() -> FileTree {
        let mut t = FileTree::new(TreeConfig::builder().validate(false).build().unwrap());
        t.init().unwrap();
        t.insert_dir("/a/b").unwrap();
        t.insert_file("/a/f", vec![1, 2]).unwrap();
        t
    }

    fn id_of(tree: &FileTree, path: &str) -> NodeId {
        let target = TreePath::parse(path).unwrap();
        tree.nodes
            .values()
            .find(|n| n.path == target)
            .map(|n| n.id)
            .unwrap()
    }

    #[test]
    fn test_valid_tree_passes() {
        let t = valid_tree();
        assert_eq!(check_tree(&t), Ok(()));
        for id in t.nodes.keys() {
            assert_eq!(check_node(&t, *id), Ok(()));
        }
    }

    #[test]
    fn test_detects_count_mismatch() {
        let mut t = valid_tree();
        t.count += 1;
        assert!(matches!(
            check_tree(&t),
            Err(InvariantViolation::CountMismatch {
                stored: 4,
                reachable: 3
            })
        ));
    }

    #[test]
    fn test_detects_root_without_count() {
        let mut t = valid_tree();
        t.count = 0;
        assert_eq!(check_tree(&t), Err(InvariantViolation::RootWithZeroCount));
    }

    #[test]
    fn test_detects_uninitialized_with_root() {
        let mut t = valid_tree();
        t.initialized = false;
        assert_eq!(
            check_tree(&t),
            Err(InvariantViolation::UninitializedWithRoot)
        );
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut t = valid_tree();
        let b = id_of(&t, "/a/b");
        t.nodes.get_mut(&b).unwrap().parent = Some(b);
        assert!(matches!(
            check_tree(&t),
            Err(InvariantViolation::ParentLinkMismatch { .. })
        ));
    }

    #[test]
    fn test_detects_depth_mismatch() {
        let mut t = valid_tree();
        let b = id_of(&t, "/a/b");
        t.nodes.get_mut(&b).unwrap().path = TreePath::parse("/a/b/c").unwrap();
        let result = check_node(&t, b);
        assert!(matches!(
            result,
            Err(InvariantViolation::DepthMismatch { .. })
        ));
    }

    #[test]
    fn test_detects_prefix_mismatch() {
        let mut t = valid_tree();
        let b = id_of(&t, "/a/b");
        t.nodes.get_mut(&b).unwrap().path = TreePath::parse("/x/b").unwrap();
        assert!(matches!(
            check_node(&t, b),
            Err(InvariantViolation::PrefixMismatch { .. })
        ));
    }

    #[test]
    fn test_detects_unsorted_children() {
        let mut t = valid_tree();
        let a = id_of(&t, "/a");
        // swap the two sorted entries by hand
        let children = t.nodes.get_mut(&a).unwrap().children_mut().unwrap();
        let first = children.remove_at(0).unwrap();
        children.insert_at(1, first);
        assert!(matches!(
            check_node(&t, a),
            Err(InvariantViolation::UnsortedChildren { .. })
        ));
    }

    #[test]
    fn test_detects_file_root_when_forbidden() {
        let mut t = valid_tree();
        let root = t.root_id().unwrap();
        t.nodes.get_mut(&root).unwrap().kind = NodeKind::File { content: vec![] };
        assert!(matches!(
            check_node(&t, root),
            Err(InvariantViolation::FileRoot { .. })
        ));
    }

    #[test]
    fn test_allows_file_root_when_configured() {
        let mut t = FileTree::new(
            TreeConfig::builder()
                .allow_file_root(true)
                .validate(false)
                .build()
                .unwrap(),
        );
        t.init().unwrap();
        t.insert_file("/f", vec![1]).unwrap();
        assert_eq!(check_tree(&t), Ok(()));
    }

    #[test]
    fn test_detects_dangling_child() {
        let mut t = valid_tree();
        let a = id_of(&t, "/a");
        let children = t.nodes.get_mut(&a).unwrap().children_mut().unwrap();
        let slot = children.locate("zz").unwrap_err();
        children.insert_at(slot, ChildEntry::new("zz", NodeId::new(999)));
        assert!(matches!(
            check_node(&t, a),
            Err(InvariantViolation::DanglingNode { .. })
        ));
    }
}
