//! The file tree namespace manager.
//!
//! A [`FileTree`] maintains a hierarchy of directories and files addressed
//! by absolute slash-delimited paths. Directories may be internal nodes or
//! leaves; files are always leaves. Nodes live in an arena keyed by
//! [`NodeId`]; parent links are non-owning arena handles, so ownership is
//! strictly tree-shaped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use memtree_core::{ChildEntry, Node, NodeId, NodeKind, TreeConfig, TreeError, TreePath};

use crate::checker;

/// Result of walking as far as possible toward a target path.
struct Traversal {
    /// Deepest existing node on the target's path, `None` if the tree is
    /// empty.
    furthest: Option<NodeId>,
    /// True when a file strictly above the target depth blocked progress.
    stopped_at_file: bool,
}

/// Kind and size of a node, as reported by [`FileTree::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Whether the node is a file.
    pub is_file: bool,
    /// Content length for files, 0 for directories.
    pub size: usize,
}

/// An in-memory hierarchical namespace of directories and files.
///
/// Created uninitialized; every operation other than [`init`] fails with
/// [`TreeError::NotInitialized`] until `init` is called. When
/// `config.validate` is set, every mutating operation ends with a
/// whole-tree invariant check and panics on violation.
///
/// [`init`]: FileTree::init
pub struct FileTree {
    pub(crate) config: TreeConfig,
    pub(crate) initialized: bool,
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) root: Option<NodeId>,
    pub(crate) count: usize,
    next_id: u64,
}

impl FileTree {
    /// Create an uninitialized tree with the given configuration.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            initialized: false,
            nodes: HashMap::new(),
            root: None,
            count: 0,
            next_id: 0,
        }
    }

    /// Create an uninitialized tree with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TreeConfig::default())
    }

    /// The tree's configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Whether `init` has been called (and `destroy` has not).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total number of nodes, root included.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arena handle of the root node, if any.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by arena handle.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Initialize the tree. Fails if already initialized.
    pub fn init(&mut self) -> Result<(), TreeError> {
        if self.initialized {
            return Err(TreeError::AlreadyInitialized);
        }
        self.initialized = true;
        self.root = None;
        self.count = 0;
        debug!("tree initialized");
        self.certify();
        Ok(())
    }

    /// Free the entire tree and return to the uninitialized state.
    pub fn destroy(&mut self) -> Result<(), TreeError> {
        if !self.initialized {
            return Err(TreeError::NotInitialized);
        }
        if let Some(root) = self.root.take() {
            let freed = self.free_subtree(root);
            self.count -= freed;
        }
        self.initialized = false;
        debug!("tree destroyed");
        self.certify();
        Ok(())
    }

    /// Insert a directory at `path`, creating missing ancestors as
    /// directories.
    pub fn insert_dir(&mut self, path: &str) -> Result<(), TreeError> {
        self.insert(path, None)
    }

    /// Insert a file at `path` holding `content`, creating missing
    /// ancestors as directories.
    pub fn insert_file(&mut self, path: &str, content: Vec<u8>) -> Result<(), TreeError> {
        self.insert(path, Some(content))
    }

    /// Whether `path` exists as a directory. False on any error, including
    /// an uninitialized tree.
    pub fn contains_dir(&self, path: &str) -> bool {
        self.find_path(path)
            .is_ok_and(|id| !self.nodes[&id].is_file())
    }

    /// Whether `path` exists as a file. False on any error, including an
    /// uninitialized tree.
    pub fn contains_file(&self, path: &str) -> bool {
        self.find_path(path).is_ok_and(|id| self.nodes[&id].is_file())
    }

    /// Remove the directory at `path` and its entire subtree.
    pub fn rm_dir(&mut self, path: &str) -> Result<(), TreeError> {
        self.remove(path, false)
    }

    /// Remove the file at `path`.
    pub fn rm_file(&mut self, path: &str) -> Result<(), TreeError> {
        self.remove(path, true)
    }

    /// The content of the file at `path`, or `None` if the path does not
    /// resolve to a file.
    pub fn file_contents(&self, path: &str) -> Option<&[u8]> {
        let id = self.find_path(path).ok()?;
        self.nodes[&id].content()
    }

    /// Swap in new content for the file at `path`, returning the previous
    /// buffer. `None` if the path does not resolve to a file.
    pub fn replace_file_contents(&mut self, path: &str, new: Vec<u8>) -> Option<Vec<u8>> {
        let id = self.find_path(path).ok()?;
        let node = self.nodes.get_mut(&id)?;
        match &mut node.kind {
            NodeKind::File { content } => Some(std::mem::replace(content, new)),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Kind and size of the node at `path`.
    pub fn stat(&self, path: &str) -> Result<Stat, TreeError> {
        let id = self.find_path(path)?;
        let node = &self.nodes[&id];
        Ok(Stat {
            is_file: node.is_file(),
            size: node.size(),
        })
    }

    /// Serialize the full listing: one absolute path per line, newline
    /// terminated. At each directory, file children come first (sorted),
    /// then directory children (sorted, recursively). `None` if the tree
    /// is uninitialized; the empty string if it holds no nodes.
    pub fn render(&self) -> Option<String> {
        if !self.initialized {
            return None;
        }
        let mut out = String::new();
        if let Some(root) = self.root {
            self.render_node(root, &mut out);
        }
        Some(out)
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[&id];
        out.push_str(node.path.as_str());
        out.push('\n');
        if let Some(children) = node.children() {
            for child in children.ids().filter(|c| self.nodes[c].is_file()) {
                self.render_node(child, out);
            }
            for child in children.ids().filter(|c| !self.nodes[c].is_file()) {
                self.render_node(child, out);
            }
        }
    }

    fn ensure_initialized(&self) -> Result<(), TreeError> {
        if self.initialized {
            Ok(())
        } else {
            Err(TreeError::NotInitialized)
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Walk down from the root as far as possible toward `target`.
    ///
    /// Fails with `ConflictingPath` if a root exists whose path is not a
    /// prefix of `target`. Never mutates.
    fn traverse(&self, target: &TreePath) -> Result<Traversal, TreeError> {
        let Some(root_id) = self.root else {
            return Ok(Traversal {
                furthest: None,
                stopped_at_file: false,
            });
        };

        let root = &self.nodes[&root_id];
        if !root.path.is_prefix_of(target) {
            return Err(TreeError::conflicting_path(target.as_str()));
        }

        let mut cur = root_id;
        for depth in 2..=target.depth() {
            let node = &self.nodes[&cur];
            if node.is_file() {
                // files are leaves: a file above the target depth blocks
                return Ok(Traversal {
                    furthest: Some(cur),
                    stopped_at_file: true,
                });
            }
            let Some(name) = target.component(depth) else {
                break;
            };
            match node.children().and_then(|c| c.find(name)) {
                Some(child) => cur = child,
                None => break,
            }
        }

        Ok(Traversal {
            furthest: Some(cur),
            stopped_at_file: false,
        })
    }

    /// Find the node whose path is exactly `target`.
    fn find_node(&self, target: &TreePath) -> Result<NodeId, TreeError> {
        let walk = self.traverse(target)?;
        let Some(id) = walk.furthest else {
            return Err(TreeError::no_such_path(target.as_str()));
        };
        if self.nodes[&id].path == *target {
            Ok(id)
        } else if walk.stopped_at_file {
            Err(TreeError::not_a_directory(target.as_str()))
        } else {
            Err(TreeError::no_such_path(target.as_str()))
        }
    }

    fn find_path(&self, path: &str) -> Result<NodeId, TreeError> {
        self.ensure_initialized()?;
        let target = TreePath::parse(path)?;
        self.find_node(&target)
    }

    /// Shared insertion algorithm: `content` is `Some` for a file insert,
    /// `None` for a directory insert.
    fn insert(&mut self, path: &str, mut content: Option<Vec<u8>>) -> Result<(), TreeError> {
        self.ensure_initialized()?;
        let target = TreePath::parse(path)?;
        let want_file = content.is_some();

        let walk = self.traverse(&target)?;
        if walk.stopped_at_file {
            return Err(TreeError::not_a_directory(path));
        }

        if let Some(fid) = walk.furthest {
            let furthest = &self.nodes[&fid];
            if furthest.path == target {
                return Err(match (want_file, furthest.is_file()) {
                    (true, true) | (false, false) => TreeError::already_in_tree(path),
                    (false, true) => TreeError::not_a_directory(path),
                    (true, false) => TreeError::not_a_file(path),
                });
            }
        } else if want_file && target.depth() == 1 && !self.config.allow_file_root {
            // a file cannot become the tree root
            return Err(TreeError::conflicting_path(path));
        }

        let start = walk
            .furthest
            .map_or(1, |id| self.nodes[&id].path.depth() + 1);
        let mut parent = walk.furthest;
        let mut first_new: Option<NodeId> = None;
        let mut created = 0usize;

        for depth in start..=target.depth() {
            if let Some(limit) = self.config.max_nodes {
                if self.count + created + 1 > limit {
                    self.rollback(first_new);
                    self.certify();
                    return Err(TreeError::CapacityExceeded { limit });
                }
            }

            let id = self.alloc_id();
            let node_path = target.prefix(depth);
            let node = if depth == target.depth() && want_file {
                Node::new_file(id, node_path, parent, content.take().unwrap_or_default())
            } else {
                Node::new_directory(id, node_path, parent)
            };

            if let Some(pid) = parent {
                let Some(children) = self.nodes.get_mut(&pid).and_then(Node::children_mut) else {
                    // parent was verified to be a directory during traversal
                    self.rollback(first_new);
                    self.certify();
                    return Err(TreeError::not_a_directory(path));
                };
                match children.locate(node.path.name()) {
                    Ok(_) => {
                        // traversal stopped above this name, so it cannot
                        // already be present
                        self.rollback(first_new);
                        self.certify();
                        return Err(TreeError::already_in_tree(path));
                    }
                    Err(slot) => {
                        children.insert_at(slot, ChildEntry::new(node.path.name(), id));
                    }
                }
            }

            self.nodes.insert(id, node);
            if first_new.is_none() {
                first_new = Some(id);
            }
            parent = Some(id);
            created += 1;
        }

        if self.root.is_none() {
            self.root = first_new;
        }
        self.count += created;

        debug!(path, created, file = want_file, "inserted");
        self.certify();
        Ok(())
    }

    /// Shared removal algorithm: `want_file` selects the required kind.
    fn remove(&mut self, path: &str, want_file: bool) -> Result<(), TreeError> {
        let id = self.find_path(path)?;
        let node = &self.nodes[&id];
        if want_file && !node.is_file() {
            return Err(TreeError::not_a_file(path));
        }
        if !want_file && node.is_file() {
            return Err(TreeError::not_a_directory(path));
        }

        self.detach(id);
        let freed = self.free_subtree(id);
        self.count -= freed;
        if self.count == 0 {
            self.root = None;
        }

        debug!(path, freed, "removed");
        self.certify();
        Ok(())
    }

    /// Remove `id` from its parent's child set, if it has a parent.
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(pid) = node.parent else {
            return;
        };
        let name = node.path.name().to_owned();
        if let Some(children) = self.nodes.get_mut(&pid).and_then(Node::children_mut) {
            if let Ok(index) = children.locate(&name) {
                children.remove_at(index);
            }
        }
    }

    /// Free `id` and everything beneath it, returning the number of nodes
    /// freed. Iterative with an explicit stack, so subtree depth is not
    /// bounded by the call stack.
    fn free_subtree(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.remove(&cur) {
                if let Some(children) = node.children() {
                    stack.extend(children.ids());
                }
                freed += 1;
            }
        }
        freed
    }

    /// Undo a partially built insertion chain: detach its first node and
    /// free everything attached beneath it. The node count has not been
    /// updated at this point, so only the arena and child links revert.
    fn rollback(&mut self, first_new: Option<NodeId>) {
        let Some(id) = first_new else {
            return;
        };
        self.detach(id);
        let freed = self.free_subtree(id);
        debug!(freed, "rolled back partial insert");
    }

    /// Post-mutation validation hook: no-op unless `config.validate` is
    /// set; a violation is a contract breach and panics.
    fn certify(&self) {
        if !self.config.validate {
            return;
        }
        if let Err(violation) = checker::check_tree(self) {
            tracing::error!(%violation, "tree invariant violated");
            panic!("tree invariant violated: {violation}");
        }
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::with_defaults()
    }
}
