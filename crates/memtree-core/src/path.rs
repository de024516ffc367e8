//! Absolute path descriptors.

use std::cmp::Ordering;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// A parsed absolute path.
///
/// `/a/b/c` parses into the components `a`, `b`, `c` at depths 1 through 3.
/// The depth of a path is its number of components; a tree root sits at
/// depth 1. Paths compare lexicographically by their full string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TreePath {
    raw: CompactString,
    components: Vec<CompactString>,
}

impl TreePath {
    /// Parse an absolute path string.
    ///
    /// Rejects the empty string, paths without a leading `/`, the bare `/`
    /// (a path must have at least one component), and empty components
    /// (`//` or a trailing `/`).
    pub fn parse(raw: &str) -> Result<Self, TreeError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(TreeError::bad_path(raw));
        };
        if rest.is_empty() {
            return Err(TreeError::bad_path(raw));
        }

        let mut components = Vec::new();
        for part in rest.split('/') {
            if part.is_empty() {
                return Err(TreeError::bad_path(raw));
            }
            components.push(CompactString::from(part));
        }

        Ok(Self {
            raw: CompactString::from(raw),
            components,
        })
    }

    /// Number of components.
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// The component at 1-based depth `depth`, if any.
    pub fn component(&self, depth: usize) -> Option<&str> {
        if depth == 0 {
            return None;
        }
        self.components.get(depth - 1).map(CompactString::as_str)
    }

    /// All components in order.
    pub fn components(&self) -> &[CompactString] {
        &self.components
    }

    /// The final component.
    pub fn name(&self) -> &str {
        // parse() guarantees at least one component
        match self.components.last() {
            Some(c) => c.as_str(),
            None => "",
        }
    }

    /// The path formed by the first `depth` components, clamped to `1..=depth()`.
    pub fn prefix(&self, depth: usize) -> TreePath {
        let depth = depth.clamp(1, self.components.len());
        let components: Vec<CompactString> = self.components[..depth].to_vec();
        let mut raw = CompactString::new("");
        for c in &components {
            raw.push('/');
            raw.push_str(c);
        }
        TreePath { raw, components }
    }

    /// Number of leading components this path shares with `other`.
    pub fn shared_prefix_depth(&self, other: &TreePath) -> usize {
        self.components
            .iter()
            .zip(&other.components)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Whether every component of this path is a leading component of `other`.
    pub fn is_prefix_of(&self, other: &TreePath) -> bool {
        self.shared_prefix_depth(other) == self.depth()
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for TreePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        path.raw.into()
    }
}

impl TryFrom<String> for TreePath {
    type Error = TreeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}
