//! Tree configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a file tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct TreeConfig {
    /// Permit the root node to be a file rather than a directory.
    ///
    /// When false, inserting a single-component file into an empty tree is
    /// a conflicting-path error and the checker flags file roots.
    #[builder(default = "false")]
    #[serde(default)]
    pub allow_file_root: bool,

    /// Maximum number of nodes the tree may hold (None = unlimited).
    ///
    /// An insert that would push the node count past this limit fails with
    /// `CapacityExceeded` and rolls back any nodes it already created.
    #[builder(default)]
    #[serde(default)]
    pub max_nodes: Option<usize>,

    /// Run the whole-tree invariant check after every mutating operation.
    ///
    /// A failed check is a programming error and panics. Defaults to on in
    /// debug builds, off in release builds.
    #[builder(default = "cfg!(debug_assertions)")]
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    cfg!(debug_assertions)
}

impl TreeConfig {
    /// Create a new tree config builder.
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }

    /// Create a config with default settings.
    pub fn new() -> Self {
        Self {
            allow_file_root: false,
            max_nodes: None,
            validate: cfg!(debug_assertions),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
