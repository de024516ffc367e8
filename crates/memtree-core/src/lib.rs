//! Core types for memtree.
//!
//! This crate provides the fundamental data structures used by the memtree
//! engine: parsed path descriptors, ordered child sets, tree nodes, and
//! configuration.

mod children;
mod config;
mod error;
mod node;
mod path;

pub use children::{ChildEntry, ChildSet};
pub use config::{TreeConfig, TreeConfigBuilder};
pub use error::TreeError;
pub use node::{Node, NodeId, NodeKind};
pub use path::TreePath;
