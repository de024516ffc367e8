//! Tree maintenance engine for memtree.
//!
//! This crate provides [`FileTree`], an in-memory hierarchical namespace of
//! directories and files addressed by absolute paths, together with the
//! [`checker`] module that certifies its structural invariants.

pub mod checker;
mod tree;

pub use checker::InvariantViolation;
pub use tree::{FileTree, Stat};
