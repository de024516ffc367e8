//! Error types for tree operations.

use thiserror::Error;

/// Errors returned by path parsing and tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Operation attempted before `init`.
    #[error("Tree is not initialized")]
    NotInitialized,

    /// `init` called on an already-initialized tree.
    #[error("Tree is already initialized")]
    AlreadyInitialized,

    /// Malformed path string.
    #[error("Malformed path: {path:?}")]
    BadPath { path: String },

    /// Target path lies outside the existing root's namespace, or the
    /// insert would create a root the configuration forbids.
    #[error("Conflicting path: {path}")]
    ConflictingPath { path: String },

    /// A required node does not exist.
    #[error("No such path: {path}")]
    NoSuchPath { path: String },

    /// A file occupies a position that should be a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// The target exists but is a directory, not a file.
    #[error("Not a file: {path}")]
    NotAFile { path: String },

    /// Exact duplicate insert.
    #[error("Already in tree: {path}")]
    AlreadyInTree { path: String },

    /// The configured node capacity would be exceeded.
    #[error("Node capacity exceeded (limit {limit})")]
    CapacityExceeded { limit: usize },
}

impl TreeError {
    /// Create a `BadPath` error.
    pub fn bad_path(path: impl Into<String>) -> Self {
        Self::BadPath { path: path.into() }
    }

    /// Create a `ConflictingPath` error.
    pub fn conflicting_path(path: impl Into<String>) -> Self {
        Self::ConflictingPath { path: path.into() }
    }

    /// Create a `NoSuchPath` error.
    pub fn no_such_path(path: impl Into<String>) -> Self {
        Self::NoSuchPath { path: path.into() }
    }

    /// Create a `NotADirectory` error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Create a `NotAFile` error.
    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create an `AlreadyInTree` error.
    pub fn already_in_tree(path: impl Into<String>) -> Self {
        Self::AlreadyInTree { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_path() {
        let err = TreeError::no_such_path("/a/b");
        assert_eq!(err.to_string(), "No such path: /a/b");

        let err = TreeError::bad_path("a//b");
        assert!(err.to_string().contains("a//b"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            TreeError::not_a_directory("/f"),
            TreeError::NotADirectory { .. }
        ));
        assert!(matches!(
            TreeError::already_in_tree("/a"),
            TreeError::AlreadyInTree { .. }
        ));
    }
}
