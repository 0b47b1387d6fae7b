use thiserror::Error;

use filetree_path::{PathError, PathKey};

use crate::node::NodeId;


/// Errors from creating, destroying, or accessing a single node of a [`NodeArena`].
///
/// [`NodeArena`]: crate::node::NodeArena
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// The parent's path is not the longest proper prefix of the new node's path.
    #[error("`{parent}` cannot be the parent of `{path}`")]
    PathMismatch {
        parent: PathKey,
        path:   PathKey,
    },
    /// Only a path of depth one may be created without a parent.
    #[error("`{0}` has depth greater than one, so it needs a parent")]
    InvalidDepth(PathKey),
    /// The parent already has a child of the same kind with this path.
    #[error("a sibling already exists at `{0}`")]
    AlreadyExists(PathKey),
    #[error("expected a directory, but found a file, at `{0}`")]
    NotADirectory(PathKey),
    #[error("expected a file, but found a directory, at `{0}`")]
    NotAFile(PathKey),
    #[error("child index {index} is out of range for `{parent}`, which has {len} such children")]
    NoSuchChild {
        parent: PathKey,
        index:  usize,
        len:    usize,
    },
    /// The handle refers to a node which has since been released.
    #[error("{0} does not refer to a live node")]
    StaleHandle(NodeId),
    /// Either an allocation failed, or the arena's node budget is exhausted.
    #[error("out of memory while creating a node")]
    OutOfMemory,
}

/// Errors returned by [`Tree`] operations.
///
/// Everything other than [`TreeError::Node`] is an ordinary, recoverable outcome of the caller's
/// request; `Node` only arises if a handle held by the tree itself has gone stale.
///
/// [`Tree`]: crate::Tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("the file tree is not initialized")]
    NotInitialized,
    #[error("the file tree is already initialized")]
    AlreadyInitialized,
    #[error(transparent)]
    BadPath(#[from] PathError),
    /// The path does not lie underneath the existing root, or would make a file the root.
    #[error("`{0}` conflicts with the root of the file tree")]
    ConflictingPath(PathKey),
    /// The path, or one of its ancestors, is a file where a directory is required.
    #[error("expected a directory, but found a file, at `{0}`")]
    NotADirectory(PathKey),
    #[error("expected a file, but found a directory, at `{0}`")]
    NotAFile(PathKey),
    #[error("`{0}` is already in the file tree")]
    AlreadyInTree(PathKey),
    #[error("no file or directory exists at `{0}`")]
    NoSuchPath(PathKey),
    #[error("out of memory while inserting into the file tree")]
    OutOfMemory,
    #[error("internal node error: {0}")]
    Node(NodeError),
}

impl From<NodeError> for TreeError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::PathMismatch { path, .. }
            | NodeError::InvalidDepth(path)     => Self::ConflictingPath(path),
            NodeError::AlreadyExists(path)      => Self::AlreadyInTree(path),
            NodeError::NotADirectory(path)      => Self::NotADirectory(path),
            NodeError::NotAFile(path)           => Self::NotAFile(path),
            NodeError::OutOfMemory              => Self::OutOfMemory,
            err @ (NodeError::NoSuchChild { .. } | NodeError::StaleHandle(_)) => Self::Node(err),
        }
    }
}
