//! An independent verifier for the structure of a file tree.
//!
//! Nothing here trusts the bookkeeping of [`Tree`] or the ordering maintained by
//! [`NodeArena::create`]: counts are recomputed by a full traversal, and sibling order and
//! uniqueness are re-derived from the paths themselves. The checker never mutates anything.
//! Each entry point stops at the first violation it finds, reports it as a `tracing` event at
//! the ERROR level, and returns it.
//!
//! [`Tree`]: crate::Tree

use thiserror::Error;
use tracing::Level as LogLevel;

use filetree_path::PathKey;

use crate::node::{NodeArena, NodeId, NodeKind, NodeRef};


/// A broken structural invariant. Any of these indicates a bug, not a caller error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("not initialized, but the count is {count}")]
    UninitializedWithCount {
        count: usize,
    },
    #[error("not initialized, but the root is `{root}`")]
    UninitializedWithRoot {
        root: PathKey,
    },
    #[error("initialized and empty, but the root is `{root}`")]
    EmptyWithRoot {
        root: PathKey,
    },
    #[error("initialized and non-empty (count {count}), but there is no root")]
    MissingRoot {
        count: usize,
    },
    #[error("the root `{root}` has a parent")]
    RootHasParent {
        root: PathKey,
    },
    #[error("the root `{root}` does not have depth one")]
    RootDepth {
        root: PathKey,
    },
    #[error("actual node count ({actual}) does not match the expected count ({expected})")]
    CountMismatch {
        expected: usize,
        actual:   usize,
    },
    #[error("the arena holds {live} live nodes, but only {reachable} are reachable from the root")]
    LeakedNodes {
        live:      usize,
        reachable: usize,
    },
    /// More nodes were reached than are alive, so some node is listed under two parents,
    /// or under one of its own descendants.
    #[error("more nodes are reachable from the root than the {live} live nodes in the arena")]
    SharedOrCyclic {
        live: usize,
    },
    #[error("{0} does not refer to a live node")]
    StaleHandle(NodeId),
    #[error("parent and child nodes do not have parent and child paths: `{parent}` `{child}`")]
    NotParentAndChild {
        parent: PathKey,
        child:  PathKey,
    },
    #[error("`{child}` is listed as a child of `{parent}`, but does not link back to it")]
    BrokenParentLink {
        parent: PathKey,
        child:  PathKey,
    },
    #[error("`{child}` is listed among the {expected} children of `{parent}`")]
    MisfiledChild {
        parent:   PathKey,
        child:    PathKey,
        expected: NodeKind,
    },
    #[error("siblings have non-unique paths: `{path}`")]
    DuplicateSibling {
        path: PathKey,
    },
    #[error("children are not in sorted order: `{previous}` is followed by `{next}`")]
    UnsortedSiblings {
        previous: PathKey,
        next:     PathKey,
    },
}

/// Check the invariants of a single node against its parent and siblings.
///
/// A node without a parent is valid as long as it is live. Otherwise, the parent's path must be
/// the longest proper prefix of the node's path, and no other child of the parent with the same
/// kind may share the node's path.
pub fn node_is_valid(arena: &NodeArena, id: NodeId) -> Result<(), InvariantViolation> {
    check_node(arena, id).inspect_err(report)
}

/// Walk the subtree at `root` in pre-order, checking every node, the parent links of every
/// child, and the order of each run of same-kind siblings (files, then directories).
pub fn tree_check(arena: &NodeArena, root: Option<NodeId>) -> Result<(), InvariantViolation> {
    check_subtree(arena, root).inspect_err(report)
}

/// Check every invariant of a tree with the given state.
///
/// - An uninitialized tree has a count of zero and no root.
/// - An initialized tree has a root if and only if its count is nonzero.
/// - The count equals the number of nodes reachable from the root, which equals the number of
///   live nodes in the arena.
/// - Every node in the tree passes [`tree_check`].
pub fn tree_is_valid(
    arena:       &NodeArena,
    initialized: bool,
    root:        Option<NodeId>,
    count:       usize,
) -> Result<(), InvariantViolation> {
    check_tree(arena, initialized, root, count).inspect_err(report)
}

/// Count the nodes reachable from `root`, without trusting any cached count.
pub fn count_reachable(
    arena: &NodeArena,
    root:  Option<NodeId>,
) -> Result<usize, InvariantViolation> {
    let mut reached = 0;
    let mut pending = Vec::from_iter(root);

    while let Some(id) = pending.pop() {
        resolve(arena, id)?;
        reached += 1;
        if reached > arena.len() {
            return Err(InvariantViolation::SharedOrCyclic { live: arena.len() });
        }

        for kind in [NodeKind::File, NodeKind::Directory] {
            pending.extend(children(arena, id, kind));
        }
    }

    Ok(reached)
}

fn report(violation: &InvariantViolation) {
    tracing::event!(LogLevel::ERROR, "file tree invariant violated: {violation}");
}

fn resolve(arena: &NodeArena, id: NodeId) -> Result<NodeRef<'_>, InvariantViolation> {
    arena.node(id).map_err(|_| InvariantViolation::StaleHandle(id))
}

/// Every child handle of the given kind, including any stale ones.
fn children(arena: &NodeArena, id: NodeId, kind: NodeKind) -> &[NodeId] {
    arena.children(id, kind).unwrap_or(&[])
}

fn check_tree(
    arena:       &NodeArena,
    initialized: bool,
    root:        Option<NodeId>,
    count:       usize,
) -> Result<(), InvariantViolation> {
    let root_path = |root| resolve(arena, root).map(|root| root.path().clone());

    if !initialized {
        if count != 0 {
            return Err(InvariantViolation::UninitializedWithCount { count });
        }
        if let Some(root) = root {
            return Err(InvariantViolation::UninitializedWithRoot { root: root_path(root)? });
        }
    } else if count == 0 {
        if let Some(root) = root {
            return Err(InvariantViolation::EmptyWithRoot { root: root_path(root)? });
        }
    } else if root.is_none() {
        return Err(InvariantViolation::MissingRoot { count });
    }

    if let Some(root) = root {
        let root = resolve(arena, root)?;
        if root.parent().is_some() {
            return Err(InvariantViolation::RootHasParent { root: root.path().clone() });
        }
        if root.depth() != 1 {
            return Err(InvariantViolation::RootDepth { root: root.path().clone() });
        }
    }

    let reachable = count_reachable(arena, root)?;
    if reachable != count {
        return Err(InvariantViolation::CountMismatch { expected: count, actual: reachable });
    }
    if reachable != arena.len() {
        return Err(InvariantViolation::LeakedNodes { live: arena.len(), reachable });
    }

    check_subtree(arena, root)
}

fn check_node(arena: &NodeArena, id: NodeId) -> Result<(), InvariantViolation> {
    let node = resolve(arena, id)?;
    let Ok(Some(parent_id)) = arena.parent(id) else {
        return Ok(());
    };
    let parent = resolve(arena, parent_id)?;
    let (path, parent_path) = (node.path(), parent.path());

    if parent_path.depth() + 1 != path.depth()
        || path.shared_prefix_depth(parent_path) != path.depth() - 1
    {
        return Err(InvariantViolation::NotParentAndChild {
            parent: parent_path.clone(),
            child:  path.clone(),
        });
    }

    for &sibling in children(arena, parent_id, node.kind()) {
        if sibling != id && resolve(arena, sibling)?.path() == path {
            return Err(InvariantViolation::DuplicateSibling { path: path.clone() });
        }
    }

    Ok(())
}

fn check_subtree(arena: &NodeArena, root: Option<NodeId>) -> Result<(), InvariantViolation> {
    let Some(root) = root else {
        return Ok(());
    };
    check_node(arena, root)?;

    let mut visited = 0;
    let mut pending = vec![root];

    while let Some(id) = pending.pop() {
        visited += 1;
        if visited > arena.len() {
            return Err(InvariantViolation::SharedOrCyclic { live: arena.len() });
        }
        let parent = resolve(arena, id)?;

        let files = children(arena, id, NodeKind::File);
        let dirs = children(arena, id, NodeKind::Directory);
        let combined = files.iter().map(|&child| (NodeKind::File, child))
            .chain(dirs.iter().map(|&child| (NodeKind::Directory, child)));

        let mut previous: Option<(NodeKind, &PathKey)> = None;
        for (expected, child_id) in combined {
            check_node(arena, child_id)?;
            let child = resolve(arena, child_id)?;

            if child.parent().map(NodeRef::id) != Some(id) {
                return Err(InvariantViolation::BrokenParentLink {
                    parent: parent.path().clone(),
                    child:  child.path().clone(),
                });
            }
            if child.kind() != expected {
                return Err(InvariantViolation::MisfiledChild {
                    parent:   parent.path().clone(),
                    child:    child.path().clone(),
                    expected,
                });
            }
            if let Some((previous_kind, previous_path)) = previous {
                // `<=` catches duplicates as well as disorder.
                if previous_kind == expected && child.path() <= previous_path {
                    return Err(InvariantViolation::UnsortedSiblings {
                        previous: previous_path.clone(),
                        next:     child.path().clone(),
                    });
                }
            }
            previous = Some((expected, child.path()));
        }

        // Pre-order: files, then directories, each in increasing order.
        pending.extend(dirs.iter().rev());
        pending.extend(files.iter().rev());
    }

    Ok(())
}
