use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use tracing::Level as LogLevel;

use filetree_path::PathKey;

use crate::error::NodeError;


/// A handle to a node in a [`NodeArena`].
///
/// Handles are cheap to copy and never keep a node alive. Each carries the generation of the slot
/// it was issued for, so a handle to a released node stays dead even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index:      usize,
    generation: u32,
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "node handle {}#{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    #[inline]
    #[must_use]
    pub const fn from_is_file(is_file: bool) -> Self {
        if is_file { Self::File } else { Self::Directory }
    }

    #[inline]
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::File      => "file",
            Self::Directory => "directory",
        })
    }
}

#[derive(Debug)]
enum Payload {
    File {
        contents: Vec<u8>,
    },
    /// Each collection is strictly increasing by path, and holds only children of its own kind.
    Directory {
        files: Vec<NodeId>,
        dirs:  Vec<NodeId>,
    },
}

#[derive(Debug)]
struct Node {
    path:    PathKey,
    parent:  Option<NodeId>,
    payload: Payload,
}

impl Node {
    const fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::File { .. }      => NodeKind::File,
            Payload::Directory { .. } => NodeKind::Directory,
        }
    }

    /// The collection of children of the given kind, or `None` for a file.
    fn children(&self, kind: NodeKind) -> Option<&Vec<NodeId>> {
        match &self.payload {
            Payload::File { .. }              => None,
            Payload::Directory { files, dirs } => Some(match kind {
                NodeKind::File      => files,
                NodeKind::Directory => dirs,
            }),
        }
    }

    fn children_mut(&mut self, kind: NodeKind) -> Option<&mut Vec<NodeId>> {
        match &mut self.payload {
            Payload::File { .. }              => None,
            Payload::Directory { files, dirs } => Some(match kind {
                NodeKind::File      => files,
                NodeKind::Directory => dirs,
            }),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node:       Option<Node>,
}


/// Storage for the nodes of one file tree.
///
/// The arena is only an allocator: ownership follows the tree shape, with each node owned by its
/// parent's child collection (or, for a root, by whoever holds its handle). A node's parent is
/// recorded as a plain [`NodeId`], which does not own anything.
///
/// [`NodeArena::destroy_subtree`] is the only way nodes are released.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots:  Vec<Slot>,
    /// Indices of slots whose node has been released.
    free:   Vec<usize>,
    live:   usize,
    budget: Option<usize>,
}

impl NodeArena {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena which refuses to hold more than `budget` live nodes at once, if a budget
    /// is given. Creating a node past the budget fails with [`NodeError::OutOfMemory`].
    #[inline]
    #[must_use]
    pub fn with_budget(budget: Option<usize>) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// The number of live nodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    #[must_use]
    pub const fn budget(&self) -> Option<usize> {
        self.budget
    }

    /// Whether the handle refers to a live node.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    /// Borrow a read-only view of a node.
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>, NodeError> {
        let node = self.get(id)?;
        Ok(NodeRef { arena: self, id, node })
    }

    pub fn path(&self, id: NodeId) -> Result<&PathKey, NodeError> {
        Ok(&self.get(id)?.path)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, NodeError> {
        Ok(self.get(id)?.parent)
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, NodeError> {
        Ok(self.get(id)?.kind())
    }

    pub fn is_file(&self, id: NodeId) -> Result<bool, NodeError> {
        Ok(self.kind(id)?.is_file())
    }

    /// The children of the given kind, in increasing path order. A file has none.
    pub fn children(&self, id: NodeId, kind: NodeKind) -> Result<&[NodeId], NodeError> {
        Ok(self.get(id)?.children(kind).map_or(&[][..], Vec::as_slice))
    }

    pub fn child_count(&self, id: NodeId, kind: NodeKind) -> Result<usize, NodeError> {
        Ok(self.children(id, kind)?.len())
    }

    pub fn child_at(
        &self,
        id:    NodeId,
        index: usize,
        kind:  NodeKind,
    ) -> Result<NodeId, NodeError> {
        let node = self.get(id)?;
        let children = node.children(kind).map_or(&[][..], Vec::as_slice);
        children.get(index).copied().ok_or_else(|| NodeError::NoSuchChild {
            parent: node.path.clone(),
            index,
            len:    children.len(),
        })
    }

    /// Binary search the children of the given kind for `raw_path`, comparing with
    /// [`PathKey::compare_to_str`] so that no key needs to be built for the lookup.
    ///
    /// Returns whether the path was found, and either its index or the index at which a child
    /// with that path would be inserted. A file is treated as having no children.
    pub fn has_child_path(
        &self,
        id:       NodeId,
        raw_path: &str,
        kind:     NodeKind,
    ) -> Result<(bool, usize), NodeError> {
        let children = self.children(id, kind)?;
        Ok(match self.search(children, |sibling| sibling.compare_to_str(raw_path)) {
            Ok(index)  => (true, index),
            Err(index) => (false, index),
        })
    }

    pub fn contents(&self, id: NodeId) -> Result<&[u8], NodeError> {
        let node = self.get(id)?;
        match &node.payload {
            Payload::File { contents } => Ok(contents),
            Payload::Directory { .. }  => Err(NodeError::NotAFile(node.path.clone())),
        }
    }

    pub fn file_size(&self, id: NodeId) -> Result<usize, NodeError> {
        self.contents(id).map(<[u8]>::len)
    }

    /// Replace the contents of a file, returning the previous contents.
    pub fn set_contents(&mut self, id: NodeId, contents: Vec<u8>) -> Result<Vec<u8>, NodeError> {
        let node = self.get_mut(id)?;
        match &mut node.payload {
            Payload::File { contents: old } => Ok(std::mem::replace(old, contents)),
            Payload::Directory { .. }       => Err(NodeError::NotAFile(node.path.clone())),
        }
    }

    /// Create a node and link it into its parent's collection of children of its kind, at the
    /// position which keeps that collection sorted.
    ///
    /// `contents` is only used for files; a file created without contents is empty.
    ///
    /// # Errors
    /// - [`NodeError::StaleHandle`] if `parent` is not a live node.
    /// - [`NodeError::PathMismatch`] if the parent's path is not the parent of `path`.
    /// - [`NodeError::NotADirectory`] if the parent is a file.
    /// - [`NodeError::AlreadyExists`] if the parent has a child of the same kind at `path`.
    /// - [`NodeError::InvalidDepth`] if there is no parent, and `path` has depth greater than one.
    /// - [`NodeError::OutOfMemory`] if the node budget is exhausted or an allocation fails.
    ///
    /// On error, the arena is unchanged.
    pub fn create(
        &mut self,
        parent:   Option<NodeId>,
        path:     PathKey,
        contents: Option<Vec<u8>>,
        is_file:  bool,
    ) -> Result<NodeId, NodeError> {
        let kind = NodeKind::from_is_file(is_file);

        let link = match parent {
            Some(parent) => Some((parent, self.insertion_point(parent, &path, kind)?)),
            None if path.depth() == 1 => None,
            None => return Err(NodeError::InvalidDepth(path)),
        };

        if let Some(budget) = self.budget {
            if self.live >= budget {
                tracing::event!(
                    LogLevel::DEBUG,
                    "node budget of {budget} exhausted, refusing to create `{path}`",
                );
                return Err(NodeError::OutOfMemory);
            }
        }

        // Reserve everything up front, so that nothing below can fail partway through.
        if self.free.is_empty() {
            self.slots.try_reserve(1).map_err(|_| NodeError::OutOfMemory)?;
        }
        if let Some((parent, _)) = link {
            if let Some(siblings) = self.get_mut(parent)?.children_mut(kind) {
                siblings.try_reserve(1).map_err(|_| NodeError::OutOfMemory)?;
            }
        }

        let payload = if is_file {
            Payload::File { contents: contents.unwrap_or_default() }
        } else {
            Payload::Directory { files: Vec::new(), dirs: Vec::new() }
        };
        let id = self.allocate(Node { path, parent, payload });

        if let Some((parent, index)) = link {
            if let Some(siblings) = self.get_mut(parent)?.children_mut(kind) {
                siblings.insert(index, id);
            }
        }

        Ok(id)
    }

    /// Unlink a node from its parent, then release it and every one of its descendants.
    ///
    /// Returns the number of nodes released, including `id` itself. Every handle into the
    /// subtree is dead afterwards.
    pub fn destroy_subtree(&mut self, id: NodeId) -> Result<usize, NodeError> {
        let node = self.get(id)?;

        if let Some(parent) = node.parent {
            let kind = node.kind();
            let index = self.get(parent)
                .ok()
                .and_then(|parent| parent.children(kind))
                .and_then(|siblings| {
                    self.search(siblings, |sibling| sibling.cmp(&node.path))
                        .ok()
                        .filter(|&index| siblings.get(index) == Some(&id))
                });

            if let Some(index) = index {
                if let Some(siblings) = self.get_mut(parent)?.children_mut(kind) {
                    siblings.remove(index);
                }
            }
        }

        let mut released = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.release(next) else {
                continue;
            };
            released += 1;

            if let Payload::Directory { files, dirs } = node.payload {
                // Files are popped, and thus released, before directories.
                pending.extend(dirs.into_iter().rev());
                pending.extend(files.into_iter().rev());
            }
        }

        Ok(released)
    }
}

impl NodeArena {
    fn get(&self, id: NodeId) -> Result<&Node, NodeError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(NodeError::StaleHandle(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, NodeError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(NodeError::StaleHandle(id))
    }

    /// Binary search a sorted collection of siblings.
    fn search<F>(&self, siblings: &[NodeId], mut cmp: F) -> Result<usize, usize>
    where
        F: FnMut(&PathKey) -> Ordering,
    {
        siblings.binary_search_by(|&sibling| {
            // A dead sibling is a broken invariant, which the checker reports. Here, it is
            // treated as sorting first.
            self.get(sibling)
                .map(|sibling| cmp(&sibling.path))
                .unwrap_or(Ordering::Less)
        })
    }

    fn insertion_point(
        &self,
        parent: NodeId,
        path:   &PathKey,
        kind:   NodeKind,
    ) -> Result<usize, NodeError> {
        let parent = self.get(parent)?;

        if !parent.path.is_parent_of(path) {
            return Err(NodeError::PathMismatch {
                parent: parent.path.clone(),
                path:   path.clone(),
            });
        }
        let Some(siblings) = parent.children(kind) else {
            return Err(NodeError::NotADirectory(parent.path.clone()));
        };

        match self.search(siblings, |sibling| sibling.cmp(path)) {
            Ok(_)      => Err(NodeError::AlreadyExists(path.clone())),
            Err(index) => Ok(index),
        }
    }

    /// Place a node in a free slot. Space must already be reserved.
    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len();
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    /// Take a node out of its slot, without touching its parent or children.
    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;

        Some(node)
    }
}

/// Tools for deliberately breaking invariants, so that the checker can be tested.
#[cfg(test)]
impl NodeArena {
    pub(crate) fn corrupt_path(&mut self, id: NodeId, path: PathKey) {
        self.get_mut(id).unwrap().path = path;
    }

    pub(crate) fn corrupt_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.get_mut(id).unwrap().parent = parent;
    }

    pub(crate) fn corrupt_swap_children(
        &mut self,
        id:   NodeId,
        kind: NodeKind,
        a:    usize,
        b:    usize,
    ) {
        self.get_mut(id).unwrap().children_mut(kind).unwrap().swap(a, b);
    }

    pub(crate) fn corrupt_push_child(&mut self, id: NodeId, kind: NodeKind, child: NodeId) {
        self.get_mut(id).unwrap().children_mut(kind).unwrap().push(child);
    }

    /// Release a single node without unlinking it from its parent or releasing its children.
    pub(crate) fn corrupt_release(&mut self, id: NodeId) {
        self.release(id).unwrap();
    }
}

/// A read-only view of a live node, borrowed from its arena.
///
/// Since the view borrows the arena, the arena cannot be mutated (and the node cannot be
/// released) while the view exists.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    id:    NodeId,
    node:  &'a Node,
}

impl<'a> NodeRef<'a> {
    #[inline]
    #[must_use]
    pub const fn id(self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn path(self) -> &'a PathKey {
        &self.node.path
    }

    #[inline]
    #[must_use]
    pub fn depth(self) -> usize {
        self.node.path.depth()
    }

    /// The parent of this node, or `None` for a root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node.parent.and_then(|parent| self.arena.node(parent).ok())
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        self.node.kind()
    }

    #[inline]
    #[must_use]
    pub const fn is_file(self) -> bool {
        self.kind().is_file()
    }

    /// The contents of a file, or `None` for a directory.
    #[must_use]
    pub fn contents(self) -> Option<&'a [u8]> {
        match &self.node.payload {
            Payload::File { contents } => Some(contents),
            Payload::Directory { .. }  => None,
        }
    }

    #[must_use]
    pub fn file_size(self) -> Option<usize> {
        self.contents().map(<[u8]>::len)
    }

    #[must_use]
    pub fn child_count(self, kind: NodeKind) -> usize {
        self.node.children(kind).map_or(0, Vec::len)
    }

    pub fn child_at(self, index: usize, kind: NodeKind) -> Result<Self, NodeError> {
        self.arena.node(self.arena.child_at(self.id, index, kind)?)
    }

    /// The children of the given kind, in increasing path order.
    pub fn children(self, kind: NodeKind) -> impl DoubleEndedIterator<Item = Self> + 'a {
        let arena = self.arena;
        self.node
            .children(kind)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(move |&child| arena.node(child).ok())
    }
}

impl Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("path", &self.node.path)
            .field("kind", &self.kind())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    fn key(raw: &str) -> PathKey {
        PathKey::new(raw).unwrap()
    }

    fn dir(arena: &mut NodeArena, parent: Option<NodeId>, raw: &str) -> NodeId {
        arena.create(parent, key(raw), None, false).unwrap()
    }

    fn file(arena: &mut NodeArena, parent: NodeId, raw: &str, contents: &[u8]) -> NodeId {
        arena.create(Some(parent), key(raw), Some(contents.to_vec()), true).unwrap()
    }

    fn paths(arena: &NodeArena, id: NodeId, kind: NodeKind) -> Vec<String> {
        arena.node(id).unwrap()
            .children(kind)
            .map(|child| child.path().to_string())
            .collect()
    }

    #[test]
    fn children_are_kept_sorted_per_kind() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");

        for name in ["m", "c", "x", "a"] {
            dir(&mut arena, Some(root), &format!("/r/{name}"));
        }
        for name in ["q", "b", "z"] {
            file(&mut arena, root, &format!("/r/{name}.txt"), b"");
        }

        assert_eq!(paths(&arena, root, NodeKind::Directory), ["/r/a", "/r/c", "/r/m", "/r/x"]);
        assert_eq!(paths(&arena, root, NodeKind::File), ["/r/b.txt", "/r/q.txt", "/r/z.txt"]);
        assert_eq!(arena.child_count(root, NodeKind::Directory).unwrap(), 4);
        assert_eq!(arena.len(), 8);
    }

    #[test]
    fn creation_failures() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");
        let leaf = file(&mut arena, root, "/r/f", b"data");

        assert_eq!(
            arena.create(None, key("/r/orphan"), None, false),
            Err(NodeError::InvalidDepth(key("/r/orphan"))),
        );
        assert_eq!(
            arena.create(Some(root), key("/r/a/b"), None, false),
            Err(NodeError::PathMismatch { parent: key("/r"), path: key("/r/a/b") }),
        );
        assert_eq!(
            arena.create(Some(root), key("/s/a"), None, false),
            Err(NodeError::PathMismatch { parent: key("/r"), path: key("/s/a") }),
        );
        assert_eq!(
            arena.create(Some(root), key("/r/f"), None, true),
            Err(NodeError::AlreadyExists(key("/r/f"))),
        );
        assert_eq!(
            arena.create(Some(leaf), key("/r/f/g"), None, false),
            Err(NodeError::NotADirectory(key("/r/f"))),
        );

        // Nothing was created by the failed attempts.
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn same_path_may_exist_once_per_kind() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");

        // The arena only forbids duplicates within one kind; the tree forbids the rest.
        dir(&mut arena, Some(root), "/r/x");
        file(&mut arena, root, "/r/x", b"");
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn lookups_by_raw_path() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");
        for name in ["b", "d", "f"] {
            dir(&mut arena, Some(root), &format!("/r/{name}"));
        }

        assert_eq!(arena.has_child_path(root, "/r/d", NodeKind::Directory).unwrap(), (true, 1));
        assert_eq!(arena.has_child_path(root, "/r/e", NodeKind::Directory).unwrap(), (false, 2));
        assert_eq!(arena.has_child_path(root, "/r/a", NodeKind::Directory).unwrap(), (false, 0));
        assert_eq!(arena.has_child_path(root, "/r/d", NodeKind::File).unwrap(), (false, 0));

        let found = arena.child_at(root, 1, NodeKind::Directory).unwrap();
        assert_eq!(arena.path(found).unwrap(), &key("/r/d"));
        assert_eq!(arena.parent(found).unwrap(), Some(root));
        assert_eq!(
            arena.child_at(root, 3, NodeKind::Directory),
            Err(NodeError::NoSuchChild { parent: key("/r"), index: 3, len: 3 }),
        );
    }

    #[test]
    fn contents_belong_to_files() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");
        let leaf = file(&mut arena, root, "/r/f", b"hello");

        assert_eq!(arena.contents(leaf).unwrap(), b"hello");
        assert_eq!(arena.file_size(leaf).unwrap(), 5);
        assert_eq!(arena.set_contents(leaf, b"bye".to_vec()).unwrap(), b"hello");
        assert_eq!(arena.contents(leaf).unwrap(), b"bye");

        assert_eq!(arena.contents(root), Err(NodeError::NotAFile(key("/r"))));
        assert_eq!(arena.set_contents(root, Vec::new()), Err(NodeError::NotAFile(key("/r"))));

        let empty = arena.create(Some(root), key("/r/empty"), None, true).unwrap();
        assert_eq!(arena.contents(empty).unwrap(), b"");
    }

    #[test]
    fn destroying_a_subtree_releases_every_descendant() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");
        let a = dir(&mut arena, Some(root), "/r/a");
        let b = dir(&mut arena, Some(a), "/r/a/b");
        let c = file(&mut arena, b, "/r/a/b/c", b"c");
        let d = file(&mut arena, a, "/r/a/d", b"d");
        let keep = dir(&mut arena, Some(root), "/r/keep");

        assert_eq!(arena.destroy_subtree(a).unwrap(), 4);
        assert_eq!(arena.len(), 2);
        for dead in [a, b, c, d] {
            assert!(!arena.contains(dead));
            assert_eq!(arena.path(dead), Err(NodeError::StaleHandle(dead)));
        }
        assert_eq!(paths(&arena, root, NodeKind::Directory), ["/r/keep"]);

        assert_eq!(arena.destroy_subtree(a), Err(NodeError::StaleHandle(a)));

        assert_eq!(arena.destroy_subtree(root).unwrap(), 2);
        assert!(!arena.contains(keep));
        assert!(arena.is_empty());
    }

    #[test]
    fn reused_slots_do_not_revive_old_handles() {
        let mut arena = NodeArena::new();
        let old = dir(&mut arena, None, "/old");
        arena.destroy_subtree(old).unwrap();

        let new = dir(&mut arena, None, "/new");
        assert_ne!(old, new);
        assert!(!arena.contains(old));
        assert_eq!(arena.path(new).unwrap(), &key("/new"));
    }

    #[test]
    fn budget_limits_live_nodes() {
        let mut arena = NodeArena::with_budget(Some(2));
        let root = dir(&mut arena, None, "/r");
        let a = dir(&mut arena, Some(root), "/r/a");

        assert_eq!(
            arena.create(Some(root), key("/r/b"), None, false),
            Err(NodeError::OutOfMemory),
        );

        arena.destroy_subtree(a).unwrap();
        dir(&mut arena, Some(root), "/r/b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn node_refs_navigate_both_ways() {
        let mut arena = NodeArena::new();
        let root = dir(&mut arena, None, "/r");
        let sub = dir(&mut arena, Some(root), "/r/sub");
        file(&mut arena, sub, "/r/sub/f", b"xyz");

        let sub_ref = arena.node(sub).unwrap();
        let leaf = sub_ref.child_at(0, NodeKind::File).unwrap();

        assert_eq!(leaf.file_size(), Some(3));
        assert_eq!(leaf.parent().unwrap().id(), sub);
        assert_eq!(sub_ref.parent().unwrap().path(), &key("/r"));
        assert!(arena.node(root).unwrap().parent().is_none());
        assert_eq!(sub_ref.contents(), None);
        assert_eq!(sub_ref.depth(), 2);
        assert!(sub_ref.child_at(1, NodeKind::File).is_err());
    }
}
