use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::Level as LogLevel;

use filetree_path::PathKey;

use crate::{
    checker::{self, InvariantViolation},
    error::TreeError,
    node::{NodeArena, NodeId, NodeKind, NodeRef},
    options::{CheckMode, TreeOptions},
};


/// What [`Tree::stat`] reports about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Directory,
    File {
        size: usize,
    },
}

impl Stat {
    #[inline]
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// The size of a file, in bytes, or `None` for a directory.
    #[inline]
    #[must_use]
    pub const fn size(self) -> Option<usize> {
        match self {
            Self::File { size } => Some(size),
            Self::Directory     => None,
        }
    }
}


/// An in-memory hierarchy of directories and files under a single root directory.
///
/// A tree starts out uninitialized; [`Tree::init`] makes it usable, and [`Tree::destroy`]
/// releases every node and returns it to the uninitialized state. Paths are absolute strings
/// like `/root/dir/file.txt`, parsed with [`PathKey::new`].
///
/// Inserting a path creates any missing ancestors as directories. Within each directory, files
/// and subdirectories are kept in two separately sorted collections, and every traversal
/// (including [`Tree::render_all`]) visits a directory's files before its subdirectories.
///
/// Depending on [`TreeOptions::check_mode`], the full invariant checker runs before and after
/// every mutation, and a violation panics.
#[derive(Debug, Default)]
pub struct Tree {
    arena:       NodeArena,
    initialized: bool,
    root:        Option<NodeId>,
    /// Maintained incrementally; the checker recounts it from scratch.
    count:       usize,
    check_mode:  CheckMode,
}

impl Tree {
    /// Create an uninitialized tree.
    #[must_use]
    pub fn new(options: TreeOptions) -> Self {
        Self {
            arena:       NodeArena::with_budget(options.node_budget),
            initialized: false,
            root:        None,
            count:       0,
            check_mode:  options.check_mode,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The number of nodes in the tree.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.and_then(|root| self.arena.node(root).ok())
    }

    /// The arena holding this tree's nodes, for read-only inspection.
    #[inline]
    #[must_use]
    pub const fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn init(&mut self) -> Result<(), TreeError> {
        self.guard("before init");

        if self.initialized {
            return Err(TreeError::AlreadyInitialized);
        }
        self.initialized = true;
        self.root = None;
        self.count = 0;

        self.guard("after init");
        Ok(())
    }

    /// Release every node and return to the uninitialized state.
    pub fn destroy(&mut self) -> Result<(), TreeError> {
        self.guard("before destroy");

        if !self.initialized {
            return Err(TreeError::NotInitialized);
        }
        if let Some(root) = self.root.take() {
            self.count -= self.arena.destroy_subtree(root)?;
        }
        self.initialized = false;

        self.guard("after destroy");
        Ok(())
    }

    /// Insert a directory, along with any missing ancestors.
    ///
    /// Returns the number of directories created.
    ///
    /// # Errors
    /// - [`TreeError::NotInitialized`] if the tree is not initialized.
    /// - [`TreeError::BadPath`] if `path` is not a valid absolute path.
    /// - [`TreeError::ConflictingPath`] if the tree has a root which is not an ancestor of `path`.
    /// - [`TreeError::AlreadyInTree`] if a file or directory already exists at `path`.
    /// - [`TreeError::NotADirectory`] if an ancestor of `path` is a file.
    /// - [`TreeError::OutOfMemory`] if a node could not be created. The tree is left as it was.
    pub fn insert_directory(&mut self, path: &str) -> Result<usize, TreeError> {
        self.insert(path, None)
    }

    /// Insert a file with the given contents, along with any missing ancestor directories.
    ///
    /// Returns the number of nodes created, including the file itself.
    ///
    /// # Errors
    /// The same as [`Tree::insert_directory`], and additionally, a file may not be the root of
    /// the tree: inserting a file of depth one fails with [`TreeError::ConflictingPath`].
    pub fn insert_file(
        &mut self,
        path:     &str,
        contents: impl Into<Vec<u8>>,
    ) -> Result<usize, TreeError> {
        self.insert(path, Some(contents.into()))
    }

    /// Remove a directory and everything beneath it.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    /// - [`TreeError::NotInitialized`] if the tree is not initialized.
    /// - [`TreeError::BadPath`] if `path` is not a valid absolute path.
    /// - [`TreeError::NoSuchPath`] if nothing exists at `path`.
    /// - [`TreeError::NotADirectory`] if `path` is a file.
    pub fn remove_directory(&mut self, path: &str) -> Result<usize, TreeError> {
        self.remove(path, NodeKind::Directory)
    }

    /// Remove a file.
    ///
    /// # Errors
    /// The same as [`Tree::remove_directory`], except that [`TreeError::NotAFile`] is returned
    /// if `path` is a directory.
    pub fn remove_file(&mut self, path: &str) -> Result<usize, TreeError> {
        self.remove(path, NodeKind::File)
    }

    /// Whether a directory exists at `path`. Any error, including a malformed path, yields
    /// `false`.
    #[must_use]
    pub fn contains_directory(&self, path: &str) -> bool {
        self.find_kind(path) == Some(NodeKind::Directory)
    }

    /// Whether a file exists at `path`. Any error, including a malformed path, yields `false`.
    #[must_use]
    pub fn contains_file(&self, path: &str) -> bool {
        self.find_kind(path) == Some(NodeKind::File)
    }

    /// The contents of the file at `path`, or `None` if there is no file there (for any reason).
    #[must_use]
    pub fn get_file_contents(&self, path: &str) -> Option<&[u8]> {
        let id = self.find_node(path).ok()?;
        self.arena.contents(id).ok()
    }

    /// Replace the contents of the file at `path`, returning the previous contents; or, if there
    /// is no file there (for any reason), return `None` and change nothing.
    pub fn replace_file_contents(
        &mut self,
        path:     &str,
        contents: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.guard("before replacing file contents");

        let id = self.find_node(path).ok()?;
        let previous = self.arena.set_contents(id, contents.into()).ok()?;

        self.guard("after replacing file contents");
        Some(previous)
    }

    /// Whether `path` is a file or a directory, and the size of a file.
    pub fn stat(&self, path: &str) -> Result<Stat, TreeError> {
        let node = self.arena.node(self.find_node(path)?)?;

        Ok(match node.file_size() {
            Some(size) => Stat::File { size },
            None       => Stat::Directory,
        })
    }

    /// Every path in the tree in pre-order, one per line, each followed by a newline.
    /// A directory's files are listed before its subdirectories.
    ///
    /// Returns `None` if the tree is not initialized.
    #[must_use]
    pub fn render_all(&self) -> Option<String> {
        if !self.initialized {
            return None;
        }

        let mut rendered = String::new();
        for node in self.iter() {
            rendered.push_str(node.path().as_str());
            rendered.push('\n');
        }
        Some(rendered)
    }

    /// Iterate over every node in the order used by [`Tree::render_all`].
    #[must_use]
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            arena:   &self.arena,
            pending: Vec::from_iter(self.root),
        }
    }

    /// Run the full invariant checker, regardless of the configured [`CheckMode`].
    pub fn check(&self) -> Result<(), InvariantViolation> {
        checker::tree_is_valid(&self.arena, self.initialized, self.root, self.count)
    }
}

impl Tree {
    /// Run the checker if enabled, and panic if the tree is broken.
    #[expect(clippy::panic, reason = "a broken invariant is a bug, which should not be survivable")]
    fn guard(&self, stage: &str) {
        if self.check_mode.is_enabled() {
            if let Err(violation) = self.check() {
                panic!("file tree invariant violated {stage}: {violation}");
            }
        }
    }

    /// Find the deepest node in the tree whose path is a prefix of `path`.
    ///
    /// Returns `None` if the tree is empty, or if its root is not a prefix of `path`.
    fn traverse(&self, path: &PathKey) -> Result<Option<NodeId>, TreeError> {
        let Some(root) = self.root else {
            return Ok(None);
        };
        if !self.arena.path(root)?.is_prefix_of(path) {
            return Ok(None);
        }

        let mut current = root;
        'levels: for depth in 2..=path.depth() {
            let Some(prefix) = path.prefix_str(depth) else {
                break;
            };

            for kind in [NodeKind::File, NodeKind::Directory] {
                let (found, index) = self.arena.has_child_path(current, prefix, kind)?;
                if found {
                    current = self.arena.child_at(current, index, kind)?;
                    continue 'levels;
                }
            }

            // This is as far as the tree goes.
            break;
        }

        Ok(Some(current))
    }

    /// Find the node at exactly `path`.
    fn find_node(&self, path: &str) -> Result<NodeId, TreeError> {
        if !self.initialized {
            return Err(TreeError::NotInitialized);
        }
        let path = PathKey::new(path)?;

        match self.traverse(&path)? {
            Some(found) if self.arena.path(found)? == &path => Ok(found),
            _ => Err(TreeError::NoSuchPath(path)),
        }
    }

    fn find_kind(&self, path: &str) -> Option<NodeKind> {
        self.find_node(path)
            .ok()
            .and_then(|found| self.arena.kind(found).ok())
    }

    /// Shared implementation of `insert_directory` (with `None`) and `insert_file`.
    fn insert(&mut self, path: &str, file_contents: Option<Vec<u8>>) -> Result<usize, TreeError> {
        self.guard("before insertion");

        if !self.initialized {
            return Err(TreeError::NotInitialized);
        }
        let path = PathKey::new(path)?;
        let is_file = file_contents.is_some();

        let (parent, first_depth) = match self.traverse(&path)? {
            None if self.root.is_some() => return Err(TreeError::ConflictingPath(path)),
            // The root must be a directory.
            None if is_file && path.depth() == 1 => return Err(TreeError::ConflictingPath(path)),
            None => (None, 1),
            Some(ancestor) => {
                let ancestor_ref = self.arena.node(ancestor)?;
                if ancestor_ref.path() == &path {
                    return Err(TreeError::AlreadyInTree(path));
                }
                if ancestor_ref.is_file() {
                    return Err(TreeError::NotADirectory(ancestor_ref.path().clone()));
                }
                (Some(ancestor), ancestor_ref.depth() + 1)
            }
        };

        let mut chain = Chain { first: None, created: 0 };
        let built = self.build_chain(&path, parent, first_depth, file_contents, &mut chain);

        if let Err(err) = built {
            self.roll_back(&chain, &path);
            self.guard("after rolling back an insertion");
            return Err(err);
        }

        if self.root.is_none() {
            self.root = chain.first;
        }
        self.count += chain.created;

        tracing::event!(
            LogLevel::DEBUG,
            "inserted {} `{path}`, creating {} nodes",
            NodeKind::from_is_file(is_file),
            chain.created,
        );

        self.guard("after insertion");
        Ok(chain.created)
    }

    /// Create one node per level of `path` from `first_depth` downwards, recording progress in
    /// `chain` so that the caller can undo it on failure.
    fn build_chain(
        &mut self,
        path:          &PathKey,
        mut parent:    Option<NodeId>,
        first_depth:   usize,
        mut contents:  Option<Vec<u8>>,
        chain:         &mut Chain,
    ) -> Result<(), TreeError> {
        let is_file = contents.is_some();

        for depth in first_depth..=path.depth() {
            let last = depth == path.depth();
            let level = path.prefix(depth)?;
            let level_contents = if last { contents.take() } else { None };

            let created = self.arena.create(parent, level, level_contents, is_file && last)?;

            chain.first.get_or_insert(created);
            chain.created += 1;
            parent = Some(created);
        }

        Ok(())
    }

    fn roll_back(&mut self, chain: &Chain, path: &PathKey) {
        let Some(first) = chain.first else {
            return;
        };

        match self.arena.destroy_subtree(first) {
            Ok(released) => tracing::event!(
                LogLevel::DEBUG,
                "rolled back {released} nodes created while inserting `{path}`",
            ),
            Err(err) => tracing::event!(
                LogLevel::ERROR,
                "could not roll back a partial insertion of `{path}`: {err}",
            ),
        }
    }

    fn remove(&mut self, path: &str, kind: NodeKind) -> Result<usize, TreeError> {
        self.guard("before removal");

        let found = self.find_node(path)?;
        let found_ref = self.arena.node(found)?;
        match (kind, found_ref.kind()) {
            (NodeKind::File, NodeKind::Directory) => {
                return Err(TreeError::NotAFile(found_ref.path().clone()));
            }
            (NodeKind::Directory, NodeKind::File) => {
                return Err(TreeError::NotADirectory(found_ref.path().clone()));
            }
            _ => {}
        }

        let removed = self.arena.destroy_subtree(found)?;
        self.count -= removed;
        if self.count == 0 {
            self.root = None;
        }

        tracing::event!(LogLevel::DEBUG, "removed {kind} `{path}` and {removed} nodes in total");

        self.guard("after removal");
        Ok(removed)
    }
}

impl Display for Tree {
    /// Writes the same text as [`Tree::render_all`], or nothing if uninitialized.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.initialized {
            for node in self.iter() {
                writeln!(f, "{}", node.path())?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = NodeRef<'a>;
    type IntoIter = PreOrder<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Progress through the creation of a chain of new nodes.
#[derive(Debug)]
struct Chain {
    first:   Option<NodeId>,
    created: usize,
}


/// Pre-order iterator over the nodes of a [`Tree`]: each directory, then its files, then its
/// subdirectories, each in increasing path order.
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    arena:   &'a NodeArena,
    pending: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.pending.pop()?;
            let Ok(node) = self.arena.node(next) else {
                continue;
            };

            for kind in [NodeKind::Directory, NodeKind::File] {
                if let Ok(children) = self.arena.children(next, kind) {
                    self.pending.extend(children.iter().rev());
                }
            }
            return Some(node);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    fn always_checked() -> Tree {
        let mut tree = Tree::new(TreeOptions::new().with_check_mode(CheckMode::Always));
        tree.init().unwrap();
        tree
    }

    fn traversed(tree: &Tree, raw: &str) -> Option<String> {
        let path = PathKey::new(raw).unwrap();
        tree.traverse(&path)
            .unwrap()
            .map(|found| tree.arena.path(found).unwrap().to_string())
    }

    #[test]
    fn traverse_finds_the_deepest_existing_prefix() {
        let mut tree = always_checked();
        assert_eq!(traversed(&tree, "/r/a"), None);

        tree.insert_directory("/r/a/b").unwrap();
        tree.insert_file("/r/a/f", b"x".to_vec()).unwrap();

        assert_eq!(traversed(&tree, "/r").as_deref(), Some("/r"));
        assert_eq!(traversed(&tree, "/r/a/b/c/d").as_deref(), Some("/r/a/b"));
        assert_eq!(traversed(&tree, "/r/a/f").as_deref(), Some("/r/a/f"));
        assert_eq!(traversed(&tree, "/r/a/f/g").as_deref(), Some("/r/a/f"));
        assert_eq!(traversed(&tree, "/r/z").as_deref(), Some("/r"));
        assert_eq!(traversed(&tree, "/s/a"), None);
        assert_eq!(traversed(&tree, "/r-a"), None);
    }

    #[test]
    fn failed_chains_are_rolled_back() {
        let mut tree = Tree::new(
            TreeOptions::new()
                .with_check_mode(CheckMode::Always)
                .with_node_budget(Some(3)),
        );
        tree.init().unwrap();
        tree.insert_directory("/r").unwrap();

        assert_eq!(tree.insert_file("/r/a/b/c", "data"), Err(TreeError::OutOfMemory));
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.arena.len(), 1);
        assert!(!tree.contains_directory("/r/a"));
        assert_eq!(tree.render_all().as_deref(), Some("/r\n"));

        // Exactly at the budget succeeds.
        assert_eq!(tree.insert_file("/r/a/b", "data"), Ok(2));
        assert_eq!(tree.count(), 3);
    }

    #[test]
    fn failed_chains_from_an_empty_tree_leave_no_root() {
        let mut tree = Tree::new(
            TreeOptions::new()
                .with_check_mode(CheckMode::Always)
                .with_node_budget(Some(1)),
        );
        tree.init().unwrap();

        assert_eq!(tree.insert_directory("/a/b"), Err(TreeError::OutOfMemory));
        assert!(tree.root().is_none());
        assert_eq!(tree.count(), 0);
        assert!(tree.arena.is_empty());
        tree.check().unwrap();

        assert_eq!(tree.insert_directory("/a"), Ok(1));
    }

    #[test]
    #[should_panic = "invariant violated before insertion"]
    fn corruption_is_caught_before_the_next_mutation() {
        let mut tree = always_checked();
        tree.insert_directory("/r/a").unwrap();
        tree.insert_directory("/r/b").unwrap();

        let root = tree.root.unwrap();
        tree.arena.corrupt_swap_children(root, NodeKind::Directory, 0, 1);

        let _ = tree.insert_directory("/r/c");
    }

    #[test]
    fn unchecked_trees_do_not_panic() {
        let mut tree = Tree::new(TreeOptions::new().with_check_mode(CheckMode::Never));
        tree.init().unwrap();
        tree.insert_directory("/r/a").unwrap();

        let root = tree.root.unwrap();
        let a = tree.arena.child_at(root, 0, NodeKind::Directory).unwrap();
        tree.arena.corrupt_parent(a, None);

        assert!(tree.insert_directory("/r/b").is_ok());
        assert!(matches!(tree.check(), Err(InvariantViolation::BrokenParentLink { .. })));
    }

    #[test]
    fn removing_the_root_empties_the_tree() {
        let mut tree = always_checked();
        tree.insert_file("/r/a/f", "").unwrap();

        assert_eq!(tree.remove_directory("/r"), Ok(3));
        assert!(tree.root().is_none());
        assert!(tree.is_initialized());
        assert_eq!(tree.render_all().as_deref(), Some(""));

        // A different root may now be chosen.
        assert_eq!(tree.insert_directory("/s"), Ok(1));
    }

    #[test]
    fn stat_reports_kind_and_size() {
        let mut tree = always_checked();
        tree.insert_file("/r/f", vec![0_u8; 17]).unwrap();

        assert_eq!(tree.stat("/r"), Ok(Stat::Directory));
        assert_eq!(tree.stat("/r/f"), Ok(Stat::File { size: 17 }));
        assert_eq!(tree.stat("/r/f").unwrap().size(), Some(17));
        assert!(!tree.stat("/r").unwrap().is_file());
        assert_eq!(
            tree.stat("/r/g"),
            Err(TreeError::NoSuchPath(PathKey::new("/r/g").unwrap())),
        );
    }

    #[test]
    fn display_matches_render_all() {
        let mut tree = always_checked();
        assert_eq!(Tree::default().to_string(), "");

        tree.insert_directory("/r/b").unwrap();
        tree.insert_file("/r/z", "").unwrap();
        tree.insert_file("/r/b/a", "").unwrap();

        assert_eq!(tree.to_string(), tree.render_all().unwrap());
        assert_eq!(tree.to_string(), "/r\n/r/z\n/r/b\n/r/b/a\n");
        assert_eq!(tree.iter().count(), tree.count());
    }
}
