//! An in-memory hierarchy of directories and files.
//!
//! A [`Tree`] holds a single root directory, beneath which directories and files are addressed
//! by absolute paths (see [`PathKey`]). Inserting a path creates its missing ancestors; removing
//! a directory removes everything beneath it. Failed insertions leave the tree untouched.
//!
//! Nodes live in a [`NodeArena`] and refer to each other by [`NodeId`] handles, so a node's
//! parent link never owns anything. The [`checker`] module can verify every structural
//! invariant of a tree from scratch, and a [`Tree`] runs it around each mutation according to
//! its [`CheckMode`].
//!
//! ```
//! use filetree::{Tree, TreeOptions};
//!
//! let mut tree = Tree::new(TreeOptions::new());
//! tree.init().unwrap();
//! assert_eq!(tree.insert_file("/home/user/notes.txt", "hello").unwrap(), 3);
//! assert_eq!(tree.get_file_contents("/home/user/notes.txt"), Some(&b"hello"[..]));
//! assert_eq!(
//!     tree.render_all().unwrap(),
//!     "/home\n/home/user\n/home/user/notes.txt\n",
//! );
//! ```

pub mod checker;

mod error;
mod node;
mod options;
mod tree;


pub use filetree_path::{PathError, PathKey};

pub use self::{
    error::{NodeError, TreeError},
    node::{NodeArena, NodeId, NodeKind, NodeRef},
    options::{CheckMode, TreeOptions},
    tree::{PreOrder, Stat, Tree},
};
