//! Path keys for an in-memory file tree.
//!
//! A [`PathKey`] is an absolute path such as `/usr/lib/libc.so`, stored in a canonical rendering
//! alongside the boundaries of its components. Everything a file tree needs to reason about
//! ancestry (depth, prefixes, shared prefixes, and a total order for sorting siblings) is
//! computed from those boundaries without reparsing.

mod error;
mod key;


pub use self::{
    error::{MalformedReason, PathError},
    key::{Components, PathKey, SEPARATOR},
};
