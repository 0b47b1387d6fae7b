use std::{cmp::Ordering, iter::FusedIterator, str::Split};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    str::FromStr,
};

use crate::error::{MalformedReason, PathError};


/// The separator between the components of a path, and the marker of an absolute path.
pub const SEPARATOR: char = '/';


/// An immutable absolute path, such as `/a/b/c`, with a depth of at least one.
///
/// Keys are ordered component by component, comparing each component's bytes. This is not
/// the same as comparing the rendered strings: `/a/b` sorts before `/a-b`, since `a` is a
/// proper prefix of `a-`, even though `/` is greater than `-`. Among siblings (keys of equal
/// depth sharing every component but the last) the two orders agree.
#[derive(Clone)]
pub struct PathKey {
    /// Canonical rendering: a `/` before each component, with no trailing `/`.
    text: Box<str>,
    /// `ends[i]` is the byte offset in `text` just past component `i`.
    ///
    /// Invariants: nonempty, strictly increasing, and the last offset equals `text.len()`.
    ends: Box<[usize]>,
}

impl PathKey {
    /// Parse an absolute path.
    ///
    /// The path must start with `/`, contain at least one component, and must not contain
    /// empty, `.`, or `..` components, nor any NUL byte. No normalization is performed;
    /// anything that would require normalization is rejected.
    pub fn new(raw: &str) -> Result<Self, PathError> {
        let malformed = |reason| PathError::Malformed { path: raw.to_owned(), reason };

        if raw.is_empty() {
            return Err(malformed(MalformedReason::Empty));
        }
        if raw.contains('\0') {
            return Err(malformed(MalformedReason::NulByte));
        }
        let Some(relative) = raw.strip_prefix(SEPARATOR) else {
            return Err(malformed(MalformedReason::NotAbsolute));
        };
        if relative.is_empty() {
            return Err(malformed(MalformedReason::BareRoot));
        }

        let mut ends = Vec::new();
        // Skip the leading separator.
        let mut offset = 1;
        for component in relative.split(SEPARATOR) {
            if component.is_empty() {
                return Err(malformed(MalformedReason::EmptyComponent));
            }
            if component == "." || component == ".." {
                return Err(malformed(MalformedReason::DotComponent));
            }
            offset += component.len();
            ends.push(offset);
            offset += SEPARATOR.len_utf8();
        }

        Ok(Self {
            text: raw.into(),
            ends: ends.into_boxed_slice(),
        })
    }

    /// The number of components in the path. Always at least one.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ends.len()
    }

    /// The canonical rendering of the path.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> Components<'_> {
        Components::over(&self.text)
    }

    /// The component at zero-based `index`, if the path is deep enough.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<&str> {
        let end = *self.ends.get(index)?;
        let start = match index.checked_sub(1) {
            Some(prev) => self.ends[prev] + SEPARATOR.len_utf8(),
            None       => SEPARATOR.len_utf8(),
        };
        self.text.get(start..end)
    }

    /// The final component of the path; for `/a/b/c`, this is `c`.
    #[must_use]
    pub fn last_component(&self) -> &str {
        self.text.rsplit(SEPARATOR).next().unwrap_or("")
    }

    /// The path truncated to its first `depth` components.
    ///
    /// # Errors
    /// Returns [`PathError::DepthOutOfRange`] if `depth` is zero or exceeds `self.depth()`.
    pub fn prefix(&self, depth: usize) -> Result<Self, PathError> {
        let Some(text) = self.prefix_str(depth) else {
            return Err(PathError::DepthOutOfRange {
                requested: depth,
                depth:     self.depth(),
            });
        };

        Ok(Self {
            text: text.into(),
            ends: self.ends[..depth].into(),
        })
    }

    /// The rendering of [`self.prefix(depth)`], borrowed from `self` instead of allocated.
    ///
    /// Returns `None` in the same cases that `prefix` returns an error.
    ///
    /// [`self.prefix(depth)`]: PathKey::prefix
    #[must_use]
    pub fn prefix_str(&self, depth: usize) -> Option<&str> {
        let end = *self.ends.get(depth.checked_sub(1)?)?;
        self.text.get(..end)
    }

    /// The path with its last component removed, or `None` for a path of depth one.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.depth()
            .checked_sub(1)
            .and_then(|depth| self.prefix(depth).ok())
    }

    /// The length of the longest run of leading components shared by `self` and `other`.
    #[must_use]
    pub fn shared_prefix_depth(&self, other: &Self) -> usize {
        self.components()
            .zip(other.components())
            .take_while(|(lhs, rhs)| lhs == rhs)
            .count()
    }

    /// Whether `self` is `other` or one of its ancestors.
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.shared_prefix_depth(other) == self.depth()
    }

    /// Whether `self` is exactly one level above `other`, along the same branch.
    #[inline]
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.depth() == self.depth() + 1 && self.is_prefix_of(other)
    }

    /// Compare against a raw path string, as though it were first parsed into a `PathKey`,
    /// without allocating.
    ///
    /// For any string `raw` accepted by [`PathKey::new`], this agrees with
    /// `self.cmp(&PathKey::new(raw)?)`. Malformed strings are still given a consistent
    /// position in the order, by splitting them on `/` after an optional leading `/`.
    #[must_use]
    pub fn compare_to_str(&self, raw: &str) -> Ordering {
        self.components().cmp(Components::over(raw))
    }
}

impl PartialEq for PathKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // `ends` is determined by `text`.
        self.text == other.text
    }
}

impl Eq for PathKey {}

impl Hash for PathKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for PathKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl Debug for PathKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("PathKey").field(&&*self.text).finish()
    }
}

impl Display for PathKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.text)
    }
}

impl FromStr for PathKey {
    type Err = PathError;

    #[inline]
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::new(raw)
    }
}

impl TryFrom<&str> for PathKey {
    type Error = PathError;

    #[inline]
    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl AsRef<str> for PathKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.text
    }
}


/// Iterator over the components of a path, from the root downwards.
#[derive(Debug, Clone)]
pub struct Components<'a>(Split<'a, char>);

impl<'a> Components<'a> {
    fn over(raw: &'a str) -> Self {
        Self(raw.strip_prefix(SEPARATOR).unwrap_or(raw).split(SEPARATOR))
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl DoubleEndedIterator for Components<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl FusedIterator for Components<'_> {}


#[cfg(test)]
mod tests {
    use super::*;


    fn key(raw: &str) -> PathKey {
        PathKey::new(raw).unwrap()
    }

    #[test]
    fn component_boundaries() {
        let path = key("/usr/local/bin");

        assert_eq!(path.depth(), 3);
        assert_eq!(path.component(0), Some("usr"));
        assert_eq!(path.component(1), Some("local"));
        assert_eq!(path.component(2), Some("bin"));
        assert_eq!(path.component(3), None);
        assert_eq!(path.last_component(), "bin");
        assert_eq!(path.components().collect::<Vec<_>>(), ["usr", "local", "bin"]);
        assert_eq!(path.components().rev().next(), Some("bin"));
    }

    #[test]
    fn prefixes() {
        let path = key("/a/bb/ccc");

        assert_eq!(path.prefix(1).unwrap(), key("/a"));
        assert_eq!(path.prefix(2).unwrap(), key("/a/bb"));
        assert_eq!(path.prefix(3).unwrap(), path);
        assert_eq!(path.prefix_str(2), Some("/a/bb"));

        assert_eq!(
            path.prefix(0),
            Err(PathError::DepthOutOfRange { requested: 0, depth: 3 }),
        );
        assert_eq!(
            path.prefix(4),
            Err(PathError::DepthOutOfRange { requested: 4, depth: 3 }),
        );
        assert_eq!(path.prefix_str(0), None);

        // A truncated key keeps working as a key of its own.
        let truncated = path.prefix(2).unwrap();
        assert_eq!(truncated.depth(), 2);
        assert_eq!(truncated.last_component(), "bb");
        assert_eq!(truncated.prefix(1).unwrap(), key("/a"));
    }

    #[test]
    fn parents_and_shared_prefixes() {
        let dir = key("/a/b");
        let child = key("/a/b/c");
        let cousin = key("/a/x/c");

        assert_eq!(child.parent(), Some(dir.clone()));
        assert_eq!(key("/a").parent(), None);

        assert_eq!(child.shared_prefix_depth(&dir), 2);
        assert_eq!(child.shared_prefix_depth(&cousin), 1);
        assert_eq!(key("/z").shared_prefix_depth(&cousin), 0);

        assert!(dir.is_parent_of(&child));
        assert!(!dir.is_parent_of(&dir));
        assert!(!key("/a").is_parent_of(&child));
        assert!(key("/a").is_prefix_of(&child));
        assert!(!cousin.is_prefix_of(&child));
    }

    #[test]
    fn ordering_is_component_wise() {
        assert!(key("/a/b") < key("/a-b"));
        assert!(key("/a") < key("/a/b"));
        assert!(key("/a/b") < key("/a/c"));
        assert!(key("/a/b/z") < key("/a/c"));
        assert_eq!(key("/a/b").cmp(&key("/a/b")), Ordering::Equal);
    }

    #[test]
    fn compare_to_str_agrees_with_ord() {
        let keys = ["/a", "/a/b", "/a-b", "/a/b/c", "/b", "/a/ba", "/a/b0"];

        for lhs in keys {
            for rhs in keys {
                assert_eq!(
                    key(lhs).compare_to_str(rhs),
                    key(lhs).cmp(&key(rhs)),
                    "comparing {lhs} with {rhs}",
                );
            }
        }
    }

    #[test]
    fn equality_and_rendering() {
        let path: PathKey = "/x/y".parse().unwrap();

        assert_eq!(path.to_string(), "/x/y");
        assert_eq!(path.as_str(), "/x/y");
        assert_eq!(format!("{path:?}"), r#"PathKey("/x/y")"#);
        assert_eq!(path, PathKey::try_from("/x/y").unwrap());
        assert_ne!(path, key("/x"));
    }
}
