use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;


/// The ways in which a path string can fail to describe an absolute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// The string was empty.
    Empty,
    /// The string did not begin with `/`.
    NotAbsolute,
    /// The string was only `/`. The bare root has depth zero, which no key may have.
    BareRoot,
    /// Two separators were adjacent, or the string ended with a separator.
    EmptyComponent,
    /// A component was `.` or `..`. Paths are never normalized, so these are rejected.
    DotComponent,
    /// The string contained a NUL byte.
    NulByte,
}

impl MalformedReason {
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Empty          => "the path is empty",
            Self::NotAbsolute    => "the path does not start with `/`",
            Self::BareRoot       => "the path has no components",
            Self::EmptyComponent => "the path has an empty component",
            Self::DotComponent   => "the path has a `.` or `..` component",
            Self::NulByte        => "the path contains a NUL byte",
        }
    }
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.describe())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed path `{path}`: {reason}")]
    Malformed {
        path:   String,
        reason: MalformedReason,
    },
    /// A prefix was requested at depth zero, or at a depth greater than the key's own depth.
    #[error("requested a prefix of depth {requested} from a path of depth {depth}")]
    DepthOutOfRange {
        requested: usize,
        depth:     usize,
    },
}

impl PathError {
    #[inline]
    #[must_use]
    pub const fn malformed_reason(&self) -> Option<MalformedReason> {
        if let Self::Malformed { reason, .. } = self {
            Some(*reason)
        } else {
            None
        }
    }
}
