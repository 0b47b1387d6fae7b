/// When a [`Tree`] runs the invariant checker around its mutations.
///
/// The checker recounts and re-walks the entire tree, so every mutation becomes linear in the
/// size of the tree while it is enabled.
///
/// [`Tree`]: crate::Tree
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// Never run the checker implicitly. [`Tree::check`] still works.
    ///
    /// [`Tree::check`]: crate::Tree::check
    Never,
    /// Run the checker only in builds with `debug_assertions`, or with the `always-check`
    /// feature enabled. In other builds this is the same as `Never`.
    #[default]
    DebugOnly,
    /// Always run the checker.
    Always,
}

impl CheckMode {
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        match self {
            Self::Never     => false,
            Self::DebugOnly => cfg!(any(debug_assertions, feature = "always-check")),
            Self::Always    => true,
        }
    }
}

/// Settings for a [`Tree`].
///
/// [`Tree`]: crate::Tree
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeOptions {
    pub check_mode:  CheckMode,
    /// The greatest number of nodes the tree may hold at once. Running out of budget in the
    /// middle of an insertion is handled exactly like running out of memory: the insertion is
    /// rolled back and [`TreeError::OutOfMemory`] is returned.
    ///
    /// [`TreeError::OutOfMemory`]: crate::TreeError::OutOfMemory
    pub node_budget: Option<usize>,
}

impl TreeOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check_mode:  CheckMode::DebugOnly,
            node_budget: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_check_mode(mut self, check_mode: CheckMode) -> Self {
        self.check_mode = check_mode;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_node_budget(mut self, node_budget: Option<usize>) -> Self {
        self.node_budget = node_budget;
        self
    }
}
