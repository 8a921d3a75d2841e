// src/config/options.rs

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::types::{ExistingPolicy, OperationMode, PrunedPolicy};
use crate::walk::{CompiledFilter, CustomFilter};

/// Filtering and placement rules shared by every tree operation.
///
/// Built fluently:
///
/// ```
/// use treeops::WalkOptions;
///
/// let options = WalkOptions::new()
///     .glob(["**/*.rs", "!target/**"])
///     .depth(3)
///     .strip()
///     .skip_existing();
/// assert_eq!(options.depth, Some(3));
/// assert!(!options.root_accept);
/// ```
#[derive(Clone)]
pub struct WalkOptions {
    /// Ordered glob patterns; `!` negates.
    pub patterns: Vec<String>,
    /// Include predicate that replaces the positive patterns.
    pub filter: Option<CustomFilter>,
    /// Whether the root itself takes part in the operation.
    pub root_accept: bool,
    /// Maximum depth below the root; `None` is unlimited.
    pub depth: Option<usize>,
    /// Relative sub-path inserted below the destination.
    pub allocate_in: Option<PathBuf>,
    pub existing: ExistingPolicy,
    pub pruned: PrunedPolicy,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            filter: None,
            root_accept: true,
            depth: None,
            allocate_in: None,
            existing: ExistingPolicy::default(),
            pruned: PrunedPolicy::default(),
        }
    }
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("patterns", &self.patterns)
            .field("filter", &self.filter.is_some())
            .field("root_accept", &self.root_accept)
            .field("depth", &self.depth)
            .field("allocate_in", &self.allocate_in)
            .field("existing", &self.existing)
            .field("pruned", &self.pruned)
            .finish()
    }
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Append glob patterns, keeping their order.
    pub fn glob<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Use a custom include predicate over (relative path, metadata).
    pub fn take<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path, &Metadata) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Operate on the root's contents, not on the root itself.
    pub fn strip(mut self) -> Self {
        self.root_accept = false;
        self
    }

    /// Place results under `prefix` inside the destination. Absolute paths
    /// are ignored.
    pub fn allocate_in(mut self, prefix: impl Into<PathBuf>) -> Self {
        let prefix = prefix.into();
        if prefix.is_absolute() {
            debug!(?prefix, "ignoring absolute allocate_in prefix");
            return self;
        }
        self.allocate_in = Some(prefix);
        self
    }

    pub fn replace_existing(mut self) -> Self {
        self.existing = ExistingPolicy::Replace;
        self
    }

    pub fn skip_existing(mut self) -> Self {
        self.existing = ExistingPolicy::Skip;
        self
    }

    pub fn stop_existing(mut self) -> Self {
        self.existing = ExistingPolicy::Stop;
        self
    }

    pub fn pruned(mut self, policy: PrunedPolicy) -> Self {
        self.pruned = policy;
        self
    }

    /// Compile the patterns and predicate for a walk in `mode`.
    pub fn compile(&self, mode: OperationMode) -> Result<CompiledFilter> {
        CompiledFilter::compile(&self.patterns, self.filter.clone(), mode)
    }
}
