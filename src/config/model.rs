// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ExistingPolicy, PrunedPolicy};

/// Walk options as read from a TOML file.
///
/// ```toml
/// glob = ["**/*.rs", "!target/**"]
/// depth = 4
/// strip = true
/// allocate_in = "backup"
/// existing = "skip"
/// pruned = "retain"
/// ```
///
/// Every key is optional; missing keys keep the `WalkOptions` defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOptions {
    /// Ordered glob patterns, `!` for negation.
    #[serde(default)]
    pub glob: Vec<String>,

    /// Maximum depth below the walk root (root = 0).
    #[serde(default)]
    pub depth: Option<usize>,

    /// Leave the root itself out of the operation.
    #[serde(default)]
    pub strip: bool,

    /// Relative sub-path prepended to the destination.
    #[serde(default)]
    pub allocate_in: Option<PathBuf>,

    #[serde(default)]
    pub existing: ExistingPolicy,

    #[serde(default)]
    pub pruned: PrunedPolicy,
}
