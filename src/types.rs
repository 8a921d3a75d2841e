// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What to do when a file write lands on an entry that already exists.
///
/// - `Replace`: overwrite the destination (default).
/// - `Skip`: leave the destination untouched and carry on.
/// - `Stop`: abort the whole walk with `TreeError::AlreadyExists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    #[default]
    Replace,
    Skip,
    Stop,
}

impl FromStr for ExistingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(ExistingPolicy::Replace),
            "skip" => Ok(ExistingPolicy::Skip),
            "stop" => Ok(ExistingPolicy::Stop),
            other => Err(format!(
                "invalid existing policy: {other} (expected \"replace\", \"skip\" or \"stop\")"
            )),
        }
    }
}

/// Whether a subtree pruned by a `!dir/**` pattern keeps its parent alive
/// during move/delete.
///
/// - `Retain`: the pruned subtree counts as retained content (default).
/// - `Ignore`: the prune is invisible to deletion bookkeeping; removing the
///   still non-empty parent then fails and aborts the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrunedPolicy {
    #[default]
    Retain,
    Ignore,
}

impl FromStr for PrunedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(PrunedPolicy::Retain),
            "ignore" => Ok(PrunedPolicy::Ignore),
            other => Err(format!(
                "invalid pruned policy: {other} (expected \"retain\" or \"ignore\")"
            )),
        }
    }
}

/// The operation a tree walk performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Copy,
    Move,
    Delete,
    EnumerateFiles,
    EnumerateDirectories,
    /// Directory snapshot used to seed watch registrations.
    Observe,
}

impl OperationMode {
    /// Copy and move write into a destination tree.
    pub fn needs_destination(self) -> bool {
        matches!(self, OperationMode::Copy | OperationMode::Move)
    }

    /// Move and delete remove emptied source directories.
    pub fn tracks_deletion(self) -> bool {
        matches!(self, OperationMode::Move | OperationMode::Delete)
    }

    /// Negated patterns exclude files in these modes and prune directories in
    /// the others.
    pub fn is_file_oriented(self) -> bool {
        !matches!(
            self,
            OperationMode::EnumerateDirectories | OperationMode::Observe
        )
    }
}
