// src/walk/report.rs

use std::fmt;
use std::path::PathBuf;

/// Counters for one tree walk. Per-file failures are swallowed by the walk
/// itself; they surface here and in the `warn!` log.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Files the operation was applied to (copied, moved, deleted, emitted).
    pub files_applied: u64,
    /// Files left alone by the skip policy.
    pub files_skipped: u64,
    /// Files rejected by include / exclude-file.
    pub files_rejected: u64,
    /// Files whose operation failed.
    pub files_failed: u64,
    pub dirs_created: u64,
    pub dirs_removed: u64,
    /// Directories yielded by a directory enumeration.
    pub dirs_emitted: u64,
    /// Entries skipped together with their subtree.
    pub pruned: u64,
    /// Paths of the failed files, in walk order.
    pub failures: Vec<PathBuf>,
    /// The walk was interrupted through its cancel token.
    pub cancelled: bool,
}

impl WalkReport {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    pub(crate) fn record_failure(&mut self, path: PathBuf) {
        self.files_failed += 1;
        self.failures.push(path);
    }

    /// One-line summary with a caller-chosen prefix, e.g. `[COPY]`.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} applied={} skipped={} rejected={} failed={} \
             dirs_created={} dirs_removed={} dirs_emitted={} pruned={}{}",
            self.files_applied,
            self.files_skipped,
            self.files_rejected,
            self.files_failed,
            self.dirs_created,
            self.dirs_removed,
            self.dirs_emitted,
            self.pruned,
            if self.cancelled { " (cancelled)" } else { "" },
        )
    }
}

impl fmt::Display for WalkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[WALK]"))
    }
}
