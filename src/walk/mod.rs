// src/walk/mod.rs

//! Tree operations: one depth-first walk multiplexed over copy, move,
//! delete, enumeration and the observe snapshot.

pub mod patterns;
pub mod report;
mod strategy;
pub mod tracker;
pub mod traversal;
pub mod walker;

use std::path::Path;

pub use patterns::{CompiledFilter, CustomFilter};
pub use report::WalkReport;
pub use tracker::{DeletionTracker, Marker};
pub use traversal::{CancelToken, Entry, PruneReason, Traversal, Visit};
pub use walker::{Locations, TreeWalker};

use crate::config::WalkOptions;
use crate::errors::Result;
use crate::types::OperationMode;

/// Copy `source` (file or directory) into `destination`.
pub fn copy(source: &Path, destination: &Path, options: &WalkOptions) -> Result<WalkReport> {
    TreeWalker::new(source, OperationMode::Copy, options.clone())
        .destination(destination)
        .run()
}

/// Move `source` into `destination`, removing emptied source directories.
pub fn move_to(source: &Path, destination: &Path, options: &WalkOptions) -> Result<WalkReport> {
    TreeWalker::new(source, OperationMode::Move, options.clone())
        .destination(destination)
        .run()
}

pub fn delete(source: &Path, options: &WalkOptions) -> Result<WalkReport> {
    TreeWalker::new(source, OperationMode::Delete, options.clone()).run()
}

/// Lazily list the accepted files under `source`.
pub fn files(source: &Path, options: &WalkOptions) -> Result<Locations> {
    TreeWalker::new(source, OperationMode::EnumerateFiles, options.clone()).locations()
}

/// Lazily list the accepted directories under `source`.
pub fn directories(source: &Path, options: &WalkOptions) -> Result<Locations> {
    TreeWalker::new(source, OperationMode::EnumerateDirectories, options.clone()).locations()
}
