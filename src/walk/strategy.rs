// src/walk/strategy.rs

//! Per-mode behaviour plugged into the shared walk driver.
//!
//! The driver (`walker.rs`) owns filtering, deletion bookkeeping and error
//! classification. A strategy only performs the filesystem effect of its
//! mode and reports how a file fared.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;
use tracing::debug;

use crate::errors::{IoResultExt, Result, TreeError};
use crate::location::{Directory, File, Location};
use crate::types::{ExistingPolicy, OperationMode};
use crate::walk::patterns::CompiledFilter;
use crate::walk::report::WalkReport;
use crate::walk::traversal::Entry;

/// Immutable walk parameters shared by every callback.
#[derive(Debug, Clone)]
pub(crate) struct WalkContext {
    pub filter: Arc<CompiledFilter>,
    /// Destination root for copy/move, already adjusted for `allocate_in`
    /// and single-file roots.
    pub destination: Option<PathBuf>,
    /// The walk root is a single file; it maps onto `destination` itself.
    pub single_file: bool,
    pub root_accept: bool,
    pub existing: ExistingPolicy,
}

impl WalkContext {
    /// Mirror of `entry` under the destination root.
    pub fn destination_for(&self, entry: &Entry) -> Result<PathBuf> {
        let dest = self.destination.as_ref().ok_or_else(|| {
            TreeError::ConfigError(format!("no destination for {:?}", entry.path))
        })?;
        if self.single_file || entry.rel.as_os_str().is_empty() {
            Ok(dest.clone())
        } else {
            Ok(dest.join(&entry.rel))
        }
    }
}

/// Output side of a walk: emitted locations and counters.
#[derive(Debug, Default)]
pub(crate) struct Sink {
    pub pending: VecDeque<Location>,
    pub report: WalkReport,
}

impl Sink {
    pub fn emit(&mut self, location: Location) {
        self.pending.push_back(location);
    }
}

/// How a single accepted file fared.
#[derive(Debug)]
pub(crate) enum FileOutcome {
    Applied,
    /// Left in place by the skip policy.
    Skipped,
    /// The operation failed; logged and swallowed by the driver.
    Failed(TreeError),
}

/// Mode-specific callbacks. Returning `Err` aborts the walk.
///
/// `on_file` is only called for accepted files in file-oriented modes; the
/// directory modes never see files.
pub(crate) trait WalkStrategy: Send {
    fn on_enter_directory(
        &mut self,
        _ctx: &WalkContext,
        _entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<()> {
        Ok(())
    }

    fn on_file(
        &mut self,
        _ctx: &WalkContext,
        _entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<FileOutcome> {
        Ok(FileOutcome::Skipped)
    }

    fn on_leave_directory(
        &mut self,
        _ctx: &WalkContext,
        _entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn strategy_for(mode: OperationMode) -> Box<dyn WalkStrategy> {
    match mode {
        OperationMode::Copy => Box::new(CopyStrategy),
        OperationMode::Move => Box::new(MoveStrategy),
        OperationMode::Delete => Box::new(DeleteStrategy),
        OperationMode::EnumerateFiles => Box::new(EnumerateFilesStrategy),
        OperationMode::EnumerateDirectories => Box::new(EnumerateDirectoriesStrategy),
        OperationMode::Observe => Box::new(ObserveStrategy),
    }
}

struct CopyStrategy;

impl WalkStrategy for CopyStrategy {
    fn on_enter_directory(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        sink: &mut Sink,
    ) -> Result<()> {
        create_mirror_dir(ctx, entry, sink)
    }

    fn on_file(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<FileOutcome> {
        let dest = ctx.destination_for(entry)?;
        if let Some(outcome) = check_existing(&dest, ctx.existing)? {
            return Ok(outcome);
        }
        debug!(from = ?entry.path, to = ?dest, "copy file");
        Ok(match copy_file(&entry.path, &dest) {
            Ok(()) => FileOutcome::Applied,
            Err(err) => FileOutcome::Failed(err),
        })
    }

    fn on_leave_directory(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<()> {
        copy_dir_mtime(&entry.path, &ctx.destination_for(entry)?)
    }
}

struct MoveStrategy;

impl WalkStrategy for MoveStrategy {
    fn on_enter_directory(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        sink: &mut Sink,
    ) -> Result<()> {
        create_mirror_dir(ctx, entry, sink)
    }

    fn on_file(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<FileOutcome> {
        let dest = ctx.destination_for(entry)?;
        if let Some(outcome) = check_existing(&dest, ctx.existing)? {
            return Ok(outcome);
        }
        debug!(from = ?entry.path, to = ?dest, "move file");
        // No cross-device fallback: a failed rename leaves the source alone.
        Ok(match fs::rename(&entry.path, &dest) {
            Ok(()) => FileOutcome::Applied,
            Err(err) => FileOutcome::Failed(TreeError::io(&entry.path, err)),
        })
    }

    fn on_leave_directory(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<()> {
        copy_dir_mtime(&entry.path, &ctx.destination_for(entry)?)
    }
}

struct DeleteStrategy;

impl WalkStrategy for DeleteStrategy {
    fn on_file(
        &mut self,
        _ctx: &WalkContext,
        entry: &Entry,
        _sink: &mut Sink,
    ) -> Result<FileOutcome> {
        debug!(path = ?entry.path, "delete file");
        Ok(match fs::remove_file(&entry.path) {
            Ok(()) => FileOutcome::Applied,
            Err(err) => FileOutcome::Failed(TreeError::io(&entry.path, err)),
        })
    }
}

struct EnumerateFilesStrategy;

impl WalkStrategy for EnumerateFilesStrategy {
    fn on_file(
        &mut self,
        _ctx: &WalkContext,
        entry: &Entry,
        sink: &mut Sink,
    ) -> Result<FileOutcome> {
        sink.emit(Location::File(File::new(&entry.path)));
        Ok(FileOutcome::Applied)
    }
}

struct EnumerateDirectoriesStrategy;

impl WalkStrategy for EnumerateDirectoriesStrategy {
    fn on_enter_directory(
        &mut self,
        ctx: &WalkContext,
        entry: &Entry,
        sink: &mut Sink,
    ) -> Result<()> {
        if entry.is_base && !ctx.root_accept {
            return Ok(());
        }
        if ctx.filter.accepts(&entry.rel, &entry.path) {
            sink.emit(Location::Directory(Directory::new(&entry.path)));
            sink.report.dirs_emitted += 1;
        }
        Ok(())
    }
}

/// Snapshot of every directory a watch must register. Include patterns do
/// not apply here; only pruning does.
struct ObserveStrategy;

impl WalkStrategy for ObserveStrategy {
    fn on_enter_directory(
        &mut self,
        _ctx: &WalkContext,
        entry: &Entry,
        sink: &mut Sink,
    ) -> Result<()> {
        sink.emit(Location::Directory(Directory::new(&entry.path)));
        Ok(())
    }
}

fn create_mirror_dir(ctx: &WalkContext, entry: &Entry, sink: &mut Sink) -> Result<()> {
    let dest = ctx.destination_for(entry)?;
    if !dest.is_dir() {
        fs::create_dir_all(&dest).at(&dest)?;
        sink.report.dirs_created += 1;
    }
    Ok(())
}

/// Apply the existing-entry policy to `dest`.
///
/// `Ok(None)` means go ahead and write. `Stop` is the only fatal outcome.
fn check_existing(dest: &Path, policy: ExistingPolicy) -> Result<Option<FileOutcome>> {
    let Ok(meta) = fs::symlink_metadata(dest) else {
        return Ok(None);
    };
    match policy {
        ExistingPolicy::Skip => {
            debug!(?dest, "destination exists; skipping");
            Ok(Some(FileOutcome::Skipped))
        }
        ExistingPolicy::Stop => Err(TreeError::AlreadyExists(dest.to_path_buf())),
        ExistingPolicy::Replace if meta.is_dir() => Ok(Some(FileOutcome::Failed(
            TreeError::AlreadyExists(dest.to_path_buf()),
        ))),
        ExistingPolicy::Replace => Ok(None),
    }
}

/// Copy content and permission bits, then carry over access and
/// modification times.
fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).at(src)?;
    let meta = fs::metadata(src).at(src)?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
    .at(dest)
}

fn copy_dir_mtime(src: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(src).at(src)?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&meta)).at(dest)
}
