// src/walk/walker.rs

//! The walk driver: setup of base and destination, then one loop that feeds
//! traversal visits to a mode strategy while keeping deletion bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::WalkOptions;
use crate::errors::{IoResultExt, Result, TreeError};
use crate::location::Location;
use crate::types::{OperationMode, PrunedPolicy};
use crate::walk::report::WalkReport;
use crate::walk::strategy::{FileOutcome, Sink, WalkContext, WalkStrategy, strategy_for};
use crate::walk::tracker::DeletionTracker;
use crate::walk::traversal::{CancelToken, PruneReason, Traversal, Visit};

/// One configured tree operation.
///
/// ```no_run
/// use treeops::{OperationMode, TreeWalker, WalkOptions};
///
/// let options = WalkOptions::new().glob(["!*.log"]);
/// let report = TreeWalker::new("In", OperationMode::Copy, options)
///     .destination("Out")
///     .run()?;
/// println!("{report}");
/// # Ok::<(), treeops::TreeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeWalker {
    source: PathBuf,
    destination: Option<PathBuf>,
    mode: OperationMode,
    options: WalkOptions,
    cancel: CancelToken,
}

impl TreeWalker {
    pub fn new(source: impl Into<PathBuf>, mode: OperationMode, options: WalkOptions) -> Self {
        Self {
            source: source.into(),
            destination: None,
            mode,
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Destination root for copy/move. Ignored by the other modes.
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the walk to completion.
    pub fn run(self) -> Result<WalkReport> {
        let mut walk = self.start()?;
        while walk.step()? {}
        Ok(walk.finish())
    }

    /// Run the walk lazily, yielding emitted locations as they are reached.
    ///
    /// Only enumerate and observe modes emit anything. An error that would
    /// abort [`run`](Self::run) ends the iteration early and is logged.
    pub fn locations(self) -> Result<Locations> {
        Ok(Locations {
            walk: self.start()?,
            done: false,
        })
    }

    fn start(self) -> Result<Walk> {
        let filter = Arc::new(self.options.compile(self.mode)?);

        let meta = match fs::metadata(&self.source) {
            Ok(meta) => meta,
            Err(err) => {
                debug!(source = ?self.source, error = %err, "source is absent; nothing to do");
                return Ok(Walk::new(
                    self.mode,
                    Traversal::empty(self.cancel),
                    WalkContext {
                        filter,
                        destination: None,
                        single_file: false,
                        root_accept: self.options.root_accept,
                        existing: self.options.existing,
                    },
                    self.options.pruned,
                ));
            }
        };

        let is_dir = meta.is_dir();
        let root_accept = self.options.root_accept;
        let base = if !is_dir || (self.mode.needs_destination() && root_accept) {
            parent_of(&self.source)
        } else {
            self.source.clone()
        };

        let destination = if self.mode.needs_destination() {
            Some(self.prepare_destination(is_dir, &base)?)
        } else {
            None
        };

        debug!(
            mode = ?self.mode,
            source = ?self.source,
            ?base,
            ?destination,
            root_accept,
            "starting walk"
        );

        let traversal = Traversal::new(
            &self.source,
            base,
            Arc::clone(&filter),
            self.options.depth,
            self.cancel,
        );
        let ctx = WalkContext {
            filter,
            destination,
            single_file: !is_dir,
            root_accept,
            existing: self.options.existing,
        };
        Ok(Walk::new(self.mode, traversal, ctx, self.options.pruned))
    }

    /// Resolve the destination root and create its parent chain.
    fn prepare_destination(&self, is_dir: bool, base: &Path) -> Result<PathBuf> {
        let mut dest = self.destination.clone().ok_or_else(|| {
            TreeError::ConfigError(format!("{:?} requires a destination", self.mode))
        })?;
        if let Some(prefix) = &self.options.allocate_in {
            dest.push(prefix);
        }
        if !is_dir && dest.is_dir() {
            if let Some(name) = self.source.file_name() {
                dest.push(name);
            }
        }

        let mirror_root = match self.source.strip_prefix(base) {
            Ok(rel) if is_dir && !rel.as_os_str().is_empty() => dest.join(rel),
            _ => dest.clone(),
        };
        check_overlap(&self.source, &mirror_root)?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent).at(parent)?;
            }
        }
        Ok(dest)
    }
}

/// Lazy output of an enumerate or observe walk.
#[derive(Debug)]
pub struct Locations {
    walk: Walk,
    done: bool,
}

impl Locations {
    /// Counters so far.
    pub fn report(&self) -> &WalkReport {
        &self.walk.sink.report
    }
}

impl Iterator for Locations {
    type Item = Location;

    fn next(&mut self) -> Option<Location> {
        loop {
            if let Some(location) = self.walk.sink.pending.pop_front() {
                return Some(location);
            }
            if self.done {
                return None;
            }
            match self.walk.step() {
                Ok(true) => {}
                Ok(false) => self.done = true,
                Err(err) => {
                    warn!(error = %err, "walk aborted");
                    self.done = true;
                }
            }
        }
    }
}

struct Walk {
    mode: OperationMode,
    traversal: Traversal,
    strategy: Box<dyn WalkStrategy>,
    ctx: WalkContext,
    pruned_policy: PrunedPolicy,
    tracker: DeletionTracker,
    sink: Sink,
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("mode", &self.mode)
            .field("traversal", &self.traversal)
            .field("pending", &self.sink.pending.len())
            .finish_non_exhaustive()
    }
}

impl Walk {
    fn new(
        mode: OperationMode,
        traversal: Traversal,
        ctx: WalkContext,
        pruned_policy: PrunedPolicy,
    ) -> Self {
        Self {
            mode,
            traversal,
            strategy: strategy_for(mode),
            ctx,
            pruned_policy,
            tracker: DeletionTracker::new(),
            sink: Sink::default(),
        }
    }

    /// Process one visit. `Ok(false)` once the traversal is exhausted.
    fn step(&mut self) -> Result<bool> {
        let Some(visit) = self.traversal.next() else {
            return Ok(false);
        };

        match visit {
            Visit::EnterDirectory(entry) => {
                self.strategy
                    .on_enter_directory(&self.ctx, &entry, &mut self.sink)?;
                if self.mode.tracks_deletion() {
                    self.tracker.enter();
                }
            }
            Visit::File(entry) => {
                if !self.mode.is_file_oriented() {
                    return Ok(true);
                }
                if !self.ctx.filter.accepts(&entry.rel, &entry.path) {
                    debug!(rel = ?entry.rel, "file rejected by filter");
                    self.sink.report.files_rejected += 1;
                    self.tracker.mark_retained();
                    return Ok(true);
                }
                match self.strategy.on_file(&self.ctx, &entry, &mut self.sink)? {
                    FileOutcome::Applied => self.sink.report.files_applied += 1,
                    FileOutcome::Skipped => {
                        self.sink.report.files_skipped += 1;
                        self.tracker.mark_retained();
                    }
                    FileOutcome::Failed(err) => {
                        warn!(path = ?entry.path, error = %err, "file operation failed");
                        self.sink.report.record_failure(entry.path);
                        self.tracker.mark_retained();
                    }
                }
            }
            Visit::LeaveDirectory(entry) => {
                self.strategy
                    .on_leave_directory(&self.ctx, &entry, &mut self.sink)?;
                if self.mode.tracks_deletion() {
                    let empty = self.tracker.leave();
                    if empty && (self.ctx.root_accept || !entry.is_base) {
                        debug!(path = ?entry.path, "removing emptied directory");
                        fs::remove_dir(&entry.path).at(&entry.path)?;
                        self.sink.report.dirs_removed += 1;
                    }
                }
            }
            Visit::Pruned { entry, reason } => {
                self.sink.report.pruned += 1;
                let retains = match reason {
                    PruneReason::Excluded => self.pruned_policy == PrunedPolicy::Retain,
                    PruneReason::Depth | PruneReason::Unreadable => true,
                };
                if retains {
                    self.tracker.mark_retained();
                } else {
                    debug!(rel = ?entry.rel, "pruned subtree ignored by deletion tracking");
                }
            }
        }
        Ok(true)
    }

    fn finish(mut self) -> WalkReport {
        self.sink.report.cancelled = self.traversal.was_cancelled();
        self.sink.report
    }
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Reject a destination that lies inside (or is) the source.
fn check_overlap(source: &Path, target: &Path) -> Result<()> {
    let from = resolve_lenient(source)?;
    let to = resolve_lenient(target)?;
    if to.starts_with(&from) {
        return Err(TreeError::Overlap {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn resolve_lenient(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).at(path)?;
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            let mut resolved = canonical;
            for part in rest.iter().rev() {
                resolved.push(part);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}
