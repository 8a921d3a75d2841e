// src/watch/registrar.rs

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WalkOptions;
use crate::errors::{IoResultExt, Result, TreeError};
use crate::location::{Located, Location};
use crate::types::OperationMode;
use crate::walk::{CancelToken, CompiledFilter, Traversal, TreeWalker, Visit};
use crate::watch::event::{ChangeKind, RenameLedger, WatchEvent, coalesce};
use crate::watch::path_utils::relative_path;

/// Bound on remembered deleted directories.
const GONE_CAPACITY: usize = 256;

/// Message into the watch thread.
enum RawMessage {
    Event(notify::Result<Event>),
    Close,
}

/// Live change stream for one watched tree.
///
/// Events arrive until [`dispose`](Self::dispose) is called or the handle is
/// dropped; both stop the watch thread and release every OS watch.
pub struct Observation {
    root: PathBuf,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    control: mpsc::UnboundedSender<RawMessage>,
    disposed: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("root", &self.root)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Start watching `root` for changes.
///
/// Patterns compile in observe mode: negated entries prune directories from
/// registration and drop their events; positive entries select which events
/// are reported. The single pattern `"*"` watches the root's top level only.
/// Every other existing directory is registered before this returns.
pub fn observe<S: AsRef<str>>(root: impl AsRef<Path>, patterns: &[S]) -> Result<Observation> {
    let given = root.as_ref();
    let root = given.canonicalize().at(given)?;
    if !root.is_dir() {
        return Err(TreeError::ConfigError(format!(
            "cannot observe {given:?}: not a directory"
        )));
    }

    let patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
    let filter = Arc::new(CompiledFilter::compile(&patterns, None, OperationMode::Observe)?);

    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawMessage>();
    let watcher = RecommendedWatcher::new(
        {
            let raw_tx = raw_tx.clone();
            move |res: notify::Result<Event>| {
                // The loop may already be gone after disposal.
                let _ = raw_tx.send(RawMessage::Event(res));
            }
        },
        Config::default(),
    )?;

    let mut registry = Registry {
        watcher,
        watched: HashSet::new(),
    };
    let top_level_only = patterns.len() == 1 && patterns[0] == "*";
    if top_level_only {
        registry.register(&root)?;
    } else {
        let snapshot = TreeWalker::new(
            &root,
            OperationMode::Observe,
            WalkOptions::new().glob(patterns.iter().cloned()),
        )
        .locations()?;
        for dir in snapshot {
            registry.register(dir.path())?;
        }
    }
    info!(?root, directories = registry.watched.len(), "observation started");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let disposed = Arc::new(AtomicBool::new(false));

    let event_loop = EventLoop {
        root: root.clone(),
        filter,
        top_level_only,
        registry,
        renames: RenameLedger::default(),
        gone: VecDeque::new(),
        raw_rx,
        events_tx,
        disposed: Arc::clone(&disposed),
    };
    let worker = std::thread::Builder::new()
        .name("treeops-watch".to_string())
        .spawn(move || event_loop.run())
        .at(&root)?;

    Ok(Observation {
        root,
        events: events_rx,
        control: raw_tx,
        disposed,
        worker: Some(worker),
    })
}

impl Observation {
    /// Canonical path of the watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next event; `None` once disposed and drained.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for synchronous callers.
    /// Must not be called from within an async runtime.
    pub fn blocking_recv(&mut self) -> Option<WatchEvent> {
        self.events.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Option<WatchEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Stop watching. Idempotent; waits for the watch thread to exit.
    pub fn dispose(&mut self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.control.send(RawMessage::Close);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(root = ?self.root, "watch thread panicked");
            }
        }
        debug!(root = ?self.root, "observation disposed");
    }
}

impl Iterator for Observation {
    type Item = WatchEvent;

    fn next(&mut self) -> Option<WatchEvent> {
        self.blocking_recv()
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// OS watches currently held, one non-recursive watch per directory.
struct Registry {
    watcher: RecommendedWatcher,
    watched: HashSet<PathBuf>,
}

impl Registry {
    fn register(&mut self, dir: &Path) -> Result<()> {
        if self.watched.contains(dir) {
            return Ok(());
        }
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!(?dir, "registered watch");
        self.watched.insert(dir.to_path_buf());
        Ok(())
    }

    fn is_watched(&self, dir: &Path) -> bool {
        self.watched.contains(dir)
    }

    fn forget(&mut self, path: &Path) {
        // The OS drops watches on deleted directories by itself.
        self.watched.retain(|dir| !dir.starts_with(path));
    }
}

struct EventLoop {
    root: PathBuf,
    filter: Arc<CompiledFilter>,
    top_level_only: bool,
    registry: Registry,
    renames: RenameLedger,
    /// Watched directories already reported deleted. Their own self-delete
    /// or self-move notification is not reported again.
    gone: VecDeque<PathBuf>,
    raw_rx: mpsc::UnboundedReceiver<RawMessage>,
    events_tx: mpsc::UnboundedSender<WatchEvent>,
    disposed: Arc<AtomicBool>,
}

impl EventLoop {
    fn run(mut self) {
        loop {
            match self.next_batch() {
                Ok(batch) => self.dispatch(batch),
                Err(TreeError::WatchServiceClosed) => break,
                Err(err) => warn!(root = ?self.root, error = %err, "watch loop error"),
            }
        }
        info!(root = ?self.root, "observation stopped");
    }

    /// Block for the next raw event, then drain whatever else is queued.
    fn next_batch(&mut self) -> Result<Vec<Event>> {
        let first = self.raw_rx.blocking_recv();
        if self.disposed.load(Ordering::SeqCst) {
            return Err(TreeError::WatchServiceClosed);
        }
        let mut batch = Vec::new();
        let Some(first) = first else {
            return Err(TreeError::WatchServiceClosed);
        };
        Self::collect(first, &mut batch)?;
        while let Ok(message) = self.raw_rx.try_recv() {
            Self::collect(message, &mut batch)?;
        }
        Ok(batch)
    }

    fn collect(message: RawMessage, batch: &mut Vec<Event>) -> Result<()> {
        match message {
            RawMessage::Event(Ok(event)) => batch.push(event),
            RawMessage::Event(Err(err)) => warn!(error = %err, "watch backend error"),
            RawMessage::Close => return Err(TreeError::WatchServiceClosed),
        }
        Ok(())
    }

    fn dispatch(&mut self, batch: Vec<Event>) {
        let mut changes = Vec::new();
        for event in &batch {
            for (kind, path) in self.renames.classify(event) {
                if self.is_reportable(kind, &path) {
                    changes.push((kind, path));
                }
            }
        }

        for (kind, path, count) in coalesce(changes) {
            let Some(rel) = relative_path(&self.root, &path) else {
                continue;
            };

            // Registration follows pruning only, like the initial snapshot;
            // include patterns decide what is reported.
            if kind == ChangeKind::Created && !self.top_level_only && path.is_dir() {
                self.register_tree(&path);
            }

            if !self.filter.accepts_event(&rel) {
                continue;
            }

            let event = WatchEvent {
                kind,
                count,
                location: Location::locate(&path),
            };
            debug!(%event, "change");
            if self.events_tx.send(event).is_err() {
                debug!("observation receiver dropped");
            }
        }
    }

    /// Drop changes outside the root, on the root itself, and repeated
    /// deletions of a watched directory. Keeps the watch set in step.
    fn is_reportable(&mut self, kind: ChangeKind, path: &Path) -> bool {
        match relative_path(&self.root, path) {
            None => {
                debug!(?path, "event outside watched root");
                return false;
            }
            Some(rel) if rel.as_os_str().is_empty() => return false,
            Some(_) => {}
        }

        match kind {
            ChangeKind::Deleted if self.registry.is_watched(path) => {
                self.registry.forget(path);
                if self.gone.len() == GONE_CAPACITY {
                    self.gone.pop_front();
                }
                self.gone.push_back(path.to_path_buf());
                true
            }
            ChangeKind::Deleted if self.gone.iter().any(|dir| dir == path) => {
                debug!(?path, "directory deletion already reported");
                false
            }
            ChangeKind::Deleted => {
                self.registry.forget(path);
                true
            }
            ChangeKind::Created => {
                self.gone.retain(|dir| dir != path);
                true
            }
            ChangeKind::Modified => true,
        }
    }

    /// Register a new directory and every non-pruned directory under it.
    fn register_tree(&mut self, dir: &Path) {
        let traversal = Traversal::new(
            dir,
            &self.root,
            Arc::clone(&self.filter),
            None,
            CancelToken::new(),
        );
        for visit in traversal {
            if let Visit::EnterDirectory(entry) = visit {
                if let Err(err) = self.registry.register(&entry.path) {
                    warn!(path = ?entry.path, error = %err, "failed to register watch");
                }
            }
        }
    }
}
