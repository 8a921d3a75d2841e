// src/walk/traversal.rs

//! Depth-first, pre/post-order directory traversal.
//!
//! [`Traversal`] is a plain iterator of [`Visit`]s. It owns walk order,
//! pruning (directory excludes and the depth limit) and cancellation; it
//! knows nothing about what a walk *does* with the entries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::walk::patterns::CompiledFilter;

/// Shared cancellation flag, polled before every visit.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One entry reached by the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path as found on disk.
    pub path: PathBuf,
    /// Path relative to the walk base (empty for the base itself).
    pub rel: PathBuf,
    /// Distance from the traversal root (root = 0).
    pub depth: usize,
    pub is_base: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// Matched the exclude-directory predicate.
    Excluded,
    /// Lies deeper than the configured limit.
    Depth,
    /// Directory listing failed.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    EnterDirectory(Entry),
    File(Entry),
    LeaveDirectory(Entry),
    /// Entry (and its subtree, for directories) skipped without a visit.
    Pruned { entry: Entry, reason: PruneReason },
}

struct Child {
    path: PathBuf,
    is_dir: bool,
}

struct Frame {
    entry: Entry,
    children: std::vec::IntoIter<Child>,
}

pub struct Traversal {
    root: Option<PathBuf>,
    base: PathBuf,
    filter: Arc<CompiledFilter>,
    max_depth: Option<usize>,
    cancel: CancelToken,
    stack: Vec<Frame>,
    cancelled: bool,
}

impl std::fmt::Debug for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traversal")
            .field("base", &self.base)
            .field("max_depth", &self.max_depth)
            .field("open_dirs", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl Traversal {
    /// Walk `root`, computing relative paths against `base`.
    pub fn new(
        root: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        filter: Arc<CompiledFilter>,
        max_depth: Option<usize>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            root: Some(root.into()),
            base: base.into(),
            filter,
            max_depth,
            cancel,
            stack: Vec::new(),
            cancelled: false,
        }
    }

    /// A traversal that yields nothing (absent source).
    pub fn empty(cancel: CancelToken) -> Self {
        Self {
            root: None,
            base: PathBuf::new(),
            filter: Arc::new(CompiledFilter::match_all()),
            max_depth: None,
            cancel,
            stack: Vec::new(),
            cancelled: false,
        }
    }

    /// Whether the walk stopped because its token was cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn entry(&self, path: PathBuf, depth: usize) -> Entry {
        let rel = path
            .strip_prefix(&self.base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        let is_base = path == self.base;
        Entry {
            path,
            rel,
            depth,
            is_base,
        }
    }

    fn start(&mut self, root: PathBuf) -> Option<Visit> {
        let meta = match fs::metadata(&root) {
            Ok(meta) => meta,
            Err(err) => {
                debug!(?root, error = %err, "walk root is absent; nothing to visit");
                return None;
            }
        };
        let entry = self.entry(root, 0);
        if !meta.is_dir() {
            return Some(Visit::File(entry));
        }
        if !entry.is_base && self.filter.excludes_directory(&entry.rel) {
            return Some(Visit::Pruned {
                entry,
                reason: PruneReason::Excluded,
            });
        }
        Some(self.open(entry))
    }

    fn open(&mut self, entry: Entry) -> Visit {
        match read_children(&entry.path) {
            Ok(children) => {
                self.stack.push(Frame {
                    entry: entry.clone(),
                    children: children.into_iter(),
                });
                Visit::EnterDirectory(entry)
            }
            Err(err) => {
                warn!(
                    path = ?entry.path,
                    error = %err,
                    "failed to read directory; skipping subtree"
                );
                Visit::Pruned {
                    entry,
                    reason: PruneReason::Unreadable,
                }
            }
        }
    }
}

impl Iterator for Traversal {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        if self.cancelled {
            return None;
        }
        if self.cancel.is_cancelled() {
            debug!(base = ?self.base, "walk cancelled");
            self.cancelled = true;
            self.stack.clear();
            self.root = None;
            return None;
        }

        if let Some(root) = self.root.take() {
            return self.start(root);
        }

        let frame = self.stack.last_mut()?;
        let Some(child) = frame.children.next() else {
            let frame = self.stack.pop()?;
            return Some(Visit::LeaveDirectory(frame.entry));
        };

        let depth = frame.entry.depth + 1;
        let entry = self.entry(child.path, depth);

        if self.max_depth.is_some_and(|max| depth > max) {
            return Some(Visit::Pruned {
                entry,
                reason: PruneReason::Depth,
            });
        }

        if !child.is_dir {
            return Some(Visit::File(entry));
        }

        if self.filter.excludes_directory(&entry.rel) {
            debug!(rel = ?entry.rel, "pruning excluded directory");
            return Some(Visit::Pruned {
                entry,
                reason: PruneReason::Excluded,
            });
        }

        Some(self.open(entry))
    }
}

/// List a directory, sorted by name. Entries whose type cannot be read are
/// skipped. Symbolic links are listed as leaves and never followed.
fn read_children(dir: &Path) -> std::io::Result<Vec<Child>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(?dir, error = %err, "failed to read directory entry");
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => {
                warn!(path = ?entry.path(), error = %err, "failed to inspect entry");
                continue;
            }
        };
        children.push(Child {
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    children.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(visits: &[Visit]) -> Vec<String> {
        visits
            .iter()
            .map(|v| match v {
                Visit::EnterDirectory(e) => format!("enter {}", e.rel.display()),
                Visit::File(e) => format!("file {}", e.rel.display()),
                Visit::LeaveDirectory(e) => format!("leave {}", e.rel.display()),
                Visit::Pruned { entry, .. } => format!("pruned {}", entry.rel.display()),
            })
            .collect()
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("root/a/deep")).unwrap();
        fs::write(dir.path().join("root/a/deep/x.txt"), b"x").unwrap();
        fs::write(dir.path().join("root/a/y.txt"), b"y").unwrap();
        fs::write(dir.path().join("root/z.txt"), b"z").unwrap();
        dir
    }

    #[test]
    fn visits_in_pre_and_post_order() {
        let tmp = sample_tree();
        let root = tmp.path().join("root");
        let visits: Vec<Visit> = Traversal::new(
            &root,
            &root,
            Arc::new(CompiledFilter::match_all()),
            None,
            CancelToken::new(),
        )
        .collect();

        assert_eq!(
            names(&visits),
            vec![
                "enter ",
                "enter a",
                "enter a/deep",
                "file a/deep/x.txt",
                "leave a/deep",
                "file a/y.txt",
                "leave a",
                "file z.txt",
                "leave ",
            ]
        );
    }

    #[test]
    fn depth_limit_prunes_grandchildren() {
        let tmp = sample_tree();
        let root = tmp.path().join("root");
        let visits: Vec<Visit> = Traversal::new(
            &root,
            &root,
            Arc::new(CompiledFilter::match_all()),
            Some(1),
            CancelToken::new(),
        )
        .collect();

        assert_eq!(
            names(&visits),
            vec![
                "enter ",
                "enter a",
                "pruned a/deep",
                "pruned a/y.txt",
                "leave a",
                "file z.txt",
                "leave ",
            ]
        );
    }

    #[test]
    fn cancelled_token_stops_immediately() {
        let tmp = sample_tree();
        let root = tmp.path().join("root");
        let token = CancelToken::new();
        let mut traversal = Traversal::new(
            &root,
            &root,
            Arc::new(CompiledFilter::match_all()),
            None,
            token.clone(),
        );
        assert!(matches!(traversal.next(), Some(Visit::EnterDirectory(_))));
        token.cancel();
        assert_eq!(traversal.next(), None);
        assert!(traversal.was_cancelled());
    }

    #[test]
    fn absent_root_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let mut traversal = Traversal::new(
            &missing,
            &missing,
            Arc::new(CompiledFilter::match_all()),
            None,
            CancelToken::new(),
        );
        assert_eq!(traversal.next(), None);
    }
}
