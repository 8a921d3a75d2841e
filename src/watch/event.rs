// src/watch/event.rs

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use notify::{Event, EventKind};
use notify::event::{ModifyKind, RenameMode};

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Deleted,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        };
        f.write_str(s)
    }
}

/// One change observed below a watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: ChangeKind,
    /// How many identical raw events this one stands for.
    pub count: usize,
    pub location: Location,
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.location)?;
        if self.count > 1 {
            write!(f, " (x{})", self.count)?;
        }
        Ok(())
    }
}

/// Map one raw notify event onto (kind, path) changes.
///
/// Renames surface as a deletion of the old name and a creation of the new
/// one. Access notifications and unclassified events are dropped.
pub(crate) fn classify(kind: &EventKind, paths: &[PathBuf]) -> Vec<(ChangeKind, PathBuf)> {
    let all = |change: ChangeKind| paths.iter().map(|p| (change, p.clone())).collect();
    match kind {
        EventKind::Create(_) => all(ChangeKind::Created),
        EventKind::Remove(_) => all(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => all(ChangeKind::Deleted),
            RenameMode::To => all(ChangeKind::Created),
            RenameMode::Both => {
                let mut changes = Vec::with_capacity(2);
                if let Some(from) = paths.first() {
                    changes.push((ChangeKind::Deleted, from.clone()));
                }
                if let Some(to) = paths.get(1) {
                    changes.push((ChangeKind::Created, to.clone()));
                }
                changes
            }
            // Backends that cannot tell the two sides apart.
            RenameMode::Any | RenameMode::Other => paths
                .iter()
                .map(|p| {
                    let change = if p.exists() {
                        ChangeKind::Created
                    } else {
                        ChangeKind::Deleted
                    };
                    (change, p.clone())
                })
                .collect(),
        },
        EventKind::Modify(_) => all(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// Fold runs of identical (kind, path) changes into one entry with a count.
pub(crate) fn coalesce(changes: Vec<(ChangeKind, PathBuf)>) -> Vec<(ChangeKind, PathBuf, usize)> {
    let mut out: Vec<(ChangeKind, PathBuf, usize)> = Vec::with_capacity(changes.len());
    for (kind, path) in changes {
        match out.last_mut() {
            Some((last_kind, last_path, count)) if *last_kind == kind && *last_path == path => {
                *count += 1;
            }
            _ => out.push((kind, path, 1)),
        }
    }
    out
}

/// Renames already reported, keyed by the backend's rename cookie.
///
/// Some backends report one rename as separate `From` / `To` halves and then
/// again as a paired `Both`. Each side of a tracked rename is reported once,
/// whichever form arrives first.
#[derive(Debug, Default)]
pub(crate) struct RenameLedger {
    seen: VecDeque<(usize, ChangeKind)>,
}

impl RenameLedger {
    const CAPACITY: usize = 256;

    /// [`classify`] one event, dropping rename sides already reported.
    pub fn classify(&mut self, event: &Event) -> Vec<(ChangeKind, PathBuf)> {
        let changes = classify(&event.kind, &event.paths);
        let tracker = match (&event.kind, event.tracker()) {
            (EventKind::Modify(ModifyKind::Name(_)), Some(tracker)) => tracker,
            _ => return changes,
        };
        changes
            .into_iter()
            .filter(|(kind, _)| self.first_sighting(tracker, *kind))
            .collect()
    }

    fn first_sighting(&mut self, tracker: usize, side: ChangeKind) -> bool {
        if self.seen.contains(&(tracker, side)) {
            return false;
        }
        if self.seen.len() == Self::CAPACITY {
            self.seen.pop_front();
        }
        self.seen.push_back((tracker, side));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange};

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn rename_both_splits_into_delete_and_create() {
        let changes = classify(
            &EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &[p("/w/old"), p("/w/new")],
        );
        assert_eq!(
            changes,
            vec![(ChangeKind::Deleted, p("/w/old")), (ChangeKind::Created, p("/w/new"))]
        );
    }

    #[test]
    fn access_events_are_dropped() {
        assert!(classify(&EventKind::Access(AccessKind::Any), &[p("/w/a")]).is_empty());
        assert_eq!(
            classify(&EventKind::Create(CreateKind::File), &[p("/w/a")]),
            vec![(ChangeKind::Created, p("/w/a"))]
        );
        assert_eq!(
            classify(
                &EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &[p("/w/a")]
            ),
            vec![(ChangeKind::Modified, p("/w/a"))]
        );
    }

    #[test]
    fn adjacent_duplicates_are_counted() {
        let folded = coalesce(vec![
            (ChangeKind::Modified, p("a")),
            (ChangeKind::Modified, p("a")),
            (ChangeKind::Modified, p("b")),
            (ChangeKind::Modified, p("a")),
        ]);
        assert_eq!(
            folded,
            vec![
                (ChangeKind::Modified, p("a"), 2),
                (ChangeKind::Modified, p("b"), 1),
                (ChangeKind::Modified, p("a"), 1),
            ]
        );
    }

    fn rename(mode: RenameMode, paths: &[&str]) -> Event {
        let mut event = Event::new(EventKind::Modify(ModifyKind::Name(mode))).set_tracker(7);
        for path in paths {
            event = event.add_path(p(path));
        }
        event
    }

    #[test]
    fn paired_rename_after_halves_is_dropped() {
        let mut ledger = RenameLedger::default();
        let changes: Vec<_> = [
            rename(RenameMode::From, &["/w/old"]),
            rename(RenameMode::To, &["/w/new"]),
            rename(RenameMode::Both, &["/w/old", "/w/new"]),
        ]
        .iter()
        .flat_map(|event| ledger.classify(event))
        .collect();

        assert_eq!(
            changes,
            vec![(ChangeKind::Deleted, p("/w/old")), (ChangeKind::Created, p("/w/new"))]
        );
    }

    #[test]
    fn halves_after_paired_rename_are_dropped() {
        let mut ledger = RenameLedger::default();
        assert_eq!(ledger.classify(&rename(RenameMode::Both, &["/w/a", "/w/b"])).len(), 2);
        assert!(ledger.classify(&rename(RenameMode::From, &["/w/a"])).is_empty());
        assert!(ledger.classify(&rename(RenameMode::To, &["/w/b"])).is_empty());
    }

    #[test]
    fn untracked_events_pass_through() {
        let mut ledger = RenameLedger::default();
        let self_move = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(p("/w/a"));
        assert_eq!(ledger.classify(&self_move).len(), 1);
        assert_eq!(ledger.classify(&self_move).len(), 1);
    }
}
