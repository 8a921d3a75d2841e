// src/walk/tracker.rs

/// Per-directory deletion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Nothing has survived beneath this directory so far.
    Empty,
    /// Some content beneath this directory stays on disk.
    Retained,
}

/// Stack of markers for the directories currently open in a move/delete walk.
#[derive(Debug, Default)]
pub struct DeletionTracker {
    stack: Vec<Marker>,
}

impl DeletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.stack.push(Marker::Empty);
    }

    /// Flag the innermost open directory as non-deletable. No-op outside any
    /// directory (a single-file walk).
    pub fn mark_retained(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            *top = Marker::Retained;
        }
    }

    /// Close the innermost directory, returning whether it may be deleted.
    ///
    /// A retained directory is itself retained content of its parent, so the
    /// flag propagates upwards.
    pub fn leave(&mut self) -> bool {
        match self.stack.pop() {
            Some(Marker::Empty) => true,
            Some(Marker::Retained) => {
                self.mark_retained();
                false
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
