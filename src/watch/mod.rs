// src/watch/mod.rs

//! Live change notification for directory trees.
//!
//! This module is responsible for:
//! - Registering one non-recursive OS watch (`notify`) per directory,
//!   seeded from an observe-mode walk.
//! - Registering directories created while the watch runs.
//! - Turning raw backend events into filtered, coalesced [`WatchEvent`]s.

pub mod event;
pub mod path_utils;
pub mod registrar;

pub use event::{ChangeKind, WatchEvent};
pub use registrar::{Observation, observe};
