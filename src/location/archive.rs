// src/location/archive.rs

use std::path::Path;

use tracing::debug;

use crate::config::WalkOptions;
use crate::errors::{Result, TreeError};
use crate::location::{Directory, File, Located};
use crate::walk::WalkReport;

/// An archive whose contents are reachable as a directory tree.
///
/// The archive root is a container, not content: every walk over it runs
/// with root-accept disabled, so copies land directly in the destination
/// and enumerations never report the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    root: Directory,
}

impl Archive {
    /// Wrap an already mounted or extracted archive root.
    pub fn mount(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(TreeError::ConfigError(format!(
                "archive root {root:?} is not a directory"
            )));
        }
        debug!(?root, "mounted archive root");
        Ok(Self {
            root: Directory::new(root),
        })
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn copy_to(
        &self,
        destination: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        self.root.copy_to(destination, &Self::stripped(options))
    }

    pub fn walk_files(&self, options: &WalkOptions) -> Result<impl Iterator<Item = File> + use<>> {
        self.root.walk_files(&Self::stripped(options))
    }

    pub fn walk_directories(
        &self,
        options: &WalkOptions,
    ) -> Result<impl Iterator<Item = Directory> + use<>> {
        self.root.walk_directories(&Self::stripped(options))
    }

    fn stripped(options: &WalkOptions) -> WalkOptions {
        options.clone().strip()
    }
}

impl AsRef<Path> for Archive {
    fn as_ref(&self) -> &Path {
        self.root.path()
    }
}
