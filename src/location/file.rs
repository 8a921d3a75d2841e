// src/location/file.rs

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;
use tracing::{debug, warn};

use crate::config::WalkOptions;
use crate::errors::{IoResultExt, Result, TreeError};
use crate::location::{Located, grandparent};
use crate::types::OperationMode;
use crate::walk::{TreeWalker, WalkReport};

/// Handle to a regular file (present or not).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    pub fn size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path).at(&self.path)?.len())
    }

    /// Create the file (and its parent directories) when absent.
    pub fn create(&self) -> Result<&Self> {
        if self.is_present() {
            return Ok(self);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).at(parent)?;
            }
        }
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .at(&self.path)?;
        Ok(self)
    }

    /// Create when absent, otherwise bump the modification time to now.
    pub fn touch(&self) -> Result<&Self> {
        if self.is_absent() {
            self.create()
        } else {
            self.set_last_modified(SystemTime::now())
        }
    }

    /// Copy to `destination`. An existing directory destination receives
    /// the file under its own name; missing parents are created.
    pub fn copy_to(
        &self,
        destination: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        TreeWalker::new(&self.path, OperationMode::Copy, options.clone())
            .destination(destination.as_ref())
            .run()
    }

    pub fn move_to(
        &self,
        destination: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        TreeWalker::new(&self.path, OperationMode::Move, options.clone())
            .destination(destination.as_ref())
            .run()
    }

    /// Move next to the parent directory: `a/b/f` becomes `a/f`. An existing
    /// file there is replaced; an existing directory is an
    /// [`TreeError::AlreadyExists`] and nothing moves.
    pub fn move_up(&self) -> Result<File> {
        let up = grandparent(&self.path)?;
        let target = up.join(self.name());
        if target.is_dir() {
            return Err(TreeError::AlreadyExists(target));
        }
        self.move_to(&up, &WalkOptions::new())?;
        Ok(File::new(target))
    }

    pub fn delete(&self) -> Result<WalkReport> {
        TreeWalker::new(&self.path, OperationMode::Delete, WalkOptions::new()).run()
    }

    /// Block until an exclusive advisory lock on this file is held. The file
    /// is created first when absent.
    pub fn lock(&self) -> Result<FileLock> {
        let file = self.open_for_lock()?;
        file.lock_exclusive().at(&self.path)?;
        debug!(path = ?self.path, "acquired exclusive lock");
        Ok(FileLock {
            file,
            path: self.path.clone(),
        })
    }

    /// Take the lock if nobody holds it; `Ok(None)` when contended.
    pub fn try_lock(&self) -> Result<Option<FileLock>> {
        let file = self.open_for_lock()?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(FileLock {
                file,
                path: self.path.clone(),
            })),
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                debug!(path = ?self.path, "lock is held elsewhere");
                Ok(None)
            }
            Err(err) => Err(TreeError::io(&self.path, err)),
        }
    }

    fn open_for_lock(&self) -> Result<fs::File> {
        self.create()?;
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .at(&self.path)
    }
}

impl Located for File {
    fn path(&self) -> &Path {
        &self.path
    }

    fn with_path(&self, path: PathBuf) -> Self {
        File::new(path)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for File {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Exclusive advisory lock; released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: fs::File,
    path: PathBuf,
}

impl FileLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = ?self.path, error = %err, "failed to release lock");
        }
    }
}
