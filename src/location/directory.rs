// src/location/directory.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::WalkOptions;
use crate::errors::{IoResultExt, Result, TreeError};
use crate::location::{File, Located, Location, grandparent};
use crate::types::OperationMode;
use crate::walk::{CancelToken, CompiledFilter, Traversal, TreeWalker, Visit, WalkReport};
use crate::watch::{self, Observation};

/// Handle to a directory (present or not).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Directory {
    path: PathBuf,
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    pub fn file(&self, name: impl AsRef<Path>) -> File {
        File::new(self.path.join(name))
    }

    pub fn directory(&self, name: impl AsRef<Path>) -> Directory {
        Directory::new(self.path.join(name))
    }

    /// Total size of every file beneath this directory.
    pub fn size(&self) -> Result<u64> {
        let mut total = 0;
        for file in self.walk_files(&WalkOptions::new())? {
            total += file.size()?;
        }
        Ok(total)
    }

    pub fn create(&self) -> Result<&Self> {
        fs::create_dir_all(&self.path).at(&self.path)?;
        Ok(self)
    }

    pub fn touch(&self) -> Result<&Self> {
        if self.is_absent() {
            self.create()
        } else {
            self.set_last_modified(SystemTime::now())
        }
    }

    pub fn copy_to(
        &self,
        destination: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        self.walker(OperationMode::Copy, options)
            .destination(destination.as_ref())
            .run()
    }

    pub fn move_to(
        &self,
        destination: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        self.walker(OperationMode::Move, options)
            .destination(destination.as_ref())
            .run()
    }

    /// Move next to the parent directory, merging into a directory of the
    /// same name. A file in the way is an [`TreeError::AlreadyExists`].
    pub fn move_up(&self) -> Result<Directory> {
        let up = grandparent(&self.path)?;
        let target = up.join(self.name());
        if target.is_file() {
            return Err(TreeError::AlreadyExists(target));
        }
        self.move_to(&up, &WalkOptions::new())?;
        Ok(Directory::new(target))
    }

    pub fn delete(&self, options: &WalkOptions) -> Result<WalkReport> {
        self.walker(OperationMode::Delete, options).run()
    }

    /// Lazily list accepted files beneath this directory.
    pub fn walk_files(&self, options: &WalkOptions) -> Result<impl Iterator<Item = File> + use<>> {
        Ok(self
            .walker(OperationMode::EnumerateFiles, options)
            .locations()?
            .filter_map(Location::into_file))
    }

    /// Lazily list accepted directories, this one included unless stripped.
    pub fn walk_directories(
        &self,
        options: &WalkOptions,
    ) -> Result<impl Iterator<Item = Directory> + use<>> {
        Ok(self
            .walker(OperationMode::EnumerateDirectories, options)
            .locations()?
            .filter_map(Location::into_directory))
    }

    /// Immediate entries, sorted by name.
    pub fn children(&self) -> Result<Vec<Location>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.path).at(&self.path)? {
            let entry = entry.at(&self.path)?;
            let file_type = entry.file_type().at(&entry.path())?;
            children.push(if file_type.is_dir() {
                Location::Directory(Directory::new(entry.path()))
            } else {
                Location::File(File::new(entry.path()))
            });
        }
        children.sort();
        Ok(children)
    }

    /// Every file and directory beneath this one, depth-first.
    pub fn descendants(&self) -> impl Iterator<Item = Location> + use<> {
        Traversal::new(
            &self.path,
            &self.path,
            Arc::new(CompiledFilter::match_all()),
            None,
            CancelToken::new(),
        )
        .filter_map(|visit| match visit {
            Visit::EnterDirectory(entry) if !entry.is_base => {
                Some(Location::Directory(Directory::new(entry.path)))
            }
            Visit::File(entry) => Some(Location::File(File::new(entry.path))),
            _ => None,
        })
    }

    /// Watch this directory for changes. See [`watch::observe`].
    pub fn observe<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Observation> {
        watch::observe(&self.path, patterns)
    }

    fn walker(&self, mode: OperationMode, options: &WalkOptions) -> TreeWalker {
        TreeWalker::new(&self.path, mode, options.clone())
    }
}

impl Located for Directory {
    fn path(&self) -> &Path {
        &self.path
    }

    fn with_path(&self, path: PathBuf) -> Self {
        Directory::new(path)
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for Directory {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
