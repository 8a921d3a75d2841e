#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tempfile::TempDir;
use treeops::{Located, Location};

/// Builder for a throwaway directory tree.
///
/// ```ignore
/// let tree = TreeBuilder::new()
///     .file("in/a.txt", "a")
///     .dir("in/empty")
///     .build();
/// ```
pub struct TreeBuilder {
    tmp: TempDir,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Write `contents` at `rel`, creating parent directories.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, contents).expect("Failed to write file");
        self
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.tmp.path().join(rel)).expect("Failed to create dir");
        self
    }

    /// Set the modification time of an existing entry, in seconds since the
    /// epoch.
    pub fn mtime(self, rel: &str, secs: i64) -> Self {
        filetime::set_file_mtime(self.tmp.path().join(rel), FileTime::from_unix_time(secs, 0))
            .expect("Failed to set mtime");
        self
    }

    pub fn build(self) -> TestTree {
        TestTree { tmp: self.tmp }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built tree; removed from disk when dropped.
pub struct TestTree {
    tmp: TempDir,
}

impl TestTree {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("Failed to read file")
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(path, contents).expect("Failed to write file");
    }

    pub fn mtime(&self, rel: &str) -> i64 {
        let meta = fs::metadata(self.path(rel)).expect("Failed to stat");
        FileTime::from_last_modification_time(&meta).unix_seconds()
    }

    /// Files below `rel`, as sorted `/`-separated relative paths.
    pub fn files(&self, rel: &str) -> Vec<String> {
        list_files(&self.path(rel))
    }

    /// Directories below `rel` (not `rel` itself), sorted.
    pub fn dirs(&self, rel: &str) -> Vec<String> {
        list_dirs(&self.path(rel))
    }
}

/// Every file below `root`, relative and sorted. Empty for an absent root.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(root, root, &mut out, false);
    out.sort();
    out
}

/// Every directory below `root`, relative and sorted.
pub fn list_dirs(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(root, root, &mut out, true);
    out.sort();
    out
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>, dirs: bool) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.expect("Failed to read dir entry").path();
        let rel = path
            .strip_prefix(root)
            .expect("entry outside root")
            .to_string_lossy()
            .replace('\\', "/");
        if path.is_dir() {
            if dirs {
                out.push(rel);
            }
            collect(root, &path, out, dirs);
        } else if !dirs {
            out.push(rel);
        }
    }
}

/// Paths of walk output relative to `root`, in emission order.
pub fn relative_names(root: &Path, locations: impl IntoIterator<Item = Location>) -> Vec<String> {
    locations
        .into_iter()
        .map(|loc| {
            loc.path()
                .strip_prefix(root)
                .expect("location outside root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}
