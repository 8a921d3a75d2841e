// src/location/mod.rs

//! Typed path handles.
//!
//! [`File`] and [`Directory`] are immutable values wrapping a path; equality
//! and ordering are those of the path. The name algebra and state accessors
//! they share live on the [`Located`] trait; tree operations delegate to the
//! walk engine.

mod archive;
mod directory;
mod file;

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use globset::GlobBuilder;

pub use archive::Archive;
pub use directory::Directory;
pub use file::{File, FileLock};

use crate::errors::{IoResultExt, Result, TreeError};

/// Name algebra and state shared by every path handle.
pub trait Located: Sized {
    fn path(&self) -> &Path;

    /// Same kind of handle at another path.
    fn with_path(&self, path: PathBuf) -> Self;

    /// Last path element, or `""` for an empty path.
    fn name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Name up to (not including) the last `.`.
    fn base(&self) -> String {
        let name = self.name();
        match name.rfind('.') {
            Some(i) => name[..i].to_string(),
            None => name,
        }
    }

    /// Name after the last `.`, or `""` when there is none.
    fn extension(&self) -> String {
        let name = self.name();
        match name.rfind('.') {
            Some(i) => name[i + 1..].to_string(),
            None => String::new(),
        }
    }

    /// Sibling with a new base name and the same extension.
    fn with_base(&self, base: &str) -> Self {
        let extension = self.extension();
        let name = if extension.is_empty() {
            base.to_string()
        } else {
            format!("{base}.{extension}")
        };
        self.with_path(self.path().with_file_name(name))
    }

    /// Sibling with the same base name and a new extension.
    fn with_extension(&self, extension: &str) -> Self {
        let name = format!("{}.{extension}", self.base());
        self.with_path(self.path().with_file_name(name))
    }

    /// Rename in place, keeping the parent directory.
    ///
    /// Anything already present under `name`, file or directory, is an
    /// [`TreeError::AlreadyExists`]. Renaming to the current name is a no-op.
    fn rename_to(&self, name: &str) -> Result<Self> {
        if name.is_empty() || Path::new(name).components().count() != 1 {
            return Err(TreeError::ConfigError(format!(
                "cannot rename {:?} to {name:?}: not a plain name",
                self.path()
            )));
        }
        let target = self.path().with_file_name(name);
        if target == self.path() {
            return Ok(self.with_path(target));
        }
        if fs::symlink_metadata(&target).is_ok() {
            return Err(TreeError::AlreadyExists(target));
        }
        fs::rename(self.path(), &target).at(self.path())?;
        Ok(self.with_path(target))
    }

    fn parent(&self) -> Option<Directory> {
        self.path().parent().map(Directory::new)
    }

    fn is_absolute(&self) -> bool {
        self.path().is_absolute()
    }

    fn is_relative(&self) -> bool {
        self.path().is_relative()
    }

    /// Absolute form of this handle. Already absolute handles come back as is.
    fn absolutize(&self) -> Result<Self> {
        if self.is_absolute() {
            return Ok(self.with_path(self.path().to_path_buf()));
        }
        let absolute = std::path::absolute(self.path()).at(self.path())?;
        Ok(self.with_path(absolute))
    }

    /// Relative path leading from this handle to `other`, using `..` where
    /// needed. `None` when only one of the two is absolute.
    fn relativize<T: Located>(&self, other: &T) -> Option<T> {
        relative_path(self.path(), other.path()).map(|p| other.with_path(p))
    }

    /// Glob test against the whole path; a leading `!` inverts the result.
    fn matches(&self, pattern: &str) -> Result<bool> {
        let (pattern, expected) = match pattern.strip_prefix('!') {
            Some(rest) => (rest, false),
            None => (pattern, true),
        };
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| TreeError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(glob.compile_matcher().is_match(self.path()) == expected)
    }

    /// True when any of `patterns` matches.
    fn matches_any<S: AsRef<str>>(&self, patterns: &[S]) -> Result<bool> {
        for pattern in patterns {
            if self.matches(pattern.as_ref())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_present(&self) -> bool {
        self.path().exists()
    }

    fn is_absent(&self) -> bool {
        !self.is_present()
    }

    fn is_file(&self) -> bool {
        self.path().is_file()
    }

    fn is_directory(&self) -> bool {
        self.path().is_dir()
    }

    fn last_modified(&self) -> Result<SystemTime> {
        fs::metadata(self.path())
            .and_then(|meta| meta.modified())
            .at(self.path())
    }

    fn set_last_modified(&self, time: SystemTime) -> Result<&Self> {
        filetime::set_file_mtime(self.path(), FileTime::from_system_time(time)).at(self.path())?;
        Ok(self)
    }
}

/// Directory two levels up, the destination of `move_up`.
fn grandparent(path: &Path) -> Result<PathBuf> {
    let up = path.parent().and_then(Path::parent).ok_or_else(|| {
        TreeError::ConfigError(format!("{path:?} has no grandparent directory"))
    })?;
    if up.as_os_str().is_empty() {
        Ok(PathBuf::from("."))
    } else {
        Ok(up.to_path_buf())
    }
}

/// Lexical relative path from `from` to `to`.
fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    if from.is_absolute() != to.is_absolute() {
        return None;
    }
    let from: Vec<Component<'_>> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<Component<'_>> = to.components().filter(|c| *c != Component::CurDir).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for part in &to[common..] {
        rel.push(part.as_os_str());
    }
    Some(rel)
}

/// Either kind of handle.
#[derive(Debug, Clone)]
pub enum Location {
    File(File),
    Directory(Directory),
}

impl Location {
    /// Handle for `path`, typed by what is on disk now. Anything that is not
    /// a directory (including an absent path) becomes a file handle.
    pub fn locate(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Location::Directory(Directory::new(path))
        } else {
            Location::File(File::new(path))
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Location::File(f) => Some(f),
            Location::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Location::Directory(d) => Some(d),
            Location::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File> {
        match self {
            Location::File(f) => Some(f),
            Location::Directory(_) => None,
        }
    }

    pub fn into_directory(self) -> Option<Directory> {
        match self {
            Location::Directory(d) => Some(d),
            Location::File(_) => None,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Location::File(f) => f.into_path(),
            Location::Directory(d) => d.into_path(),
        }
    }
}

impl Located for Location {
    fn path(&self) -> &Path {
        match self {
            Location::File(f) => f.path(),
            Location::Directory(d) => d.path(),
        }
    }

    fn with_path(&self, path: PathBuf) -> Self {
        match self {
            Location::File(_) => Location::File(File::new(path)),
            Location::Directory(_) => Location::Directory(Directory::new(path)),
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path().cmp(other.path())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

impl From<File> for Location {
    fn from(file: File) -> Self {
        Location::File(file)
    }
}

impl From<Directory> for Location {
    fn from(dir: Directory) -> Self {
        Location::Directory(dir)
    }
}

impl AsRef<Path> for Location {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_split_on_last_dot() {
        let file = File::new("dir/archive.tar.gz");
        assert_eq!(file.name(), "archive.tar.gz");
        assert_eq!(file.base(), "archive.tar");
        assert_eq!(file.extension(), "gz");
    }

    #[test]
    fn dotfile_has_empty_base() {
        let file = File::new(".gitignore");
        assert_eq!(file.base(), "");
        assert_eq!(file.extension(), "gitignore");
        assert_eq!(file.with_extension("new").name(), ".new");
    }

    #[test]
    fn trailing_dot_has_empty_extension() {
        let file = File::new("text.");
        assert_eq!(file.base(), "text");
        assert_eq!(file.extension(), "");
    }

    #[test]
    fn with_base_keeps_extension() {
        assert_eq!(File::new("a/b.txt").with_base("c").path(), Path::new("a/c.txt"));
        assert_eq!(
            File::new("a/Makefile").with_base("GNUmakefile").path(),
            Path::new("a/GNUmakefile")
        );
    }

    #[test]
    fn relativize_walks_up_and_down() {
        let from = Directory::new("/a/b");
        let to = File::new("/a/x/y.txt");
        assert_eq!(from.relativize(&to).unwrap().path(), Path::new("../x/y.txt"));
        assert_eq!(from.relativize(&Directory::new("/a/b")).unwrap().path(), Path::new(""));
        assert!(Directory::new("rel").relativize(&to).is_none());
    }

    #[test]
    fn matches_whole_path_and_negation() {
        let file = File::new("src/lib.rs");
        assert!(file.matches("src/*.rs").unwrap());
        assert!(!file.matches("*.rs").unwrap());
        assert!(file.matches("!*.toml").unwrap());
        assert!(file.matches_any(&["*.md", "**/*.rs"]).unwrap());
    }

    #[test]
    fn location_equality_ignores_kind() {
        let a = Location::File(File::new("x"));
        let b = Location::Directory(Directory::new("x"));
        assert_eq!(a, b);
        assert!(Location::locate("does/not/exist").as_file().is_some());
    }
}
