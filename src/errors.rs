// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("destination already exists: {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source and destination overlap: {from:?} -> {to:?}")]
    Overlap { from: PathBuf, to: PathBuf },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Raised inside the observe loop once its handle is disposed. Never
    /// returned to callers.
    #[error("watch service closed")]
    WatchServiceClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TreeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, TreeError::AlreadyExists(_))
    }
}

/// Attach the offending path to a bare `std::io::Result`.
pub trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| TreeError::io(path, e))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TreeError>;
