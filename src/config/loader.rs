// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawOptions;
use crate::config::options::WalkOptions;
use crate::errors::{IoResultExt, Result};

/// Load an options file and return the raw `RawOptions`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// usable `WalkOptions`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawOptions> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).at(path)?;

    let raw: RawOptions = toml::from_str(&contents)?;
    debug!(?path, patterns = raw.glob.len(), "loaded options file");

    Ok(raw)
}

/// Load an options file and validate it into `WalkOptions`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WalkOptions> {
    let raw = load_from_path(&path)?;
    WalkOptions::try_from(raw)
}

/// Options file picked up by the CLI when `--options` is not given.
pub fn default_options_path() -> PathBuf {
    PathBuf::from("treeops.toml")
}
