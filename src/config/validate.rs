// src/config/validate.rs

use crate::config::model::RawOptions;
use crate::config::options::WalkOptions;
use crate::errors::{Result, TreeError};
use crate::types::OperationMode;
use crate::walk::CompiledFilter;

impl TryFrom<RawOptions> for WalkOptions {
    type Error = TreeError;

    fn try_from(raw: RawOptions) -> std::result::Result<Self, Self::Error> {
        validate_raw_options(&raw)?;

        let mut options = WalkOptions::new().glob(raw.glob);
        if let Some(depth) = raw.depth {
            options = options.depth(depth);
        }
        if raw.strip {
            options = options.strip();
        }
        if let Some(prefix) = raw.allocate_in {
            options = options.allocate_in(prefix);
        }
        options.existing = raw.existing;
        options.pruned = raw.pruned;
        Ok(options)
    }
}

fn validate_raw_options(raw: &RawOptions) -> Result<()> {
    validate_patterns(raw)?;
    validate_allocate_in(raw)?;
    Ok(())
}

fn validate_patterns(raw: &RawOptions) -> Result<()> {
    for pattern in &raw.glob {
        if pattern.trim().is_empty() || pattern == "!" {
            return Err(TreeError::ConfigError(format!(
                "glob entry {pattern:?} is empty"
            )));
        }
    }
    // Compile once in both orientations so malformed globs surface at load.
    CompiledFilter::compile(&raw.glob, None, OperationMode::Copy)?;
    CompiledFilter::compile(&raw.glob, None, OperationMode::EnumerateDirectories)?;
    Ok(())
}

fn validate_allocate_in(raw: &RawOptions) -> Result<()> {
    if let Some(prefix) = &raw.allocate_in {
        if prefix.is_absolute() {
            return Err(TreeError::ConfigError(format!(
                "allocate_in must be a relative path (got {prefix:?})"
            )));
        }
    }
    Ok(())
}
