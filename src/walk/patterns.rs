// src/walk/patterns.rs

use std::fmt;
use std::fs::{self, Metadata};
use std::path::Path;
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::{Result, TreeError};
use crate::types::OperationMode;

/// Caller-supplied include predicate over (base-relative path, metadata).
pub type CustomFilter = Arc<dyn Fn(&Path, &Metadata) -> bool + Send + Sync>;

/// Include / exclude-file / exclude-directory predicates derived from an
/// ordered pattern list.
///
/// All matching is done against paths relative to the walk base, with `/`
/// as separator. `*` and `?` stay inside one path segment; `**` spans any
/// number of them.
#[derive(Clone, Default)]
pub struct CompiledFilter {
    include: Option<GlobSet>,
    custom: Option<CustomFilter>,
    exclude_files: Option<GlobSet>,
    exclude_dirs: Option<GlobSet>,
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("include", &self.include.as_ref().map(GlobSet::len))
            .field("custom", &self.custom.is_some())
            .field("exclude_files", &self.exclude_files.as_ref().map(GlobSet::len))
            .field("exclude_dirs", &self.exclude_dirs.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl CompiledFilter {
    /// Compile `patterns` for a walk in `mode`.
    ///
    /// - `foo` → include
    /// - `!foo/**` → exclude-directory `foo` (prunes the subtree)
    /// - `!foo` → exclude-file in file-oriented modes, exclude-directory
    ///   otherwise
    ///
    /// A `custom` predicate takes over the include side entirely; positive
    /// patterns are then ignored, negated ones still apply.
    pub fn compile(
        patterns: &[String],
        custom: Option<CustomFilter>,
        mode: OperationMode,
    ) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude_files = Vec::new();
        let mut exclude_dirs = Vec::new();

        for pattern in patterns {
            match pattern.strip_prefix('!') {
                None => include.push(pattern.as_str()),
                Some(negated) => {
                    if let Some(dir) = negated.strip_suffix("/**") {
                        exclude_dirs.push(dir);
                    } else if mode.is_file_oriented() {
                        exclude_files.push(negated);
                    } else {
                        exclude_dirs.push(negated);
                    }
                }
            }
        }

        // Compile everything up front so a bad pattern fails before any
        // filesystem mutation, even when the custom predicate shadows it.
        let include = build_globset(&include)?;
        let include = if custom.is_some() {
            if include.is_some() {
                debug!("custom filter supplied; ignoring positive glob patterns");
            }
            None
        } else {
            include
        };

        Ok(Self {
            include,
            custom,
            exclude_files: build_globset(&exclude_files)?,
            exclude_dirs: build_globset(&exclude_dirs)?,
        })
    }

    /// A filter that accepts everything and prunes nothing.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// True when no pattern or predicate narrows the walk.
    pub fn is_match_all(&self) -> bool {
        self.include.is_none()
            && self.custom.is_none()
            && self.exclude_files.is_none()
            && self.exclude_dirs.is_none()
    }

    /// Include side only. `abs` is needed to stat the entry for a custom
    /// predicate; an entry that cannot be stat'ed is not included.
    pub fn includes(&self, rel: &Path, abs: &Path) -> bool {
        if let Some(custom) = &self.custom {
            return match fs::symlink_metadata(abs) {
                Ok(meta) => custom(rel, &meta),
                Err(_) => false,
            };
        }
        match &self.include {
            Some(set) => set.is_match(slash_path(rel)),
            None => true,
        }
    }

    pub fn excludes_file(&self, rel: &Path) -> bool {
        self.exclude_files
            .as_ref()
            .is_some_and(|set| set.is_match(slash_path(rel)))
    }

    /// Whether a directory at `rel` is pruned together with its subtree.
    pub fn excludes_directory(&self, rel: &Path) -> bool {
        self.exclude_dirs
            .as_ref()
            .is_some_and(|set| set.is_match(slash_path(rel)))
    }

    /// `include ∧ ¬exclude-file`, the acceptance test for a visited entry.
    pub fn accepts(&self, rel: &Path, abs: &Path) -> bool {
        !self.excludes_file(rel) && self.includes(rel, abs)
    }

    /// Combined predicate for change events: the entry may already be gone,
    /// so a custom predicate is never consulted here.
    pub fn accepts_event(&self, rel: &Path) -> bool {
        let rel_str = slash_path(rel);
        if let Some(set) = &self.include {
            if !set.is_match(&rel_str) {
                return false;
            }
        }
        if let Some(set) = &self.exclude_files {
            if set.is_match(&rel_str) {
                return false;
            }
        }
        if let Some(set) = &self.exclude_dirs {
            if set.is_match(&rel_str) {
                return false;
            }
        }
        true
    }
}

/// Build a `GlobSet` from pattern strings, or `None` for an empty list.
fn build_globset(patterns: &[&str]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|source| TreeError::InvalidPattern {
                pattern: pat.to_string(),
                source,
            })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|source| TreeError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })?;
    Ok(Some(set))
}

/// Render a relative path with forward slashes for glob matching.
pub(crate) fn slash_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
