// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{ExistingPolicy, PrunedPolicy};

/// Command-line arguments for `treeops`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "treeops",
    version,
    about = "Copy, move, delete, list and watch directory trees with glob filters.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TREEOPS_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Copy a file or directory tree.
    Copy {
        source: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Move a file or directory tree, removing emptied source directories.
    Move {
        source: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Delete accepted files and the directories they leave empty.
    Delete {
        source: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// List accepted files, one per line.
    Files {
        source: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// List accepted directories, one per line.
    Dirs {
        source: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Print changes below a directory until Ctrl-C.
    Watch {
        root: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
    },
}

impl Command {
    pub fn walk_args(&self) -> &WalkArgs {
        match self {
            Command::Copy { walk, .. }
            | Command::Move { walk, .. }
            | Command::Delete { walk, .. }
            | Command::Files { walk, .. }
            | Command::Dirs { walk, .. }
            | Command::Watch { walk, .. } => walk,
        }
    }
}

/// Filtering flags shared by every subcommand. They extend or override the
/// options file.
#[derive(Debug, Clone, Default, Args)]
pub struct WalkArgs {
    /// Glob pattern; repeatable, `!` negates, `!dir/**` prunes a subtree.
    #[arg(long = "glob", short = 'g', value_name = "PATTERN")]
    pub globs: Vec<String>,

    /// Maximum depth below the root (root = 0).
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Operate on the root's contents only.
    #[arg(long)]
    pub strip: bool,

    /// Relative sub-path inside the destination.
    #[arg(long, value_name = "PATH")]
    pub allocate_in: Option<PathBuf>,

    /// Collision policy: replace, skip or stop.
    #[arg(long, value_name = "POLICY")]
    pub existing: Option<ExistingPolicy>,

    /// Whether pruned subtrees keep their parent: retain or ignore.
    #[arg(long, value_name = "POLICY")]
    pub pruned: Option<PrunedPolicy>,

    /// Options file (TOML).
    ///
    /// Default: `treeops.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub options: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
