// src/lib.rs

//! Typed path handles and a single tree-walk engine for copy, move, delete,
//! enumeration and live change watching, all sharing one set of glob,
//! depth and root-handling rules.

pub mod cli;
pub mod config;
pub mod errors;
pub mod location;
pub mod logging;
pub mod types;
pub mod walk;
pub mod watch;

use anyhow::{Result, bail};
use tracing::{debug, info};

pub use crate::config::WalkOptions;
pub use crate::errors::TreeError;
pub use crate::location::{Archive, Directory, File, FileLock, Located, Location};
pub use crate::types::{ExistingPolicy, OperationMode, PrunedPolicy};
pub use crate::walk::{CancelToken, Locations, TreeWalker, WalkReport};
pub use crate::watch::{ChangeKind, Observation, WatchEvent, observe};

use crate::cli::{CliArgs, Command, WalkArgs};
use crate::config::{default_options_path, load_and_validate};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let options = resolve_options(args.command.walk_args())?;
    debug!(?options, "resolved walk options");

    match args.command {
        Command::Copy {
            source,
            destination,
            ..
        } => {
            let report = TreeWalker::new(&source, OperationMode::Copy, options)
                .destination(&destination)
                .run()?;
            finish("[COPY]", &report)
        }
        Command::Move {
            source,
            destination,
            ..
        } => {
            let report = TreeWalker::new(&source, OperationMode::Move, options)
                .destination(&destination)
                .run()?;
            finish("[MOVE]", &report)
        }
        Command::Delete { source, .. } => {
            let report = TreeWalker::new(&source, OperationMode::Delete, options).run()?;
            finish("[DELETE]", &report)
        }
        Command::Files { source, .. } => {
            let files = TreeWalker::new(&source, OperationMode::EnumerateFiles, options);
            for location in files.locations()? {
                println!("{location}");
            }
            Ok(())
        }
        Command::Dirs { source, .. } => {
            let dirs = TreeWalker::new(&source, OperationMode::EnumerateDirectories, options);
            for location in dirs.locations()? {
                println!("{location}");
            }
            Ok(())
        }
        Command::Watch { root, .. } => watch_until_interrupted(&root, &options.patterns).await,
    }
}

/// Options file (explicit, or the default one when present) overlaid with
/// the command-line flags.
fn resolve_options(args: &WalkArgs) -> Result<WalkOptions> {
    let mut options = match &args.options {
        Some(path) => load_and_validate(path)?,
        None => {
            let default = default_options_path();
            if default.is_file() {
                debug!(path = ?default, "using default options file");
                load_and_validate(&default)?
            } else {
                WalkOptions::new()
            }
        }
    };

    options = options.glob(args.globs.iter().cloned());
    if let Some(depth) = args.depth {
        options = options.depth(depth);
    }
    if args.strip {
        options = options.strip();
    }
    if let Some(prefix) = &args.allocate_in {
        options = options.allocate_in(prefix);
    }
    if let Some(existing) = args.existing {
        options.existing = existing;
    }
    if let Some(pruned) = args.pruned {
        options = options.pruned(pruned);
    }
    Ok(options)
}

fn finish(prefix: &str, report: &WalkReport) -> Result<()> {
    println!("{}", report.format(prefix));
    if report.has_failures() {
        bail!("{} file(s) could not be processed", report.files_failed);
    }
    Ok(())
}

async fn watch_until_interrupted(root: &std::path::Path, patterns: &[String]) -> Result<()> {
    let mut observation = observe(root, patterns)?;
    info!(root = ?observation.root(), "watching; press Ctrl-C to stop");

    loop {
        tokio::select! {
            event = observation.recv() => match event {
                Some(event) => println!("{event}"),
                None => break,
            },
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                }
                break;
            }
        }
    }

    observation.dispose();
    Ok(())
}
