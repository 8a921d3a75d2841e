// tests/cli.rs

mod common;
use crate::common::{TestResult, TreeBuilder, init_tracing};

use std::ffi::OsStr;

use clap::Parser;
use treeops::cli::{CliArgs, Command};
use treeops::{ExistingPolicy, PrunedPolicy};

#[test]
fn copy_flags_parse() -> TestResult {
    let args = CliArgs::try_parse_from([
        "treeops",
        "copy",
        "src",
        "dst",
        "--glob",
        "**/*.rs",
        "-g",
        "!target/**",
        "--existing",
        "skip",
        "--pruned",
        "ignore",
        "--strip",
        "--depth",
        "3",
    ])?;

    let Command::Copy {
        source,
        destination,
        walk,
    } = args.command
    else {
        panic!("expected copy, got {:?}", args.command);
    };
    assert_eq!(source.to_str(), Some("src"));
    assert_eq!(destination.to_str(), Some("dst"));
    assert_eq!(walk.globs, vec!["**/*.rs", "!target/**"]);
    assert_eq!(walk.existing, Some(ExistingPolicy::Skip));
    assert_eq!(walk.pruned, Some(PrunedPolicy::Ignore));
    assert!(walk.strip);
    assert_eq!(walk.depth, Some(3));
    Ok(())
}

#[test]
fn bad_policy_and_missing_destination_are_rejected() {
    assert!(CliArgs::try_parse_from(["treeops", "copy", "a", "b", "--existing", "merge"]).is_err());
    assert!(CliArgs::try_parse_from(["treeops", "move", "a"]).is_err());
    assert!(CliArgs::try_parse_from(["treeops", "delete", "a"]).is_ok());
}

#[tokio::test]
async fn run_copies_with_flags() -> TestResult {
    init_tracing();
    let tree = TreeBuilder::new()
        .file("in/a.txt", "a")
        .file("in/skip.log", "log")
        .build();
    let source = tree.path("in");
    let destination = tree.path("out");

    let args = CliArgs::try_parse_from([
        OsStr::new("treeops"),
        OsStr::new("copy"),
        source.as_os_str(),
        destination.as_os_str(),
        OsStr::new("--glob"),
        OsStr::new("!**/*.log"),
    ])?;
    treeops::run(args).await?;

    assert_eq!(tree.files("out"), vec!["in/a.txt"]);
    Ok(())
}

#[tokio::test]
async fn run_fails_when_stop_policy_hits_a_collision() -> TestResult {
    let tree = TreeBuilder::new()
        .file("in/a.txt", "new")
        .file("out/in/a.txt", "old")
        .build();
    let source = tree.path("in");
    let destination = tree.path("out");

    let args = CliArgs::try_parse_from([
        OsStr::new("treeops"),
        OsStr::new("copy"),
        source.as_os_str(),
        destination.as_os_str(),
        OsStr::new("--existing"),
        OsStr::new("stop"),
    ])?;

    assert!(treeops::run(args).await.is_err());
    assert_eq!(tree.read("out/in/a.txt"), "old");
    Ok(())
}
