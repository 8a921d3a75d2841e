// tests/enumerate.rs

mod common;
use crate::common::{TestResult, TreeBuilder, init_tracing, relative_names};

use std::fs::Metadata;
use std::path::Path;

use treeops::walk;
use treeops::{CancelToken, OperationMode, TreeWalker, WalkOptions};

fn sample() -> common::TestTree {
    TreeBuilder::new()
        .file("in/b.txt", "bb")
        .file("in/a.txt", "a")
        .file("in/notes.md", "notes")
        .file("in/sub/c.txt", "cccc")
        .file("in/sub/deeper/d.txt", "ddddd")
        .dir("in/cache/blobs")
        .build()
}

#[test]
fn files_come_out_sorted_depth_first() -> TestResult {
    init_tracing();
    let tree = sample();
    let root = tree.path("in");

    let files = relative_names(&root, walk::files(&root, &WalkOptions::new())?);

    assert_eq!(
        files,
        vec!["a.txt", "b.txt", "notes.md", "sub/c.txt", "sub/deeper/d.txt"]
    );
    Ok(())
}

#[test]
fn file_globs_filter_by_relative_path() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let top = relative_names(&root, walk::files(&root, &WalkOptions::new().glob(["*.txt"]))?);
    assert_eq!(top, vec!["a.txt", "b.txt"]);

    let deep = relative_names(
        &root,
        walk::files(&root, &WalkOptions::new().glob(["**/*.txt", "!sub/deeper/**"]))?,
    );
    assert_eq!(deep, vec!["a.txt", "b.txt", "sub/c.txt"]);
    Ok(())
}

#[test]
fn depth_one_lists_immediate_children_only() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let files = relative_names(&root, walk::files(&root, &WalkOptions::new().depth(1))?);
    assert_eq!(files, vec!["a.txt", "b.txt", "notes.md"]);

    let dirs = relative_names(&root, walk::directories(&root, &WalkOptions::new().depth(1))?);
    assert_eq!(dirs, vec!["", "cache", "sub"]);
    Ok(())
}

#[test]
fn depth_zero_visits_only_the_root() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let dirs = relative_names(&root, walk::directories(&root, &WalkOptions::new().depth(0))?);
    assert_eq!(dirs, vec![""]);
    assert_eq!(walk::files(&root, &WalkOptions::new().depth(0))?.count(), 0);
    Ok(())
}

#[test]
fn directories_include_root_unless_stripped() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let all = relative_names(&root, walk::directories(&root, &WalkOptions::new())?);
    assert_eq!(all, vec!["", "cache", "cache/blobs", "sub", "sub/deeper"]);

    let stripped = relative_names(&root, walk::directories(&root, &WalkOptions::new().strip())?);
    assert_eq!(stripped, vec!["cache", "cache/blobs", "sub", "sub/deeper"]);
    Ok(())
}

#[test]
fn directory_listing_counts_directories_not_files() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let mut dirs = walk::directories(&root, &WalkOptions::new().strip())?;
    let listed = dirs.by_ref().count();
    let report = dirs.report();

    assert_eq!(listed, 4);
    assert_eq!(report.dirs_emitted, 4);
    assert_eq!(report.files_applied, 0);
    Ok(())
}

#[test]
fn negation_prunes_directories_in_directory_mode() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let dirs = relative_names(
        &root,
        walk::directories(&root, &WalkOptions::new().strip().glob(["!cache"]))?,
    );
    assert_eq!(dirs, vec!["sub", "sub/deeper"]);
    Ok(())
}

#[test]
fn custom_predicate_replaces_include_patterns() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let options = WalkOptions::new()
        .glob(["*.never", "!**/*.md"])
        .take(|_rel: &Path, meta: &Metadata| meta.len() >= 2);
    let files = relative_names(&root, walk::files(&root, &options)?);

    // `notes.md` is long enough but still excluded by the negation.
    assert_eq!(files, vec!["b.txt", "sub/c.txt", "sub/deeper/d.txt"]);
    Ok(())
}

#[test]
fn enumeration_is_lazy() -> TestResult {
    let tree = sample();
    let root = tree.path("in");

    let mut files = walk::files(&root, &WalkOptions::new())?;
    let first = files.next().expect("at least one file");
    assert!(first.to_string().ends_with("a.txt"));
    assert_eq!(files.report().files_applied, 1);
    Ok(())
}

#[test]
fn cancelled_walk_stops_without_effects() -> TestResult {
    let tree = sample();
    let token = CancelToken::new();
    token.cancel();

    let report = TreeWalker::new(tree.path("in"), OperationMode::Copy, WalkOptions::new())
        .destination(tree.path("out"))
        .cancel_token(token)
        .run()?;

    assert!(report.cancelled);
    assert_eq!(report.files_applied, 0);
    assert!(!tree.exists("out"));
    Ok(())
}

#[test]
fn cancelling_mid_enumeration_ends_the_stream() -> TestResult {
    let tree = sample();
    let token = CancelToken::new();

    let mut files =
        TreeWalker::new(tree.path("in"), OperationMode::EnumerateFiles, WalkOptions::new())
            .cancel_token(token.clone())
            .locations()?;
    assert!(files.next().is_some());
    token.cancel();
    assert!(files.next().is_none());
    Ok(())
}
