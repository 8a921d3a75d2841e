// tests/archive_and_lock.rs

mod common;
use crate::common::{TestResult, TreeBuilder, init_tracing, relative_names};

use treeops::{Archive, File, Location, TreeError, WalkOptions};

#[test]
fn archive_walks_never_include_the_root() -> TestResult {
    init_tracing();
    let tree = TreeBuilder::new()
        .file("pkg/lib/a.txt", "a")
        .file("pkg/README", "readme")
        .build();
    let archive = Archive::mount(tree.path("pkg"))?;
    let root = tree.path("pkg");

    let files = relative_names(&root, archive.walk_files(&WalkOptions::new())?.map(Location::from));
    assert_eq!(files, vec!["README", "lib/a.txt"]);

    let dirs = relative_names(
        &root,
        archive.walk_directories(&WalkOptions::new())?.map(Location::from),
    );
    assert_eq!(dirs, vec!["lib"]);
    Ok(())
}

#[test]
fn archive_copy_lands_directly_in_destination() -> TestResult {
    let tree = TreeBuilder::new().file("pkg/lib/a.txt", "a").build();
    let archive = Archive::mount(tree.path("pkg"))?;

    archive.copy_to(tree.path("out"), &WalkOptions::new())?;

    assert_eq!(tree.files("out"), vec!["lib/a.txt"]);
    Ok(())
}

#[test]
fn archive_root_must_be_a_directory() {
    let tree = TreeBuilder::new().file("pkg.zip", "PK").build();

    let err = Archive::mount(tree.path("pkg.zip")).expect_err("a plain file is not mounted");
    assert!(matches!(err, TreeError::ConfigError(_)), "got {err:?}");
}

#[test]
fn try_lock_reports_contention() -> TestResult {
    let tree = TreeBuilder::new().build();
    let file = File::new(tree.path("locks/app.lock"));

    let held = file.lock()?;
    assert!(tree.exists("locks/app.lock"), "lock creates the file");
    assert!(file.try_lock()?.is_none());

    drop(held);
    let again = file.try_lock()?;
    assert!(again.is_some());
    Ok(())
}
