// tests/location_ops.rs

mod common;
use crate::common::{TestResult, TreeBuilder, init_tracing, relative_names};

use std::time::{Duration, SystemTime};

use treeops::{Directory, File, Located, Location, TreeError, WalkOptions};

#[test]
fn children_are_typed_and_sorted() -> TestResult {
    init_tracing();
    let tree = TreeBuilder::new()
        .file("in/b.txt", "b")
        .file("in/a/x.txt", "x")
        .build();
    let dir = Directory::new(tree.path("in"));

    let children = dir.children()?;

    assert_eq!(children.len(), 2);
    assert!(children[0].as_directory().is_some());
    assert_eq!(children[0].name(), "a");
    assert!(children[1].as_file().is_some());
    assert_eq!(children[1].name(), "b.txt");
    Ok(())
}

#[test]
fn descendants_exclude_the_directory_itself() {
    let tree = TreeBuilder::new()
        .file("in/a/x.txt", "x")
        .file("in/b.txt", "b")
        .build();
    let root = tree.path("in");

    let names = relative_names(&root, Directory::new(&root).descendants());

    assert_eq!(names, vec!["a", "a/x.txt", "b.txt"]);
}

#[test]
fn directory_size_sums_files() -> TestResult {
    let tree = TreeBuilder::new()
        .file("in/a.txt", "123")
        .file("in/sub/b.txt", "45678")
        .build();

    assert_eq!(Directory::new(tree.path("in")).size()?, 8);
    assert_eq!(File::new(tree.path("in/a.txt")).size()?, 3);
    Ok(())
}

#[test]
fn touch_creates_then_bumps_mtime() -> TestResult {
    let tree = TreeBuilder::new().build();
    let file = File::new(tree.path("new/dir/file.txt"));
    assert!(file.is_absent());

    file.touch()?;
    assert!(file.is_file());

    let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    file.set_last_modified(past)?;
    assert_eq!(file.last_modified()?, past);

    file.touch()?;
    assert!(file.last_modified()? > past);
    Ok(())
}

#[test]
fn file_handle_copy_and_delete() -> TestResult {
    let tree = TreeBuilder::new().file("a.txt", "a").dir("out").build();
    let file = File::new(tree.path("a.txt"));

    file.copy_to(tree.path("out"), &WalkOptions::new())?;
    assert_eq!(tree.read("out/a.txt"), "a");

    file.delete()?;
    assert!(file.is_absent());
    Ok(())
}

#[test]
fn directory_handle_walks() -> TestResult {
    let tree = TreeBuilder::new()
        .file("in/a.rs", "")
        .file("in/sub/b.rs", "")
        .file("in/sub/c.md", "")
        .build();
    let dir = Directory::new(tree.path("in"));

    let rust: Vec<File> = dir.walk_files(&WalkOptions::new().glob(["**/*.rs"]))?.collect();
    assert_eq!(rust, vec![dir.file("a.rs"), dir.directory("sub").file("b.rs")]);

    let dirs: Vec<Directory> = dir.walk_directories(&WalkOptions::new().strip())?.collect();
    assert_eq!(dirs, vec![dir.directory("sub")]);

    dir.move_to(tree.path("out"), &WalkOptions::new())?;
    assert!(dir.is_absent());
    assert_eq!(tree.files("out"), vec!["in/a.rs", "in/sub/b.rs", "in/sub/c.md"]);
    Ok(())
}

#[test]
fn locate_types_by_disk_state() {
    let tree = TreeBuilder::new().file("d/f.txt", "").build();

    assert!(matches!(Location::locate(tree.path("d")), Location::Directory(_)));
    assert!(matches!(Location::locate(tree.path("d/f.txt")), Location::File(_)));
    assert_eq!(
        Location::locate(tree.path("d")).parent().map(|p| p.into_path()),
        Some(tree.root().to_path_buf())
    );
}

#[test]
fn rename_to_keeps_the_parent() -> TestResult {
    let tree = TreeBuilder::new().file("root/src", "x").build();
    let source = File::new(tree.path("root/src"));

    let renamed = source.rename_to("dest")?;

    assert!(source.is_absent());
    assert_eq!(renamed, File::new(tree.path("root/dest")));
    assert_eq!(tree.read("root/dest"), "x");
    assert_eq!(renamed.rename_to("dest")?, renamed);
    Ok(())
}

#[test]
fn rename_to_an_existing_entry_of_either_type_fails() {
    let tree = TreeBuilder::new()
        .file("root/src", "src")
        .file("root/dest-file", "keep")
        .dir("root/dest-dir")
        .build();
    let source = File::new(tree.path("root/src"));

    for name in ["dest-file", "dest-dir"] {
        let err = source.rename_to(name).expect_err("target exists");
        assert!(matches!(err, TreeError::AlreadyExists(_)), "got {err:?}");
    }
    assert_eq!(tree.read("root/src"), "src");
    assert_eq!(tree.read("root/dest-file"), "keep");

    let err = source.rename_to("nested/name").expect_err("not a plain name");
    assert!(matches!(err, TreeError::ConfigError(_)), "got {err:?}");
}

#[test]
fn move_up_lands_beside_the_parent() -> TestResult {
    let tree = TreeBuilder::new().file("root/in/file", "original").build();
    let file = File::new(tree.path("root/in/file"));

    let up = file.move_up()?;

    assert!(file.is_absent());
    assert_eq!(up, File::new(tree.path("root/file")));
    assert_eq!(tree.read("root/file"), "original");
    assert!(tree.exists("root/in"));
    Ok(())
}

#[test]
fn move_up_replaces_an_existing_file() -> TestResult {
    let tree = TreeBuilder::new()
        .file("root/in/file", "original")
        .file("root/file", "dest")
        .build();

    File::new(tree.path("root/in/file")).move_up()?;

    assert_eq!(tree.read("root/file"), "original");
    assert!(!tree.exists("root/in/file"));
    Ok(())
}

#[test]
fn move_up_onto_a_directory_fails_without_moving() {
    let tree = TreeBuilder::new()
        .file("root/in/file", "original")
        .dir("root/file")
        .build();

    let err = File::new(tree.path("root/in/file"))
        .move_up()
        .expect_err("a directory is in the way");

    assert!(matches!(err, TreeError::AlreadyExists(_)), "got {err:?}");
    assert_eq!(tree.read("root/in/file"), "original");
    assert!(tree.path("root/file").is_dir());
}

#[test]
fn directory_move_up_merges_into_same_name() -> TestResult {
    let tree = TreeBuilder::new()
        .file("root/in/pkg/a.txt", "a")
        .file("root/pkg/b.txt", "b")
        .build();

    let up = Directory::new(tree.path("root/in/pkg")).move_up()?;

    assert_eq!(up, Directory::new(tree.path("root/pkg")));
    assert_eq!(tree.files("root"), vec!["pkg/a.txt", "pkg/b.txt"]);
    assert!(tree.exists("root/in"));
    Ok(())
}
