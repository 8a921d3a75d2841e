// tests/pruned_policy.rs

mod common;
use crate::common::{TestResult, TreeBuilder, init_tracing};

use treeops::walk;
use treeops::{PrunedPolicy, TreeError, WalkOptions};

#[test]
fn retained_prune_keeps_parent_on_delete() -> TestResult {
    init_tracing();
    let tree = TreeBuilder::new()
        .file("in/drop.txt", "d")
        .file("in/keep/k.txt", "k")
        .build();

    let report = walk::delete(&tree.path("in"), &WalkOptions::new().glob(["!keep/**"]))?;

    assert_eq!(tree.files("in"), vec!["keep/k.txt"]);
    assert_eq!(report.pruned, 1);
    Ok(())
}

#[test]
fn retained_prune_keeps_parent_on_move() -> TestResult {
    let tree = TreeBuilder::new()
        .file("in/a.txt", "a")
        .file("in/node_modules/pkg/index.js", "js")
        .build();

    // Root accepted: the base is the parent, so the subtree is `in/node_modules`.
    walk::move_to(
        &tree.path("in"),
        &tree.path("out"),
        &WalkOptions::new().glob(["!in/node_modules/**"]),
    )?;

    assert_eq!(tree.files("in"), vec!["node_modules/pkg/index.js"]);
    assert_eq!(tree.files("out"), vec!["in/a.txt"]);
    Ok(())
}

#[test]
fn ignored_prune_fails_removing_non_empty_parent() {
    let tree = TreeBuilder::new()
        .file("in/drop.txt", "d")
        .file("in/keep/k.txt", "k")
        .build();

    let err = walk::delete(
        &tree.path("in"),
        &WalkOptions::new()
            .glob(["!keep/**"])
            .pruned(PrunedPolicy::Ignore),
    )
    .expect_err("removing the non-empty root must fail");

    match err {
        TreeError::Io { path, .. } => assert_eq!(path, tree.path("in")),
        other => panic!("expected Io error, got {other:?}"),
    }
    // No rollback: work done before the failure stays done.
    assert!(!tree.exists("in/drop.txt"));
    assert_eq!(tree.files("in"), vec!["keep/k.txt"]);
}
