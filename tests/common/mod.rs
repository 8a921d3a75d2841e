#![allow(dead_code)]

pub use treeops_test_utils::{
    TestTree, TreeBuilder, init_tracing, list_dirs, list_files, relative_names, with_timeout,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
