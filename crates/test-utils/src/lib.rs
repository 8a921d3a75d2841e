pub mod builders;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use builders::{TestTree, TreeBuilder, list_dirs, list_files, relative_names};

static INIT: Once = Once::new();

/// Upper bound for any single awaited step in a watch test.
pub const WATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a per-test tracing subscriber once per test binary.
///
/// Output is captured by the harness and shown only for failing tests
/// (or with `-- --nocapture`). `RUST_LOG` overrides the default of
/// `warn,treeops=debug`, e.g. `RUST_LOG=treeops::watch=trace cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,treeops=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .init();
    });
}

/// Await `f`, failing the test after [`WATCH_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(WATCH_TIMEOUT, f)
        .await
        .expect("no watch event within the timeout")
}
