// src/logging.rs

//! Logging setup for `treeops` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution, first match wins:
//! 1. `--log-level` CLI flag, applied to `treeops` targets only
//! 2. `TREEOPS_LOG`, either a bare level (`debug`) or full `EnvFilter`
//!    directives (`treeops::watch=trace,notify=debug`)
//! 3. `treeops=info` with dependencies held at `warn`
//!
//! Logs go to STDERR so `files` / `dirs` listings on stdout stay
//! machine-readable.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const ENV_VAR: &str = "TREEOPS_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directives = filter_directives(cli_level, std::env::var(ENV_VAR).ok().as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {directives:?}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return crate_directive(level_name(level));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) if is_bare_level(raw) => crate_directive(&raw.to_lowercase()),
        Some(raw) => raw.to_string(),
        None => crate_directive("info"),
    }
}

fn crate_directive(level: &str) -> String {
    format!("warn,treeops={level}")
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn is_bare_level(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_env() {
        assert_eq!(
            filter_directives(Some(LogLevel::Debug), Some("trace")),
            "warn,treeops=debug"
        );
    }

    #[test]
    fn bare_env_level_scopes_to_crate() {
        assert_eq!(filter_directives(None, Some(" TRACE ")), "warn,treeops=trace");
    }

    #[test]
    fn env_directives_pass_through() {
        assert_eq!(
            filter_directives(None, Some("treeops::watch=trace")),
            "treeops::watch=trace"
        );
        assert_eq!(filter_directives(None, Some("")), "warn,treeops=info");
        assert_eq!(filter_directives(None, None), "warn,treeops=info");
    }
}
