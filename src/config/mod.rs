// src/config/mod.rs

//! Walk configuration.
//!
//! Responsibilities:
//! - The in-memory `WalkOptions` builder used by every tree operation
//!   (`options.rs`).
//! - The TOML-backed options file model (`model.rs`).
//! - Loading an options file from disk (`loader.rs`).
//! - Validating it into `WalkOptions` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{default_options_path, load_and_validate, load_from_path};
pub use model::RawOptions;
pub use options::WalkOptions;
