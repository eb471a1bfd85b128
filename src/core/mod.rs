//! Core module with shared types and constants

pub mod types;

pub use types::{LaunchError, LaunchResult};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate authors from Cargo.toml
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(target_os = "windows"))]
compile_error!("privlaunch only supports Windows platform");
