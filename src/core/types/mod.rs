//! Core type definitions

mod error;

pub use error::{LaunchError, LaunchResult};
