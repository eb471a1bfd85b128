//! privlaunch - launch a process under the TrustedInstaller service identity
//!
//! Implements a four-stage token pipeline: self-elevation with the debug
//! privilege, a pivot to the OS security subsystem's identity, construction
//! of a primary token from the target service's host process, and finally
//! creation of the requested process under that token.

pub mod config;
pub mod core;
pub mod pipeline;
pub mod process;
pub mod token;
pub mod windows;

pub use crate::config::{Config, ConfigError, IntegrityLevel, LaunchConfig, PriorityClass};
pub use crate::core::types::{LaunchError, LaunchResult};
pub use crate::pipeline::{launch, Pipeline, Stage};
pub use crate::token::ImpersonationGuard;
pub use crate::windows::outstanding_resources;
