//! Configuration management for privlaunch
//!
//! Loading, defaults, and validation for the launch pipeline configuration.

pub mod defaults;
pub mod loader;
pub mod validator;

pub use defaults::default_config;
pub use loader::{
    load_config, load_config_from, Config, ConfigError, ConfigLoader, IntegrityLevel,
    LaunchConfig, LoggingConfig, PriorityClass, ShowWindowMode,
};
pub use validator::{validate_config, ConfigValidator};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
