//! Configuration validator for privlaunch
//!
//! Validates configuration values before a pipeline is built from them.

use super::loader::{Config, ConfigError, LaunchConfig, LoggingConfig};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_launch(&config.launch)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates pipeline configuration
    fn validate_launch(launch: &LaunchConfig) -> Result<(), ConfigError> {
        if launch.target_service.is_empty() {
            return Err(ConfigError::Invalid(
                "Target service name cannot be empty".to_string(),
            ));
        }

        if launch.system_host_image.is_empty() {
            return Err(ConfigError::Invalid(
                "System host image name cannot be empty".to_string(),
            ));
        }

        // Privilege constants are all of the form Se...Privilege.
        if !launch.elevation_privilege.starts_with("Se") {
            return Err(ConfigError::Invalid(format!(
                "Not a privilege name: {}",
                launch.elevation_privilege
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
