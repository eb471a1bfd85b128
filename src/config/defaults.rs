//! Default configuration values for privlaunch

use serde::{Deserialize, Serialize};

use super::loader::{IntegrityLevel, PriorityClass, ShowWindowMode};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub launch: LaunchDefaults,
    pub logging: LoggingDefaults,
}

/// Default launch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchDefaults {
    pub target_service: String,
    pub system_host_image: String,
    pub elevation_privilege: String,
    pub integrity: IntegrityLevel,
    pub priority: PriorityClass,
    pub show_window: ShowWindowMode,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        launch: LaunchDefaults {
            // The Windows Modules Installer service runs as the most
            // privileged service identity available.
            target_service: "TrustedInstaller".to_string(),
            system_host_image: "lsass.exe".to_string(),
            elevation_privilege: "SeDebugPrivilege".to_string(),
            integrity: IntegrityLevel::System,
            priority: PriorityClass::AboveNormal,
            show_window: ShowWindowMode::Default,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
