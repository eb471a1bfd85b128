//! Configuration loader for privlaunch
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use winapi::shared::minwindef::{DWORD, WORD};
use winapi::um::winbase::{
    ABOVE_NORMAL_PRIORITY_CLASS, BELOW_NORMAL_PRIORITY_CLASS, HIGH_PRIORITY_CLASS,
    IDLE_PRIORITY_CLASS, NORMAL_PRIORITY_CLASS, REALTIME_PRIORITY_CLASS,
};
use winapi::um::winnt::{
    SECURITY_MANDATORY_HIGH_RID, SECURITY_MANDATORY_LOW_RID, SECURITY_MANDATORY_MEDIUM_RID,
    SECURITY_MANDATORY_SYSTEM_RID, SECURITY_MANDATORY_UNTRUSTED_RID,
};
use winapi::um::winuser::{
    SW_HIDE, SW_SHOWDEFAULT, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, SW_SHOWNORMAL,
};

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Mandatory integrity label applied to the target token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrityLevel {
    Untrusted,
    Low,
    Medium,
    High,
    System,
}

impl IntegrityLevel {
    /// The mandatory-label rid (S-1-16-rid) for this level
    pub fn rid(self) -> u32 {
        match self {
            IntegrityLevel::Untrusted => SECURITY_MANDATORY_UNTRUSTED_RID as u32,
            IntegrityLevel::Low => SECURITY_MANDATORY_LOW_RID as u32,
            IntegrityLevel::Medium => SECURITY_MANDATORY_MEDIUM_RID as u32,
            IntegrityLevel::High => SECURITY_MANDATORY_HIGH_RID as u32,
            IntegrityLevel::System => SECURITY_MANDATORY_SYSTEM_RID as u32,
        }
    }
}

/// Scheduling priority class for the launched process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityClass {
    Idle,
    BelowNormal,
    Normal,
    AboveNormal,
    High,
    Realtime,
}

impl PriorityClass {
    /// The raw process priority class value
    pub fn to_raw(self) -> DWORD {
        match self {
            PriorityClass::Idle => IDLE_PRIORITY_CLASS,
            PriorityClass::BelowNormal => BELOW_NORMAL_PRIORITY_CLASS,
            PriorityClass::Normal => NORMAL_PRIORITY_CLASS,
            PriorityClass::AboveNormal => ABOVE_NORMAL_PRIORITY_CLASS,
            PriorityClass::High => HIGH_PRIORITY_CLASS,
            PriorityClass::Realtime => REALTIME_PRIORITY_CLASS,
        }
    }
}

/// Initial window visibility for the launched process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShowWindowMode {
    Default,
    Hidden,
    Normal,
    Minimized,
    Maximized,
}

impl ShowWindowMode {
    /// The SW_* value used in the startup info
    pub fn to_raw(self) -> WORD {
        match self {
            ShowWindowMode::Default => SW_SHOWDEFAULT as WORD,
            ShowWindowMode::Hidden => SW_HIDE as WORD,
            ShowWindowMode::Normal => SW_SHOWNORMAL as WORD,
            ShowWindowMode::Minimized => SW_SHOWMINIMIZED as WORD,
            ShowWindowMode::Maximized => SW_SHOWMAXIMIZED as WORD,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_launch")]
    pub launch: LaunchConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Pipeline configuration: identity source and launch parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Service whose host process provides the target identity
    #[serde(default = "default_target_service")]
    pub target_service: String,
    /// Image name of the OS-core process used for the system pivot
    #[serde(default = "default_system_host_image")]
    pub system_host_image: String,
    /// Privilege enabled during self-elevation
    #[serde(default = "default_elevation_privilege")]
    pub elevation_privilege: String,
    /// Mandatory label applied to the target token
    #[serde(default = "default_integrity")]
    pub integrity: IntegrityLevel,
    /// Priority class for the launched process
    #[serde(default = "default_priority")]
    pub priority: PriorityClass,
    /// Initial window visibility
    #[serde(default = "default_show_window")]
    pub show_window: ShowWindowMode,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file doesn't exist
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|_| Config::default())
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
///
/// A missing file yields the defaults; a file that exists but cannot be
/// read or parsed is reported, never silently replaced.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("privlaunch.toml")
}

/// Loads configuration from an explicit path with the same missing-file rule
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    match ConfigLoader::new(path).load() {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
        Err(err) => Err(err),
    }
}

// Default functions for serde
fn default_launch() -> LaunchConfig {
    let defaults = default_config();
    LaunchConfig {
        target_service: defaults.launch.target_service,
        system_host_image: defaults.launch.system_host_image,
        elevation_privilege: defaults.launch.elevation_privilege,
        integrity: defaults.launch.integrity,
        priority: defaults.launch.priority,
        show_window: defaults.launch.show_window,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

fn default_target_service() -> String {
    default_config().launch.target_service
}

fn default_system_host_image() -> String {
    default_config().launch.system_host_image
}

fn default_elevation_privilege() -> String {
    default_config().launch.elevation_privilege
}

fn default_integrity() -> IntegrityLevel {
    default_config().launch.integrity
}

fn default_priority() -> PriorityClass {
    default_config().launch.priority
}

fn default_show_window() -> ShowWindowMode {
    default_config().launch.show_window
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            launch: default_launch(),
            logging: default_logging(),
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        default_launch()
    }
}
