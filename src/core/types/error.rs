//! Custom error types for privlaunch

use crate::windows::error::last_os_error;
use thiserror::Error;
use windows::core::HRESULT;

/// Main error type for the token pivot and launch pipeline
///
/// One variant per failure stage. Every variant carries the originating
/// Windows error so the caller receives the first OS status verbatim.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to acquire token ({operation}): {error}")]
    TokenAcquisition {
        operation: String,
        error: windows::core::Error,
    },

    #[error("Failed to enable privilege {privilege}: {error}")]
    PrivilegeAdjustment {
        privilege: String,
        error: windows::core::Error,
    },

    #[error("Failed to impersonate on the calling thread: {0}")]
    Impersonation(windows::core::Error),

    #[error("Failed to resolve identity source {name}: {error}")]
    IdentityResolution {
        name: String,
        error: windows::core::Error,
    },

    #[error("Failed to configure target token ({what}): {error}")]
    TokenConfiguration {
        what: &'static str,
        error: windows::core::Error,
    },

    #[error("Environment block operation failed ({context}): {error}")]
    Environment {
        context: &'static str,
        error: windows::core::Error,
    },

    #[error("Process creation failed: {0}")]
    ProcessCreation(windows::core::Error),

    #[error("Failed to resume launched process: {0}")]
    ProcessResume(windows::core::Error),

    #[error("Command line must not be empty")]
    EmptyCommandLine,
}

/// Result type alias for pipeline operations
pub type LaunchResult<T> = Result<T, LaunchError>;

const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;

impl LaunchError {
    /// Creates a token acquisition error from the last OS error
    pub fn token_acquisition(operation: impl Into<String>) -> Self {
        LaunchError::TokenAcquisition {
            operation: operation.into(),
            error: last_os_error(),
        }
    }

    /// Creates a privilege adjustment error from the last OS error
    pub fn privilege_adjustment(privilege: impl Into<String>) -> Self {
        LaunchError::PrivilegeAdjustment {
            privilege: privilege.into(),
            error: last_os_error(),
        }
    }

    /// Creates an identity resolution error from the last OS error
    pub fn identity_resolution(name: impl Into<String>) -> Self {
        LaunchError::IdentityResolution {
            name: name.into(),
            error: last_os_error(),
        }
    }

    /// Creates an identity resolution error with an explicit Win32 code
    pub fn identity_resolution_code(name: impl Into<String>, code: u32) -> Self {
        LaunchError::IdentityResolution {
            name: name.into(),
            error: windows::core::Error::from(crate::windows::error::hresult_from_win32(code)),
        }
    }

    /// Creates a token configuration error from the last OS error
    pub fn token_configuration(what: &'static str) -> Self {
        LaunchError::TokenConfiguration {
            what,
            error: last_os_error(),
        }
    }

    /// Creates an environment error from the last OS error
    pub fn environment(context: &'static str) -> Self {
        LaunchError::Environment {
            context,
            error: last_os_error(),
        }
    }

    /// The unified status code for this failure
    ///
    /// Mirrors the HRESULT the failing OS call produced; this is the value
    /// the binary exits with.
    pub fn code(&self) -> HRESULT {
        match self {
            LaunchError::TokenAcquisition { error, .. }
            | LaunchError::PrivilegeAdjustment { error, .. }
            | LaunchError::IdentityResolution { error, .. }
            | LaunchError::TokenConfiguration { error, .. }
            | LaunchError::Environment { error, .. } => error.code(),
            LaunchError::Impersonation(error)
            | LaunchError::ProcessCreation(error)
            | LaunchError::ProcessResume(error) => error.code(),
            LaunchError::EmptyCommandLine => HRESULT(E_INVALIDARG),
        }
    }

    /// The stage taxonomy name for this failure, used in logs
    pub fn stage_name(&self) -> &'static str {
        match self {
            LaunchError::TokenAcquisition { .. } => "token-acquisition",
            LaunchError::PrivilegeAdjustment { .. } => "privilege-adjustment",
            LaunchError::Impersonation(_) => "impersonation",
            LaunchError::IdentityResolution { .. } => "identity-resolution",
            LaunchError::TokenConfiguration { .. } => "token-configuration",
            LaunchError::Environment { .. } => "environment",
            LaunchError::ProcessCreation(_) | LaunchError::ProcessResume(_) => "launch",
            LaunchError::EmptyCommandLine => "argument-validation",
        }
    }
}
