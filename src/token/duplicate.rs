//! Token duplication with explicit type and impersonation level

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::resource::OwnedHandle;

use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::securitybaseapi::DuplicateTokenEx;
use winapi::um::winnt::{
    SecurityIdentification, SecurityImpersonation, TokenImpersonation, TokenPrimary, HANDLE,
    SECURITY_IMPERSONATION_LEVEL, TOKEN_TYPE,
};

/// The kind of token a duplication produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Usable to create a process under the token's identity
    Primary,
    /// Usable only to impersonate on a thread
    Impersonation,
}

impl TokenKind {
    fn to_raw(self) -> TOKEN_TYPE {
        match self {
            TokenKind::Primary => TokenPrimary,
            TokenKind::Impersonation => TokenImpersonation,
        }
    }
}

/// Impersonation level attached to a duplicated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpersonationLevel {
    /// Identity can be queried but not acted upon
    Identification,
    /// Full local impersonation
    Impersonation,
}

impl ImpersonationLevel {
    fn to_raw(self) -> SECURITY_IMPERSONATION_LEVEL {
        match self {
            ImpersonationLevel::Identification => SecurityIdentification,
            ImpersonationLevel::Impersonation => SecurityImpersonation,
        }
    }
}

/// Duplicates a token into a new, independently owned handle
pub fn duplicate(
    token: &OwnedHandle,
    desired_access: DWORD,
    level: ImpersonationLevel,
    kind: TokenKind,
) -> LaunchResult<OwnedHandle> {
    let mut raw: HANDLE = std::ptr::null_mut();
    let ok = unsafe {
        DuplicateTokenEx(
            token.as_raw(),
            desired_access,
            std::ptr::null_mut(),
            level.to_raw(),
            kind.to_raw(),
            &mut raw,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::token_acquisition("DuplicateTokenEx"));
    }
    Ok(OwnedHandle::from_raw(raw))
}
