//! Token information queries and mutations

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::guard::ScopeGuard;
use crate::windows::resource::OwnedHandle;

use winapi::shared::minwindef::{DWORD, FALSE, LPVOID};
use winapi::um::securitybaseapi::{
    AllocateAndInitializeSid, FreeSid, GetLengthSid, GetTokenInformation, SetTokenInformation,
};
use winapi::um::winnt::{
    TokenIntegrityLevel, TokenSessionId, PSID, SE_GROUP_INTEGRITY, SID_AND_ATTRIBUTES,
    SID_IDENTIFIER_AUTHORITY, TOKEN_MANDATORY_LABEL,
};

// SECURITY_MANDATORY_LABEL_AUTHORITY, the authority of S-1-16-x mandatory
// label SIDs.
const MANDATORY_LABEL_AUTHORITY: [u8; 6] = [0, 0, 0, 0, 0, 16];

/// Reads the logon session id a token belongs to
pub fn session_id(token: &OwnedHandle) -> LaunchResult<u32> {
    let mut session: DWORD = 0;
    let mut length: DWORD = 0;
    let ok = unsafe {
        GetTokenInformation(
            token.as_raw(),
            TokenSessionId,
            &mut session as *mut DWORD as LPVOID,
            std::mem::size_of::<DWORD>() as DWORD,
            &mut length,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::token_acquisition("TokenSessionId query"));
    }
    Ok(session)
}

/// Binds a primary token to a logon session
///
/// Requires the caller to hold SeTcbPrivilege, which the pipeline has after
/// the system pivot.
pub fn set_session_id(token: &OwnedHandle, session: u32) -> LaunchResult<()> {
    let mut session: DWORD = session;
    let ok = unsafe {
        SetTokenInformation(
            token.as_raw(),
            TokenSessionId,
            &mut session as *mut DWORD as LPVOID,
            std::mem::size_of::<DWORD>() as DWORD,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::token_configuration("session id"));
    }
    Ok(())
}

/// Applies a mandatory integrity label (S-1-16-rid) to a token
pub fn set_integrity_level(token: &OwnedHandle, rid: u32) -> LaunchResult<()> {
    let mut authority = SID_IDENTIFIER_AUTHORITY {
        Value: MANDATORY_LABEL_AUTHORITY,
    };

    let mut sid: PSID = std::ptr::null_mut();
    let ok = unsafe {
        AllocateAndInitializeSid(&mut authority, 1, rid, 0, 0, 0, 0, 0, 0, 0, &mut sid)
    } != FALSE;
    if !ok {
        return Err(LaunchError::token_configuration("integrity label sid"));
    }
    let _sid_guard = ScopeGuard::new(|| unsafe {
        FreeSid(sid);
    });

    let mut label = TOKEN_MANDATORY_LABEL {
        Label: SID_AND_ATTRIBUTES {
            Sid: sid,
            Attributes: SE_GROUP_INTEGRITY,
        },
    };
    let length =
        std::mem::size_of::<TOKEN_MANDATORY_LABEL>() as DWORD + unsafe { GetLengthSid(sid) };

    let ok = unsafe {
        SetTokenInformation(
            token.as_raw(),
            TokenIntegrityLevel,
            &mut label as *mut TOKEN_MANDATORY_LABEL as LPVOID,
            length,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::token_configuration("integrity label"));
    }
    Ok(())
}
