//! Privilege adjustment on security tokens

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::error::{last_error_code, ERROR_NOT_ALL_ASSIGNED};
use crate::windows::resource::OwnedHandle;
use crate::windows::strings::string_to_wide;

use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::securitybaseapi::{AdjustTokenPrivileges, GetTokenInformation};
use winapi::um::winbase::LookupPrivilegeValueW;
use winapi::um::winnt::{
    TokenPrivileges, LUID, LUID_AND_ATTRIBUTES, SE_PRIVILEGE_ENABLED, TOKEN_PRIVILEGES,
};

/// Enables one named privilege on a token
///
/// A partially applied adjustment (the call succeeds but the OS reports
/// `ERROR_NOT_ALL_ASSIGNED`) is treated as a failure: the pipeline must not
/// continue on a token that does not actually hold what was requested.
pub fn enable_privilege(token: &OwnedHandle, privilege_name: &str) -> LaunchResult<()> {
    let wide_name = string_to_wide(privilege_name);

    let mut luid = LUID {
        LowPart: 0,
        HighPart: 0,
    };
    let ok =
        unsafe { LookupPrivilegeValueW(std::ptr::null(), wide_name.as_ptr(), &mut luid) } != FALSE;
    if !ok {
        return Err(LaunchError::privilege_adjustment(privilege_name));
    }

    let mut privileges = TOKEN_PRIVILEGES {
        PrivilegeCount: 1,
        Privileges: [LUID_AND_ATTRIBUTES {
            Luid: luid,
            Attributes: SE_PRIVILEGE_ENABLED,
        }],
    };

    let ok = unsafe {
        AdjustTokenPrivileges(
            token.as_raw(),
            FALSE,
            &mut privileges,
            std::mem::size_of::<TOKEN_PRIVILEGES>() as DWORD,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    } != FALSE;
    if !ok || last_error_code() == ERROR_NOT_ALL_ASSIGNED {
        return Err(LaunchError::privilege_adjustment(privilege_name));
    }

    Ok(())
}

/// Enables every privilege present on a token
///
/// Queries the token's own privilege set and re-adjusts it with every entry
/// enabled. The same partial-grant rule applies as for a single privilege.
pub fn enable_all_privileges(token: &OwnedHandle) -> LaunchResult<()> {
    let mut length: DWORD = 0;
    unsafe {
        GetTokenInformation(
            token.as_raw(),
            TokenPrivileges,
            std::ptr::null_mut(),
            0,
            &mut length,
        );
    }
    if length == 0 {
        return Err(LaunchError::privilege_adjustment("(all)"));
    }

    // u64-backed buffer keeps TOKEN_PRIVILEGES alignment requirements met.
    let mut buffer = vec![0u64; (length as usize + 7) / 8];
    let ok = unsafe {
        GetTokenInformation(
            token.as_raw(),
            TokenPrivileges,
            buffer.as_mut_ptr() as *mut _,
            length,
            &mut length,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::privilege_adjustment("(all)"));
    }

    let privileges = buffer.as_mut_ptr() as *mut TOKEN_PRIVILEGES;
    unsafe {
        let count = (*privileges).PrivilegeCount as usize;
        let entries =
            std::slice::from_raw_parts_mut((*privileges).Privileges.as_mut_ptr(), count);
        for entry in entries {
            entry.Attributes = SE_PRIVILEGE_ENABLED;
        }
    }

    let ok = unsafe {
        AdjustTokenPrivileges(
            token.as_raw(),
            FALSE,
            privileges,
            length,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    } != FALSE;
    if !ok || last_error_code() == ERROR_NOT_ALL_ASSIGNED {
        return Err(LaunchError::privilege_adjustment("(all)"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::duplicate::{duplicate, ImpersonationLevel, TokenKind};
    use crate::token::source::TokenSource;
    use winapi::um::winnt::MAXIMUM_ALLOWED;

    fn duplicated_own_token() -> OwnedHandle {
        let token = TokenSource::CurrentProcess.open(MAXIMUM_ALLOWED).unwrap();
        duplicate(
            &token,
            MAXIMUM_ALLOWED,
            ImpersonationLevel::Impersonation,
            TokenKind::Impersonation,
        )
        .unwrap()
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enable_nonexistent_privilege_fails() {
        let _ledger = crate::windows::resource::ledger_guard();
        let token = duplicated_own_token();
        let result = enable_privilege(&token, "SeNoSuchPrivilege");
        assert!(matches!(
            result,
            Err(LaunchError::PrivilegeAdjustment { .. })
        ));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enable_change_notify_privilege() {
        let _ledger = crate::windows::resource::ledger_guard();
        // SeChangeNotifyPrivilege is held by every token, so enabling it
        // succeeds regardless of elevation.
        let token = duplicated_own_token();
        enable_privilege(&token, "SeChangeNotifyPrivilege").unwrap();
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enable_debug_privilege_partial_grant_is_error() {
        let _ledger = crate::windows::resource::ledger_guard();
        // Without elevation the privilege is absent from the token and the
        // adjustment is reported as not-all-assigned; either way the result
        // must not be a silent success on a token lacking the privilege.
        let token = duplicated_own_token();
        let result = enable_privilege(&token, "SeDebugPrivilege");
        if result.is_err() {
            assert!(matches!(
                result,
                Err(LaunchError::PrivilegeAdjustment { .. })
            ));
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enable_all_privileges_on_own_duplicate() {
        let _ledger = crate::windows::resource::ledger_guard();
        let token = duplicated_own_token();
        // Every privilege the token holds can be enabled on a duplicate the
        // caller fully controls.
        let result = enable_all_privileges(&token);
        if let Err(err) = result {
            // Restricted tokens may refuse; the failure must carry a code.
            assert_ne!(err.code().0, 0);
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enable_all_on_invalid_token_fails() {
        let invalid = OwnedHandle::unacquired();
        assert!(enable_all_privileges(&invalid).is_err());
    }
}
