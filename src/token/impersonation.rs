//! Calling-thread impersonation control
//!
//! The thread's impersonation slot is global per-thread OS state. It is only
//! ever touched through [`ImpersonationGuard`] so that every pipeline
//! invocation is symmetric: whatever identity was adopted, the thread is back
//! to non-impersonating by the time the guard drops, exactly once.

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::error::last_os_error;
use crate::windows::resource::OwnedHandle;

use winapi::shared::minwindef::{FALSE, TRUE};
use winapi::um::handleapi::CloseHandle;
use winapi::um::processthreadsapi::{GetCurrentThread, OpenThreadToken, SetThreadToken};
use winapi::um::winnt::{HANDLE, TOKEN_QUERY};

/// Scoped ownership of the calling thread's impersonation slot
///
/// Not `Send`: the slot it manages belongs to the thread that created it.
pub struct ImpersonationGuard {
    active: bool,
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ImpersonationGuard {
    /// Creates a guard for a thread that is currently not impersonating
    pub fn new() -> Self {
        ImpersonationGuard {
            active: false,
            _not_send: std::marker::PhantomData,
        }
    }

    /// Makes the calling thread impersonate the given token
    ///
    /// A second call supersedes the previous identity; the guard still
    /// restores the thread with a single clear on drop.
    pub fn impersonate(&mut self, token: &OwnedHandle) -> LaunchResult<()> {
        if !token.is_valid() {
            // SetThreadToken(NULL, NULL) would silently clear the slot
            // instead of adopting an identity.
            return Err(LaunchError::Impersonation(windows::core::Error::from(
                crate::windows::error::hresult_from_win32(
                    crate::windows::error::ERROR_INVALID_HANDLE,
                ),
            )));
        }
        let ok = unsafe { SetThreadToken(std::ptr::null_mut(), token.as_raw()) } != FALSE;
        if !ok {
            return Err(LaunchError::Impersonation(last_os_error()));
        }
        self.active = true;
        Ok(())
    }

    /// Restores the thread to non-impersonating; idempotent
    pub fn revert(&mut self) {
        if self.active {
            unsafe {
                SetThreadToken(std::ptr::null_mut(), std::ptr::null_mut());
            }
            self.active = false;
        }
    }

    /// Whether this guard has put an identity on the thread
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for ImpersonationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ImpersonationGuard {
    fn drop(&mut self) {
        self.revert();
    }
}

/// Whether the calling thread currently carries an impersonation token
///
/// Used by tests to verify the restoration invariant.
pub fn thread_is_impersonating() -> bool {
    let mut raw: HANDLE = std::ptr::null_mut();
    // OpenAsSelf = TRUE so the check works even under a restricted identity.
    let ok =
        unsafe { OpenThreadToken(GetCurrentThread(), TOKEN_QUERY, TRUE, &mut raw) } != FALSE;
    if ok {
        unsafe {
            CloseHandle(raw);
        }
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::duplicate::{duplicate, ImpersonationLevel, TokenKind};
    use crate::token::source::TokenSource;
    use winapi::um::winnt::MAXIMUM_ALLOWED;

    fn own_impersonation_token() -> OwnedHandle {
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
    fn test_impersonate_and_revert() {
        let _ledger = crate::windows::resource::ledger_guard();
        assert!(!thread_is_impersonating());
        let token = own_impersonation_token();
        {
            let mut guard = ImpersonationGuard::new();
            guard.impersonate(&token).unwrap();
            assert!(guard.is_active());
            assert!(thread_is_impersonating());
        }
        assert!(!thread_is_impersonating());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_revert_is_idempotent() {
        let _ledger = crate::windows::resource::ledger_guard();
        let token = own_impersonation_token();
        let mut guard = ImpersonationGuard::new();
        guard.impersonate(&token).unwrap();
        guard.revert();
        assert!(!thread_is_impersonating());
        guard.revert();
        assert!(!guard.is_active());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_superseding_impersonation_restores_once() {
        let _ledger = crate::windows::resource::ledger_guard();
        let first = own_impersonation_token();
        let second = own_impersonation_token();
        {
            let mut guard = ImpersonationGuard::new();
            guard.impersonate(&first).unwrap();
            guard.impersonate(&second).unwrap();
            assert!(thread_is_impersonating());
        }
        assert!(!thread_is_impersonating());
    }

    #[test]
    fn test_impersonate_invalid_token_fails() {
        let invalid = OwnedHandle::unacquired();
        let mut guard = ImpersonationGuard::new();
        let result = guard.impersonate(&invalid);
        assert!(matches!(result, Err(LaunchError::Impersonation(_))));
        assert!(!guard.is_active());
    }
}
