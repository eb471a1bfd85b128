//! Integration tests for token acquisition, duplication, and adjustment

use privlaunch::core::types::LaunchError;
use privlaunch::token::{
    duplicate, enable_privilege, pivot, session_id, thread_is_impersonating, ImpersonationGuard,
    ImpersonationLevel, PivotRequest, PrivilegeRequest, TokenKind, TokenSource,
};
use winapi::um::winnt::{MAXIMUM_ALLOWED, TOKEN_DUPLICATE, TOKEN_QUERY};

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_open_current_process_token() {
    let token = TokenSource::CurrentProcess.open(TOKEN_QUERY).unwrap();
    assert!(token.is_valid());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_current_thread_token_absent_without_impersonation() {
    // A thread that is not impersonating has no thread token.
    assert!(!thread_is_impersonating());
    let result = TokenSource::CurrentThread.open(TOKEN_QUERY);
    assert!(matches!(result, Err(LaunchError::TokenAcquisition { .. })));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_current_thread_token_present_during_impersonation() {
    let process_token = TokenSource::CurrentProcess
        .open(TOKEN_QUERY | TOKEN_DUPLICATE)
        .unwrap();
    let impersonation = duplicate(
        &process_token,
        MAXIMUM_ALLOWED,
        ImpersonationLevel::Impersonation,
        TokenKind::Impersonation,
    )
    .unwrap();

    let mut guard = ImpersonationGuard::new();
    guard.impersonate(&impersonation).unwrap();

    let thread_token = TokenSource::CurrentThread.open(TOKEN_QUERY).unwrap();
    assert!(thread_token.is_valid());

    // The thread token belongs to the same logon session as the process.
    let process_session = session_id(&process_token).unwrap();
    let thread_session = session_id(&thread_token).unwrap();
    assert_eq!(process_session, thread_session);

    guard.revert();
    assert!(!thread_is_impersonating());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_duplicate_primary_from_own_token() {
    let token = TokenSource::CurrentProcess.open(MAXIMUM_ALLOWED).unwrap();
    let primary = duplicate(
        &token,
        MAXIMUM_ALLOWED,
        ImpersonationLevel::Identification,
        TokenKind::Primary,
    )
    .unwrap();
    assert!(primary.is_valid());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_enable_always_held_privilege() {
    // Every interactive token holds SeChangeNotifyPrivilege.
    let token = TokenSource::CurrentProcess.open(MAXIMUM_ALLOWED).unwrap();
    let adjustable = duplicate(
        &token,
        MAXIMUM_ALLOWED,
        ImpersonationLevel::Impersonation,
        TokenKind::Impersonation,
    )
    .unwrap();
    enable_privilege(&adjustable, "SeChangeNotifyPrivilege").unwrap();
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_enable_unheld_privilege_fails() {
    let token = TokenSource::CurrentProcess.open(MAXIMUM_ALLOWED).unwrap();
    let adjustable = duplicate(
        &token,
        MAXIMUM_ALLOWED,
        ImpersonationLevel::Impersonation,
        TokenKind::Impersonation,
    )
    .unwrap();
    let result = enable_privilege(&adjustable, "SeNotARealPrivilege");
    assert!(matches!(
        result,
        Err(LaunchError::PrivilegeAdjustment { .. })
    ));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_open_token_of_missing_process_fails() {
    let result =
        TokenSource::NamedProcess("no_such_image_1234.exe".to_string()).open(MAXIMUM_ALLOWED);
    assert!(result.is_err());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_pivot_chain_replaces_identity_once() {
    // Two consecutive pivots on one guard leave exactly one identity to
    // restore.
    let request = PivotRequest {
        source: TokenSource::CurrentProcess,
        desired_access: MAXIMUM_ALLOWED,
        level: ImpersonationLevel::Impersonation,
        kind: TokenKind::Impersonation,
        privileges: PrivilegeRequest::None,
    };
    {
        let mut guard = ImpersonationGuard::new();
        let _first = pivot(&request, Some(&mut guard)).unwrap();
        let _second = pivot(&request, Some(&mut guard)).unwrap();
        assert!(thread_is_impersonating());
    }
    assert!(!thread_is_impersonating());
}
