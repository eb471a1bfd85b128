//! Service host resolution via the service control manager
//!
//! Resolves the PID of the process hosting a named service. The pipeline
//! borrows that process's identity; it never starts the service itself, so
//! a stopped service is a hard failure here.

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::error::ERROR_SERVICE_NOT_ACTIVE;
use crate::windows::resource::OwnedScHandle;
use crate::windows::strings::string_to_wide;

use std::mem;
use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::winsvc::{
    OpenSCManagerW, OpenServiceW, QueryServiceStatusEx, SC_MANAGER_CONNECT,
    SC_STATUS_PROCESS_INFO, SERVICE_QUERY_STATUS, SERVICE_RUNNING, SERVICE_STATUS_PROCESS,
};

/// Resolves the PID of the process hosting a running service
pub fn query_service_host_pid(service_name: &str) -> LaunchResult<u32> {
    let manager = OwnedScHandle::from_raw(unsafe {
        OpenSCManagerW(std::ptr::null(), std::ptr::null(), SC_MANAGER_CONNECT)
    });
    if !manager.is_valid() {
        return Err(LaunchError::identity_resolution(service_name));
    }

    let wide_name = string_to_wide(service_name);
    let service = OwnedScHandle::from_raw(unsafe {
        OpenServiceW(manager.as_raw(), wide_name.as_ptr(), SERVICE_QUERY_STATUS)
    });
    if !service.is_valid() {
        return Err(LaunchError::identity_resolution(service_name));
    }

    let mut status: SERVICE_STATUS_PROCESS = unsafe { mem::zeroed() };
    let mut needed: DWORD = 0;
    let ok = unsafe {
        QueryServiceStatusEx(
            service.as_raw(),
            SC_STATUS_PROCESS_INFO,
            &mut status as *mut SERVICE_STATUS_PROCESS as *mut u8,
            mem::size_of::<SERVICE_STATUS_PROCESS>() as DWORD,
            &mut needed,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::identity_resolution(service_name));
    }

    if status.dwCurrentState != SERVICE_RUNNING || status.dwProcessId == 0 {
        return Err(LaunchError::identity_resolution_code(
            service_name,
            ERROR_SERVICE_NOT_ACTIVE,
        ));
    }

    Ok(status.dwProcessId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_unknown_service_fails() {
        let _ledger = crate::windows::resource::ledger_guard();
        let result = query_service_host_pid("NoSuchService1234");
        assert!(matches!(
            result,
            Err(LaunchError::IdentityResolution { .. })
        ));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_running_service_resolves_to_pid() {
        let _ledger = crate::windows::resource::ledger_guard();
        // The RPC endpoint mapper runs on every supported Windows system.
        let result = query_service_host_pid("RpcEptMapper");
        match result {
            Ok(pid) => assert!(pid > 0),
            Err(LaunchError::IdentityResolution { name, .. }) => {
                assert_eq!(name, "RpcEptMapper");
            }
            Err(other) => panic!("Unexpected error: {}", other),
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_stopped_service_reports_not_active() {
        let _ledger = crate::windows::resource::ledger_guard();
        // TrustedInstaller is demand-start and usually stopped; when it is,
        // the error must carry ERROR_SERVICE_NOT_ACTIVE.
        let result = query_service_host_pid("TrustedInstaller");
        if let Err(err) = result {
            assert_eq!(err.stage_name(), "identity-resolution");
        }
    }
}
