//! Token sources: where a security token can be opened from

use crate::core::types::{LaunchError, LaunchResult};
use crate::process::{service, snapshot};
use crate::windows::error::{hresult_from_win32, ERROR_NOT_FOUND};
use crate::windows::resource::OwnedHandle;

use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::processthreadsapi::{
    GetCurrentProcess, GetCurrentThread, OpenProcess, OpenProcessToken, OpenThreadToken,
};
use winapi::um::winnt::{HANDLE, PROCESS_QUERY_INFORMATION};

/// Where to open a token from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// The calling process's own token
    CurrentProcess,
    /// The calling thread's token; reflects an active impersonation
    CurrentThread,
    /// The primary token of an arbitrary process
    Process(u32),
    /// The primary token of a process located by its image name
    NamedProcess(String),
    /// The primary token of a named service's host process, resolved via
    /// the service control manager
    ServiceHost(String),
}

impl TokenSource {
    /// Opens a token from this source with the given access rights
    ///
    /// The returned handle is exclusively owned by the caller. Service
    /// resolution fails when the service is not running; it is never
    /// started here.
    pub fn open(&self, desired_access: DWORD) -> LaunchResult<OwnedHandle> {
        match self {
            TokenSource::CurrentProcess => open_current_process_token(desired_access),
            TokenSource::CurrentThread => open_current_thread_token(desired_access),
            TokenSource::Process(pid) => open_process_token(*pid, desired_access),
            TokenSource::NamedProcess(image) => {
                let pid = snapshot::find_process_id(image)?.ok_or_else(|| {
                    LaunchError::TokenAcquisition {
                        operation: format!("locate process {}", image),
                        error: windows::core::Error::from(hresult_from_win32(ERROR_NOT_FOUND)),
                    }
                })?;
                open_process_token(pid, desired_access)
            }
            TokenSource::ServiceHost(name) => {
                let pid = service::query_service_host_pid(name)?;
                open_process_token(pid, desired_access)
            }
        }
    }
}

fn open_current_process_token(desired_access: DWORD) -> LaunchResult<OwnedHandle> {
    let mut raw: HANDLE = std::ptr::null_mut();
    let ok = unsafe { OpenProcessToken(GetCurrentProcess(), desired_access, &mut raw) } != FALSE;
    if !ok {
        return Err(LaunchError::token_acquisition("OpenProcessToken(self)"));
    }
    Ok(OwnedHandle::from_raw(raw))
}

fn open_current_thread_token(desired_access: DWORD) -> LaunchResult<OwnedHandle> {
    let mut raw: HANDLE = std::ptr::null_mut();
    // OpenAsSelf = FALSE: the open is checked against the impersonated
    // identity, which is exactly what the pipeline wants after a pivot.
    let ok = unsafe { OpenThreadToken(GetCurrentThread(), desired_access, FALSE, &mut raw) }
        != FALSE;
    if !ok {
        return Err(LaunchError::token_acquisition("OpenThreadToken(self)"));
    }
    Ok(OwnedHandle::from_raw(raw))
}

fn open_process_token(pid: u32, desired_access: DWORD) -> LaunchResult<OwnedHandle> {
    let process = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION, FALSE, pid) };
    let process = OwnedHandle::from_raw(process);
    if !process.is_valid() {
        return Err(LaunchError::token_acquisition(format!(
            "OpenProcess(pid {})",
            pid
        )));
    }

    let mut raw: HANDLE = std::ptr::null_mut();
    let ok = unsafe { OpenProcessToken(process.as_raw(), desired_access, &mut raw) } != FALSE;
    if !ok {
        return Err(LaunchError::token_acquisition(format!(
            "OpenProcessToken(pid {})",
            pid
        )));
    }
    Ok(OwnedHandle::from_raw(raw))
}
