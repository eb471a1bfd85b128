//! Suspended process creation under a prepared primary token

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::error::last_os_error;
use crate::process::environment::EnvironmentBlock;
use crate::windows::resource::OwnedHandle;
use crate::windows::strings::{path_to_wide, string_to_wide};

use std::mem;
use std::path::Path;
use tracing::{debug, warn};
use winapi::shared::minwindef::{DWORD, FALSE, WORD};
use winapi::um::processthreadsapi::{
    CreateProcessAsUserW, ResumeThread, SetPriorityClass, TerminateProcess,
    PROCESS_INFORMATION, STARTUPINFOW,
};
use winapi::um::winbase::{
    CREATE_NEW_CONSOLE, CREATE_SUSPENDED, CREATE_UNICODE_ENVIRONMENT, STARTF_USESHOWWINDOW,
};

const DESKTOP: &str = "WinSta0\\Default";

/// Launch parameters beyond the token and command line
#[derive(Debug, Clone, Copy)]
pub struct LaunchSettings {
    /// Initial window visibility (SW_* value)
    pub show_window: WORD,
    /// Scheduling priority class for the child
    pub priority_class: DWORD,
}

/// Creates a process under `token`, suspended, then adjusts priority,
/// resumes it and detaches
///
/// Fire and forget: both child handles are closed before returning. A failed
/// priority adjustment is logged and tolerated; a failed resume terminates
/// the child so no half-launched process is left behind.
pub fn launch_as_user(
    token: &OwnedHandle,
    command_line: &str,
    current_directory: Option<&Path>,
    environment: &EnvironmentBlock,
    settings: LaunchSettings,
) -> LaunchResult<()> {
    // CreateProcessAsUserW may rewrite the command-line buffer in place.
    let mut wide_command = string_to_wide(command_line);
    let mut wide_desktop = string_to_wide(DESKTOP);
    let wide_directory = current_directory.map(path_to_wide);

    let mut startup_info: STARTUPINFOW = unsafe { mem::zeroed() };
    startup_info.cb = mem::size_of::<STARTUPINFOW>() as DWORD;
    startup_info.lpDesktop = wide_desktop.as_mut_ptr();
    startup_info.dwFlags |= STARTF_USESHOWWINDOW;
    startup_info.wShowWindow = settings.show_window;

    let mut process_info: PROCESS_INFORMATION = unsafe { mem::zeroed() };

    let creation_flags = CREATE_SUSPENDED | CREATE_UNICODE_ENVIRONMENT | CREATE_NEW_CONSOLE;

    let created = unsafe {
        CreateProcessAsUserW(
            token.as_raw(),
            std::ptr::null(),
            wide_command.as_mut_ptr(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            FALSE,
            creation_flags,
            environment.as_ptr(),
            wide_directory
                .as_ref()
                .map_or(std::ptr::null(), |d| d.as_ptr()),
            &mut startup_info,
            &mut process_info,
        )
    } != FALSE;
    if !created {
        return Err(LaunchError::ProcessCreation(last_os_error()));
    }

    let process = OwnedHandle::from_raw(process_info.hProcess);
    let thread = OwnedHandle::from_raw(process_info.hThread);
    debug!(pid = process_info.dwProcessId, "process created suspended");

    let prioritized =
        unsafe { SetPriorityClass(process.as_raw(), settings.priority_class) } != FALSE;
    if !prioritized {
        warn!(
            pid = process_info.dwProcessId,
            "failed to set priority class, continuing"
        );
    }

    let resumed = unsafe { ResumeThread(thread.as_raw()) } != DWORD::MAX;
    if !resumed {
        let error = last_os_error();
        // A suspended child that can never run must not be left behind.
        unsafe {
            TerminateProcess(process.as_raw(), 1);
        }
        return Err(LaunchError::ProcessResume(error));
    }

    debug!(pid = process_info.dwProcessId, "process resumed, detaching");
    Ok(())
}
