//! Process lookup by image name using the ToolHelp32 API
//!
//! The pipeline's system pivot needs the OS-core process, which has a
//! well-known image name but a PID that varies per boot.

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::resource::OwnedHandle;
use crate::windows::strings::wide_to_string;

use std::mem;
use winapi::shared::minwindef::FALSE;
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};

/// Finds the PID of the first process whose image name matches
/// (case-insensitive), or `None` when no such process is running
pub fn find_process_id(image_name: &str) -> LaunchResult<Option<u32>> {
    let snapshot =
        OwnedHandle::from_raw(unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) });
    if !snapshot.is_valid() {
        return Err(LaunchError::token_acquisition("CreateToolhelp32Snapshot"));
    }

    let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

    let mut more = unsafe { Process32FirstW(snapshot.as_raw(), &mut entry) } != FALSE;
    while more {
        let name = wide_to_string(&entry.szExeFile);
        if name.eq_ignore_ascii_case(image_name) {
            return Ok(Some(entry.th32ProcessID));
        }
        more = unsafe { Process32NextW(snapshot.as_raw(), &mut entry) } != FALSE;
    }

    Ok(None)
}
