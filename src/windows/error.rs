//! Windows error code handling utilities

use windows::core::HRESULT;

/// Win32 error code for a privilege set that was only partially applied
pub const ERROR_NOT_ALL_ASSIGNED: u32 = 1300;

/// Win32 error code for a service that exists but is not running
pub const ERROR_SERVICE_NOT_ACTIVE: u32 = 1062;

/// Win32 error code for a process image that was not found
pub const ERROR_NOT_FOUND: u32 = 1168;

/// Win32 error code for an invalid handle
pub const ERROR_INVALID_HANDLE: u32 = 6;

/// Maps a Win32 error code into the HRESULT facility
pub fn hresult_from_win32(code: u32) -> HRESULT {
    if code == 0 {
        HRESULT(0)
    } else {
        HRESULT(((code & 0x0000_FFFF) | 0x8007_0000) as i32)
    }
}

/// Captures the calling thread's last OS error
pub fn last_os_error() -> windows::core::Error {
    windows::core::Error::from_win32()
}

/// The raw Win32 code of the calling thread's last OS error
pub fn last_error_code() -> u32 {
    unsafe { winapi::um::errhandlingapi::GetLastError() }
}
