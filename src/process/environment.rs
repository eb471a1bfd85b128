//! Environment blocks scoped to a token and %VAR% expansion

use crate::core::types::{LaunchError, LaunchResult};
use crate::windows::resource::{NativeResource, Owned, OwnedHandle};
use crate::windows::strings::{string_to_wide, wide_to_string};

use winapi::shared::minwindef::{DWORD, FALSE, LPVOID, TRUE};
use winapi::um::userenv::{
    CreateEnvironmentBlock, DestroyEnvironmentBlock, ExpandEnvironmentStringsForUserW,
};

// Documented ceiling for an environment value / expansion result.
const EXPANSION_BUFFER_CHARS: usize = 32 * 1024;

/// Resource kind for a user environment block
pub struct EnvironmentBlockResource;

impl NativeResource for EnvironmentBlockResource {
    type Raw = LPVOID;

    fn invalid() -> LPVOID {
        std::ptr::null_mut()
    }

    fn is_valid(raw: LPVOID) -> bool {
        !raw.is_null()
    }

    unsafe fn close(raw: LPVOID) {
        DestroyEnvironmentBlock(raw);
    }
}

/// A user environment block built for one primary token
///
/// Destroyed on drop; the launch stage drops it as soon as process creation
/// has returned, whether creation succeeded or not.
pub struct EnvironmentBlock {
    block: Owned<EnvironmentBlockResource>,
}

impl EnvironmentBlock {
    /// Captures the environment of the token's user, inheriting the current
    /// process's variables on top
    pub fn for_token(token: &OwnedHandle) -> LaunchResult<Self> {
        let mut raw: LPVOID = std::ptr::null_mut();
        let ok = unsafe { CreateEnvironmentBlock(&mut raw, token.as_raw(), TRUE) } != FALSE;
        if !ok {
            return Err(LaunchError::environment("CreateEnvironmentBlock"));
        }
        Ok(EnvironmentBlock {
            block: Owned::from_raw(raw),
        })
    }

    /// Raw pointer for process creation; owned by this value
    pub fn as_ptr(&self) -> LPVOID {
        self.block.as_raw()
    }
}

/// Expands `%VAR%` references against a token's user environment
///
/// The expansion uses the target identity's variables, not the calling
/// process's, so a launched `%WINDIR%\...` resolves as the target would
/// see it.
pub fn expand_for_user(token: &OwnedHandle, value: &str) -> LaunchResult<String> {
    let source = string_to_wide(value);
    let mut buffer = vec![0u16; EXPANSION_BUFFER_CHARS];
    let ok = unsafe {
        ExpandEnvironmentStringsForUserW(
            token.as_raw(),
            source.as_ptr(),
            buffer.as_mut_ptr(),
            buffer.len() as DWORD,
        )
    } != FALSE;
    if !ok {
        return Err(LaunchError::environment("ExpandEnvironmentStringsForUserW"));
    }
    Ok(wide_to_string(&buffer))
}
