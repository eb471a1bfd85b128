//! String conversion utilities for Windows API

use std::ffi::{OsStr, OsString};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

/// Convert a Rust string to a null-terminated Windows wide string (UTF-16)
pub fn string_to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Convert a path to a null-terminated Windows wide string (UTF-16)
pub fn path_to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Convert a Windows wide string (UTF-16) to a Rust string
///
/// Stops at the first null terminator if present.
pub fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    let os_string = OsString::from_wide(&wide[..len]);
    os_string.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_wide() {
        let wide = string_to_wide("cmd");
        assert_eq!(wide, vec![99, 109, 100, 0]);

        let empty = string_to_wide("");
        assert_eq!(empty, vec![0]);
    }

    #[test]
    fn test_wide_to_string() {
        let wide = vec![99, 109, 100, 0];
        assert_eq!(wide_to_string(&wide), "cmd");

        let no_null = vec![99, 109, 100];
        assert_eq!(wide_to_string(&no_null), "cmd");
    }

    #[test]
    fn test_wide_to_string_stops_at_null() {
        let wide = vec![97u16, 0, 98, 99];
        assert_eq!(wide_to_string(&wide), "a");
    }

    #[test]
    fn test_path_to_wide() {
        let wide = path_to_wide(Path::new("C:\\Windows"));
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide_to_string(&wide), "C:\\Windows");
    }

    #[test]
    fn test_unicode_round_trip() {
        let unicode_str = "Hello 世界 🌍";
        let wide = string_to_wide(unicode_str);
        assert_eq!(wide_to_string(&wide), unicode_str);
    }
}
