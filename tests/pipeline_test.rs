//! Integration tests for the escalation pipeline
//!
//! The full pipeline needs administrative rights and a running target
//! service; these tests exercise the invariants that hold regardless of the
//! rights the test runner has: argument validation, identity restoration,
//! resource balance, and status-code propagation.

use std::sync::Mutex;

use privlaunch::config::LaunchConfig;
use privlaunch::core::types::LaunchError;
use privlaunch::pipeline::{launch, Pipeline, Stage};
use privlaunch::token::thread_is_impersonating;
use privlaunch::windows::resource::{acquired_count, outstanding_resources, released_count};

// The resource ledger is process-wide; every test that acquires wrapped
// resources takes this lock so the before/after comparisons stay stable.
static LEDGER_LOCK: Mutex<()> = Mutex::new(());

fn ledger_guard() -> std::sync::MutexGuard<'static, ()> {
    LEDGER_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[test]
fn test_empty_command_line_is_invalid_argument() {
    let result = launch("", None);
    let err = result.unwrap_err();
    assert!(matches!(err, LaunchError::EmptyCommandLine));
    // E_INVALIDARG
    assert_eq!(err.code().0 as u32, 0x8007_0057);
}

#[test]
fn test_whitespace_command_line_is_invalid_argument() {
    let result = launch(" \t\r\n ", None);
    assert!(matches!(result, Err(LaunchError::EmptyCommandLine)));
}

#[test]
fn test_rejection_happens_before_any_acquisition() {
    let _g = ledger_guard();
    let before = acquired_count();
    let _ = launch("", None);
    assert_eq!(acquired_count(), before);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_failed_run_releases_everything() {
    // Without admin rights the pipeline aborts partway; every handle it
    // acquired up to that point must still be released.
    let _g = ledger_guard();
    let before = outstanding_resources();
    let result = launch("cmd.exe /c exit", None);
    assert_eq!(outstanding_resources(), before);
    if let Err(err) = result {
        assert_ne!(err.code().0, 0);
    }
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_thread_identity_restored_after_run() {
    let _g = ledger_guard();
    assert!(!thread_is_impersonating());
    let _ = launch("cmd.exe /c exit", None);
    assert!(!thread_is_impersonating());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_repeated_runs_do_not_accumulate() {
    let _g = ledger_guard();
    let pipeline = Pipeline::new(LaunchConfig::default());
    let before = outstanding_resources();
    for _ in 0..5 {
        let _ = pipeline.run("cmd.exe /c exit", None);
    }
    assert_eq!(outstanding_resources(), before);
    assert!(!thread_is_impersonating());
    // Releases never outrun acquisitions.
    assert!(released_count() <= acquired_count());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_unknown_service_fails_in_resolution() {
    let _g = ledger_guard();
    let mut config = LaunchConfig::default();
    config.target_service = "NoSuchService1234".to_string();
    let pipeline = Pipeline::new(config);
    let result = pipeline.run("cmd.exe /c exit", None);
    // Without admin rights the run dies earlier; either way it must fail
    // and must not leave the thread impersonating.
    assert!(result.is_err());
    assert!(!thread_is_impersonating());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_unknown_privilege_fails_in_self_elevation() {
    let _g = ledger_guard();
    let mut config = LaunchConfig::default();
    config.elevation_privilege = "SeNoSuchPrivilege".to_string();
    let pipeline = Pipeline::new(config);
    let result = pipeline.run("cmd.exe /c exit", None);
    let err = result.unwrap_err();
    assert!(matches!(err, LaunchError::PrivilegeAdjustment { .. }));
    assert!(!thread_is_impersonating());
}

#[test]
fn test_stages_are_strictly_ordered() {
    let stages = [
        Stage::Start,
        Stage::SelfElevated,
        Stage::SystemPivoted,
        Stage::TargetTokenBuilt,
        Stage::TargetTokenConfigured,
        Stage::EnvironmentBuilt,
        Stage::Launched,
        Stage::Done,
    ];
    for pair in stages.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(Stage::Done.to_string(), "done");
}
