//! The four-stage escalation and launch pipeline
//!
//! Self-elevation, system pivot, target token construction, then process
//! creation. Each stage either completes fully or aborts the whole run with
//! the first OS status encountered; the calling thread's identity is restored
//! and every acquired handle closed on every exit path.

use crate::config::LaunchConfig;
use crate::core::types::{LaunchError, LaunchResult};
use crate::process::environment::{expand_for_user, EnvironmentBlock};
use crate::process::launcher::{launch_as_user, LaunchSettings};
use crate::token::duplicate::{ImpersonationLevel, TokenKind};
use crate::token::impersonation::ImpersonationGuard;
use crate::token::info::{session_id, set_integrity_level, set_session_id};
use crate::token::pivot::{pivot, PivotRequest, PrivilegeRequest};
use crate::token::privileges::enable_all_privileges;
use crate::token::source::TokenSource;

use std::fmt;
use std::path::Path;
use tracing::{debug, info};
use winapi::um::winnt::MAXIMUM_ALLOWED;

/// Progress marker for one pipeline run
///
/// Stages advance strictly forward; a run that fails stays at the last
/// reached stage, which the log then records alongside the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    SelfElevated,
    SystemPivoted,
    TargetTokenBuilt,
    TargetTokenConfigured,
    EnvironmentBuilt,
    Launched,
    Done,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::SelfElevated => "self-elevated",
            Stage::SystemPivoted => "system-pivoted",
            Stage::TargetTokenBuilt => "target-token-built",
            Stage::TargetTokenConfigured => "target-token-configured",
            Stage::EnvironmentBuilt => "environment-built",
            Stage::Launched => "launched",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The escalation and launch pipeline
///
/// Stateless between runs; a single instance may be invoked any number of
/// times, each run acquiring and releasing its own resources.
pub struct Pipeline {
    config: LaunchConfig,
}

impl Pipeline {
    /// Creates a pipeline with the given launch configuration
    pub fn new(config: LaunchConfig) -> Self {
        Pipeline { config }
    }

    /// Runs the full pipeline: escalate, build the target token, launch
    ///
    /// Fire and forget. On success the child process is running detached and
    /// no handle to it remains. On failure no process is left behind and the
    /// returned error carries the status of the first failing OS call.
    pub fn run(&self, command_line: &str, current_directory: Option<&Path>) -> LaunchResult<()> {
        let command_line = command_line.trim();
        if command_line.is_empty() {
            return Err(LaunchError::EmptyCommandLine);
        }

        let mut stage = Stage::Start;
        info!(%stage, command_line, "pipeline starting");

        // One guard spans the whole run; drop restores the thread no matter
        // which stage aborts.
        let mut guard = ImpersonationGuard::new();

        // Stage 1: duplicate our own token, enable the debug privilege on the
        // copy and adopt it, leaving the process token untouched.
        let _self_token = pivot(
            &PivotRequest {
                source: TokenSource::CurrentProcess,
                desired_access: MAXIMUM_ALLOWED,
                level: ImpersonationLevel::Impersonation,
                kind: TokenKind::Impersonation,
                privileges: PrivilegeRequest::One(self.config.elevation_privilege.clone()),
            },
            Some(&mut guard),
        )?;
        stage = Stage::SelfElevated;
        debug!(%stage, "stage complete");

        // The session id is read through the thread token while the elevated
        // identity is active; it later rebinds the target token.
        let session = {
            let thread_token = TokenSource::CurrentThread.open(MAXIMUM_ALLOWED)?;
            session_id(&thread_token)?
        };
        debug!(session, "caller session captured");

        // Stage 2: pivot to the OS security subsystem's identity with every
        // privilege it holds enabled. This is what makes the service token
        // reachable in stage 3.
        let _system_token = pivot(
            &PivotRequest {
                source: TokenSource::NamedProcess(self.config.system_host_image.clone()),
                desired_access: MAXIMUM_ALLOWED,
                level: ImpersonationLevel::Impersonation,
                kind: TokenKind::Impersonation,
                privileges: PrivilegeRequest::All,
            },
            Some(&mut guard),
        )?;
        stage = Stage::SystemPivoted;
        debug!(%stage, "stage complete");

        // Stage 3: a primary copy of the target service host's token.
        let target = pivot(
            &PivotRequest {
                source: TokenSource::ServiceHost(self.config.target_service.clone()),
                desired_access: MAXIMUM_ALLOWED,
                level: ImpersonationLevel::Identification,
                kind: TokenKind::Primary,
                privileges: PrivilegeRequest::None,
            },
            None,
        )?;
        stage = Stage::TargetTokenBuilt;
        debug!(%stage, "stage complete");

        set_session_id(&target, session)?;
        enable_all_privileges(&target).map_err(|err| match err {
            // On the finished target token a refused grant is a
            // configuration failure, not an adjustment one.
            LaunchError::PrivilegeAdjustment { error, .. } => {
                LaunchError::TokenConfiguration {
                    what: "privileges",
                    error,
                }
            }
            other => other,
        })?;
        set_integrity_level(&target, self.config.integrity.rid())?;
        stage = Stage::TargetTokenConfigured;
        debug!(%stage, "stage complete");

        // Stage 4: environment and expansion come from the target identity,
        // then the child is created suspended and released.
        let environment = EnvironmentBlock::for_token(&target)?;
        let expanded = expand_for_user(&target, command_line)?;
        stage = Stage::EnvironmentBuilt;
        debug!(%stage, command_line = %expanded, "stage complete");

        launch_as_user(
            &target,
            &expanded,
            current_directory,
            &environment,
            LaunchSettings {
                show_window: self.config.show_window.to_raw(),
                priority_class: self.config.priority.to_raw(),
            },
        )?;
        stage = Stage::Launched;
        debug!(%stage, "stage complete");

        guard.revert();
        stage = Stage::Done;
        info!(%stage, "pipeline finished");
        Ok(())
    }
}

/// Runs the pipeline once with the default configuration
pub fn launch(command_line: &str, current_directory: Option<&Path>) -> LaunchResult<()> {
    Pipeline::new(LaunchConfig::default()).run(command_line, current_directory)
}
