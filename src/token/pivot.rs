//! The token pivot: open, duplicate, adjust, optionally impersonate
//!
//! One parameterized operation covering the repeated pattern every
//! escalation stage uses. Each call yields a freshly owned token; when
//! impersonation is requested the new token also becomes the calling
//! thread's identity, superseding whatever it impersonated before.

use crate::core::types::LaunchResult;
use crate::token::duplicate::{duplicate, ImpersonationLevel, TokenKind};
use crate::token::impersonation::ImpersonationGuard;
use crate::token::privileges::{enable_all_privileges, enable_privilege};
use crate::token::source::TokenSource;
use crate::windows::resource::OwnedHandle;

use tracing::debug;
use winapi::shared::minwindef::DWORD;

/// Which privileges to enable on the duplicated token
#[derive(Debug, Clone)]
pub enum PrivilegeRequest {
    /// Leave the privilege set untouched
    None,
    /// Enable one named privilege
    One(String),
    /// Enable everything the token holds
    All,
}

/// A fully described pivot step
#[derive(Debug, Clone)]
pub struct PivotRequest {
    pub source: TokenSource,
    pub desired_access: DWORD,
    pub level: ImpersonationLevel,
    pub kind: TokenKind,
    pub privileges: PrivilegeRequest,
}

/// Executes one pivot step, returning the duplicated token
///
/// The intermediate source token is closed before returning; only the
/// duplicate escapes. When `guard` is given, the duplicate is impersonated
/// on the calling thread before this function returns.
pub fn pivot(
    request: &PivotRequest,
    guard: Option<&mut ImpersonationGuard>,
) -> LaunchResult<OwnedHandle> {
    debug!(source = ?request.source, kind = ?request.kind, "token pivot");

    let source_token = request.source.open(request.desired_access)?;
    let pivoted = duplicate(
        &source_token,
        request.desired_access,
        request.level,
        request.kind,
    )?;
    drop(source_token);

    match &request.privileges {
        PrivilegeRequest::None => {}
        PrivilegeRequest::One(name) => enable_privilege(&pivoted, name)?,
        PrivilegeRequest::All => enable_all_privileges(&pivoted)?,
    }

    if let Some(guard) = guard {
        guard.impersonate(&pivoted)?;
    }

    Ok(pivoted)
}
