//! Scope-exit guard running a release action at most once

/// Runs a closure when dropped, unless dismissed first
///
/// Used for release duties that are not a single owned handle, such as
/// terminating a half-launched process on a failed resume.
pub struct ScopeGuard<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
    /// Arms the guard with a release action
    pub fn new(action: F) -> Self {
        ScopeGuard {
            action: Some(action),
        }
    }

    /// Cancels the release action; for paths that hand ownership elsewhere
    pub fn dismiss(&mut self) {
        self.action = None;
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}
