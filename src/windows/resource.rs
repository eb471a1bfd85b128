//! Move-only ownership wrappers for native Windows resources
//!
//! Every kernel object the pipeline acquires is held in an [`Owned`] value,
//! parameterized by a close operation and an invalid sentinel. The wrapper
//! closes exactly once on drop and never closes a sentinel, which removes the
//! double-close and use-after-close hazards of ad-hoc handle bookkeeping.
//!
//! Acquire/release counters track every valid resource wrapped and released,
//! so tests can assert that no invocation leaks on any exit path.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::winnt::HANDLE;
use winapi::um::winsvc::{CloseServiceHandle, SC_HANDLE};

static ACQUIRED: AtomicUsize = AtomicUsize::new(0);
static RELEASED: AtomicUsize = AtomicUsize::new(0);

/// Number of wrapped resources acquired so far, process-wide
pub fn acquired_count() -> usize {
    ACQUIRED.load(Ordering::SeqCst)
}

/// Number of wrapped resources released so far, process-wide
pub fn released_count() -> usize {
    RELEASED.load(Ordering::SeqCst)
}

/// Number of wrapped resources currently outstanding
pub fn outstanding_resources() -> usize {
    acquired_count().saturating_sub(released_count())
}

/// A native resource kind: raw representation, invalid sentinel, close call
pub trait NativeResource {
    /// Raw OS representation of the resource
    type Raw: Copy;

    /// The sentinel value denoting "nothing acquired"
    fn invalid() -> Self::Raw;

    /// Whether a raw value denotes an acquired resource
    fn is_valid(raw: Self::Raw) -> bool;

    /// Releases the resource
    ///
    /// # Safety
    /// `raw` must be a valid, still-open resource of this kind that is not
    /// closed again afterwards.
    unsafe fn close(raw: Self::Raw);
}

/// Kernel object closed with `CloseHandle` (tokens, processes, threads)
pub struct KernelObject;

impl NativeResource for KernelObject {
    type Raw = HANDLE;

    fn invalid() -> HANDLE {
        std::ptr::null_mut()
    }

    fn is_valid(raw: HANDLE) -> bool {
        !raw.is_null() && raw != INVALID_HANDLE_VALUE
    }

    unsafe fn close(raw: HANDLE) {
        CloseHandle(raw);
    }
}

/// Service control manager object closed with `CloseServiceHandle`
pub struct ServiceObject;

impl NativeResource for ServiceObject {
    type Raw = SC_HANDLE;

    fn invalid() -> SC_HANDLE {
        std::ptr::null_mut()
    }

    fn is_valid(raw: SC_HANDLE) -> bool {
        !raw.is_null()
    }

    unsafe fn close(raw: SC_HANDLE) {
        CloseServiceHandle(raw);
    }
}

/// Exclusive owner of one native resource, released exactly once
///
/// Move-only: there is deliberately no way to copy or clone the ownership.
pub struct Owned<R: NativeResource> {
    raw: R::Raw,
    _marker: PhantomData<R>,
}

impl<R: NativeResource> Owned<R> {
    /// Wraps a raw resource, taking ownership of it
    pub fn from_raw(raw: R::Raw) -> Self {
        if R::is_valid(raw) {
            ACQUIRED.fetch_add(1, Ordering::SeqCst);
        }
        Owned {
            raw,
            _marker: PhantomData,
        }
    }

    /// An owner holding nothing; dropping it is a no-op
    pub fn unacquired() -> Self {
        Owned {
            raw: R::invalid(),
            _marker: PhantomData,
        }
    }

    /// Whether a resource is actually held
    pub fn is_valid(&self) -> bool {
        R::is_valid(self.raw)
    }

    /// The raw resource, still owned by this wrapper
    pub fn as_raw(&self) -> R::Raw {
        self.raw
    }

    /// Releases ownership without closing, handing the raw resource back
    ///
    /// The transfer counts as a release so the acquire/release ledger stays
    /// balanced for the party that takes over.
    pub fn into_raw(mut self) -> R::Raw {
        let raw = self.raw;
        if R::is_valid(raw) {
            RELEASED.fetch_add(1, Ordering::SeqCst);
        }
        self.raw = R::invalid();
        raw
    }
}

impl<R: NativeResource> Drop for Owned<R> {
    fn drop(&mut self) {
        if R::is_valid(self.raw) {
            unsafe {
                R::close(self.raw);
            }
            RELEASED.fetch_add(1, Ordering::SeqCst);
            self.raw = R::invalid();
        }
    }
}

// Send + Sync are safe because these handles are process-local and the
// wrapper never aliases ownership.
unsafe impl<R: NativeResource> Send for Owned<R> {}
unsafe impl<R: NativeResource> Sync for Owned<R> {}

/// Owned kernel handle (token, process, thread)
pub type OwnedHandle = Owned<KernelObject>;

/// Owned service control manager handle
pub type OwnedScHandle = Owned<ServiceObject>;

// The ledger is process-wide, so any test that wraps a counted resource can
// perturb a concurrent before/after comparison. Every acquiring test takes
// this lock.
#[cfg(test)]
static LEDGER_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn ledger_guard() -> std::sync::MutexGuard<'static, ()> {
    LEDGER_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
