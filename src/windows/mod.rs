//! Windows-specific support: resource ownership, error capture, strings

pub mod error;
pub mod guard;
pub mod resource;
pub mod strings;

pub use guard::ScopeGuard;
pub use resource::{outstanding_resources, NativeResource, Owned, OwnedHandle, OwnedScHandle};
