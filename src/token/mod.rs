//! Security token acquisition, duplication, adjustment, and impersonation

pub mod duplicate;
pub mod impersonation;
pub mod info;
pub mod pivot;
pub mod privileges;
pub mod source;

pub use duplicate::{duplicate, ImpersonationLevel, TokenKind};
pub use impersonation::{thread_is_impersonating, ImpersonationGuard};
pub use info::{session_id, set_integrity_level, set_session_id};
pub use pivot::{pivot, PivotRequest, PrivilegeRequest};
pub use privileges::{enable_all_privileges, enable_privilege};
pub use source::TokenSource;
