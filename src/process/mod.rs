//! Process resolution, environment construction, and launch

pub mod environment;
pub mod launcher;
pub mod service;
pub mod snapshot;

pub use environment::{expand_for_user, EnvironmentBlock};
pub use launcher::{launch_as_user, LaunchSettings};
pub use service::query_service_host_pid;
pub use snapshot::find_process_id;
