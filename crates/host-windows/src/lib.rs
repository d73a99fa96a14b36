//! Windows backend: the Service Control Manager for the registry, status and
//! control dispatch, and the Windows Event Log for diagnostics.
#![cfg(windows)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod dispatch;
mod event_log;
mod handle;
mod registry;

pub use dispatch::{NOT_UNDER_MANAGER_CODE, ScmHost};
pub use event_log::WindowsEventLog;
pub use registry::{ScmEntry, ScmManager, ScmRegistry};
