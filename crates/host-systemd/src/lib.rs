//! systemd backend: unit files and `systemctl` for the registry, the
//! `sd_notify` protocol for status, signals for control requests and
//! priority-prefixed stderr for the journal.
#![cfg(target_os = "linux")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod dispatch;
mod journal;
mod notify;
mod registry;
mod systemctl;
mod unit;

pub use dispatch::{NOT_UNDER_MANAGER_CODE, SystemdHost};
pub use journal::JournalEventLog;
pub use notify::NotifySocket;
pub use registry::{DEFAULT_UNIT_DIR, SystemdEntry, SystemdManager, SystemdRegistry};
