//! Resident side of the service: the lifecycle state machine that runs inside
//! the process the service manager launched.
//!
//! [`LifecycleCoordinator`] registers a [`ControlChannel`] with the host,
//! publishes state through the [`StatusChannel`] and drives a [`WorkerLoop`]
//! until the [`CancellationSignal`] is set by a stop request.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod cancel;
mod context;
mod control;
mod coordinator;
mod error;
mod events;
mod options;
mod status;
mod worker;

pub use cancel::{CancellationSignal, Cancelled};
pub use context::ServiceContext;
pub use control::ControlChannel;
pub use coordinator::{LifecycleCoordinator, Outcome};
pub use error::{Error, Result};
pub use events::EventReporter;
pub use options::{DEFAULT_POLL_INTERVAL, DEFAULT_START_WAIT_HINT, ServiceOptions};
pub use status::StatusChannel;
pub use worker::{BoxError, IdleWork, Work, WorkerLoop};
