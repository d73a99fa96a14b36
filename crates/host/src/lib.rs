//! Abstract interface to the host's service manager, service registry and event log.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod control;
mod dispatch;
mod error;
mod event;
mod identity;
mod registry;
mod status;

pub use control::{ControlHandler, ControlRequest, HandlerOutcome};
pub use dispatch::{ControlRegistrar, ServiceDispatcher, ServiceMain, StatusHandle};
pub use error::{Error, Result};
pub use event::{EventLog, EventRecord, Severity};
pub use identity::{MAX_SERVICE_NAME_LEN, ServiceIdentity};
pub use registry::{RegistryEntry, RegistryManager, ServiceRegistry, StartType};
pub use status::{ControlsAccepted, ServiceState, StatusReport, StatusSnapshot};
