use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by a host backend.
#[derive(Debug, Error)]
pub enum Error {
    /// The service is already running.
    #[error("service `{0}` is already running")]
    AlreadyRunning(String),

    /// A registry entry with this name already exists.
    #[error("service `{0}` already exists")]
    AlreadyExists(String),

    /// The service refused the control in its current state.
    #[error("service `{0}` rejected the control request")]
    ControlRejected(String),

    /// The service identity is not acceptable to the host.
    #[error("invalid service identity: {0}")]
    InvalidIdentity(String),

    /// The start type is not one of `auto`, `demand` or `disabled`.
    #[error("unknown start type `{0}`")]
    InvalidStartType(String),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),

    /// A host tool exited unsuccessfully.
    #[error("{0} unexpectedly exited with non-zero code: {1}")]
    NonZeroExit(&'static str, ExitStatus),

    /// The service is not running, so it cannot accept the control.
    #[error("service `{0}` is not active")]
    NotActive(String),

    /// No registry entry with this name exists.
    #[error("service `{0}` does not exist")]
    NotFound(String),

    /// The process was not launched by the service manager.
    #[error("process was not started by the service manager (code {0})")]
    NotUnderManager(i32),

    /// The control handler could not be registered.
    #[error("failed to register control handler for `{0}`")]
    RegistrationFailed(String),

    /// The service registry could not be opened.
    #[error("service registry unavailable: {0}")]
    Unavailable(String),

    /// The host reported a state this crate does not model.
    #[error("unrecognized service state: {0}")]
    UnknownState(String),
}
