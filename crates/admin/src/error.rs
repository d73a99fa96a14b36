use thiserror::Error;
use warden_host::ServiceState;

/// Result type for administrative operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the operator by administrative commands.
#[derive(Debug, Error)]
pub enum Error {
    /// The control request could not be delivered.
    #[error("failed to signal service `{name}`")]
    ControlFailed {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// The registry entry could not be created.
    #[error("failed to create service `{name}`")]
    CreateFailed {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// The registry entry could not be removed.
    #[error("failed to delete service `{name}`")]
    DeleteFailed {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// No registry entry has this name.
    #[error("service `{name}` not found")]
    NotFound {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// The status of the service could not be read.
    #[error("failed to query service `{name}`")]
    QueryFailed {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// The registry could not be opened.
    #[error("service registry unavailable")]
    RegistryUnavailable(#[source] warden_host::Error),

    /// The service manager refused to start the service.
    #[error("failed to start service `{name}`")]
    StartFailed {
        /// Service name.
        name: String,

        /// Underlying host error.
        #[source]
        source: warden_host::Error,
    },

    /// The service refused the stop request or did not reach `Stopped`
    /// within the poll budget.
    #[error("service `{name}` could not be stopped (last state: {state})")]
    StopFailed {
        /// Service name.
        name: String,

        /// Last state observed.
        state: ServiceState,
    },
}

impl Error {
    /// Whether creation failed because the entry already exists.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed {
                source: warden_host::Error::AlreadyExists(_),
                ..
            }
        )
    }
}
