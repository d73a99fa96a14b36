use thiserror::Error;
use warden_host::ServiceState;

/// Result type for resident service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running the service lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    /// A status handle was attached twice.
    #[error("status channel already attached")]
    AlreadyAttached,

    /// A host call failed.
    #[error(transparent)]
    Host(#[from] warden_host::Error),

    /// The requested state would move the lifecycle backwards.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        /// State currently published.
        from: ServiceState,

        /// State that was requested.
        to: ServiceState,
    },

    /// Status was published before a handle was attached.
    #[error("status channel not attached")]
    NotAttached,
}
