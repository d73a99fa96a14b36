use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Admin(#[from] warden_admin::Error),

    #[error("failed to register event source `{0}`: {1}")]
    EventSource(String, #[source] io::Error),

    #[error(transparent)]
    Host(#[from] warden_host::Error),

    #[error("service initialization failed")]
    InitFailed,

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),

    #[error("service control handler registration failed")]
    RegistrationFailed,

    #[error(transparent)]
    Service(#[from] warden_service::Error),
}

impl Error {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Host(warden_host::Error::NotUnderManager(code)) => *code,
            _ => -1,
        }
    }
}
