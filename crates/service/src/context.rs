use std::time::Duration;

use warden_host::ServiceIdentity;

use crate::{CancellationSignal, StatusChannel};

/// State shared between the coordinator and the control handler.
pub struct ServiceContext {
    identity: ServiceIdentity,
    signal: CancellationSignal,
    status: StatusChannel,
    stop_wait_hint: Duration,
}

impl ServiceContext {
    /// Create the context for one process run. The cancellation signal is
    /// created here and never reset.
    #[must_use]
    pub fn new(identity: ServiceIdentity, stop_wait_hint: Duration) -> Self {
        Self {
            identity,
            signal: CancellationSignal::new(),
            status: StatusChannel::new(),
            stop_wait_hint,
        }
    }

    /// Identity the service runs under.
    #[must_use]
    pub const fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// The stop signal.
    #[must_use]
    pub const fn signal(&self) -> &CancellationSignal {
        &self.signal
    }

    /// The status channel.
    #[must_use]
    pub const fn status(&self) -> &StatusChannel {
        &self.status
    }

    /// Wait hint published with `StopPending`.
    #[must_use]
    pub const fn stop_wait_hint(&self) -> Duration {
        self.stop_wait_hint
    }
}
