use std::time::Duration;

use warden_host::ServiceIdentity;

/// Interval between cancellation checks of the idle worker.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wait hint published with `StartPending`.
pub const DEFAULT_START_WAIT_HINT: Duration = Duration::from_secs(3);

/// Options for the resident service.
#[derive(Clone, Debug)]
pub struct ServiceOptions {
    /// Name under which the control handler is registered.
    pub identity: ServiceIdentity,

    /// Longest a single unit of work may take between cancellation checks.
    pub poll_interval: Duration,

    /// Wait hint published with `StartPending`.
    pub start_wait_hint: Duration,

    /// Wait hint published with `StopPending`. Must cover one worker iteration.
    pub stop_wait_hint: Duration,
}

impl ServiceOptions {
    /// Options with the default timings.
    #[must_use]
    pub fn new(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            poll_interval: DEFAULT_POLL_INTERVAL,
            start_wait_hint: DEFAULT_START_WAIT_HINT,
            stop_wait_hint: DEFAULT_POLL_INTERVAL * 2,
        }
    }

    /// Set the poll interval, stretching the stop wait hint to cover it.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.stop_wait_hint = self.stop_wait_hint.max(poll_interval * 2);
        self
    }
}
