use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use warden_host::{ServiceState, StatusHandle, StatusReport};

use crate::{Error, Result};

/// Publishes the service's lifecycle state to the service manager.
///
/// Every publish happens under one lock that is held across the host call,
/// so reports from the coordinator and the control handler never interleave.
pub struct StatusChannel {
    current: Mutex<Option<StatusReport>>,
    handle: OnceLock<Box<dyn StatusHandle>>,
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusChannel {
    /// Create a channel with no handle attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            handle: OnceLock::new(),
        }
    }

    /// Attach the handle obtained from control handler registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyAttached`] if a handle is already attached.
    pub fn attach(&self, handle: Box<dyn StatusHandle>) -> Result<()> {
        self.handle.set(handle).map_err(|_| Error::AlreadyAttached)
    }

    /// Publish `state`.
    ///
    /// The checkpoint starts at 1 when a transitional state is entered, grows by
    /// one on each further publish of that state and is 0 for settled states.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalTransition`] if `state` precedes the current
    /// state, [`Error::NotAttached`] if no handle is attached, or the host
    /// error if the manager rejects the report.
    pub fn publish(
        &self,
        state: ServiceState,
        exit_code: u32,
        wait_hint: Duration,
    ) -> Result<StatusReport> {
        let mut current = self.current.lock();
        let handle = self.handle.get().ok_or(Error::NotAttached)?;

        let checkpoint = match *current {
            Some(previous) if previous.state > state || previous.state == ServiceState::Stopped => {
                return Err(Error::IllegalTransition {
                    from: previous.state,
                    to: state,
                });
            }
            _ if !state.is_transitional() => 0,
            Some(previous) if previous.state == state => previous.checkpoint + 1,
            _ => 1,
        };

        let report = StatusReport {
            state,
            controls_accepted: state.controls_accepted(),
            exit_code,
            wait_hint,
            checkpoint,
        };

        handle.set_status(&report)?;
        debug!(%state, checkpoint, "published service status");
        *current = Some(report);

        Ok(report)
    }

    /// Send the current report again, unchanged.
    ///
    /// Returns `None` if nothing has been published yet.
    ///
    /// # Errors
    ///
    /// Returns the host error if the manager rejects the report.
    pub fn republish(&self) -> Result<Option<StatusReport>> {
        let current = self.current.lock();

        let (Some(report), Some(handle)) = (*current, self.handle.get()) else {
            return Ok(None);
        };

        handle.set_status(&report)?;

        Ok(Some(report))
    }

    /// Most recently published report.
    #[must_use]
    pub fn current(&self) -> Option<StatusReport> {
        *self.current.lock()
    }

    /// Most recently published state.
    #[must_use]
    pub fn state(&self) -> Option<ServiceState> {
        self.current().map(|report| report.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<StatusReport>>>);

    impl StatusHandle for Recorder {
        fn set_status(&self, report: &StatusReport) -> warden_host::Result<()> {
            self.0.lock().push(*report);
            Ok(())
        }
    }

    fn attached() -> (StatusChannel, Recorder) {
        let recorder = Recorder::default();
        let channel = StatusChannel::new();
        channel.attach(Box::new(recorder.clone())).unwrap();
        (channel, recorder)
    }

    #[test]
    fn test_checkpoints_grow_within_transitional_state() {
        let (channel, _) = attached();

        let first = channel
            .publish(ServiceState::StartPending, 0, Duration::from_secs(3))
            .unwrap();
        let second = channel
            .publish(ServiceState::StartPending, 0, Duration::from_secs(3))
            .unwrap();
        let running = channel
            .publish(ServiceState::Running, 0, Duration::ZERO)
            .unwrap();
        let stopping = channel
            .publish(ServiceState::StopPending, 0, Duration::from_secs(2))
            .unwrap();

        assert_eq!(first.checkpoint, 1);
        assert_eq!(second.checkpoint, 2);
        assert_eq!(running.checkpoint, 0);
        assert_eq!(stopping.checkpoint, 1);
        assert!(!first.controls_accepted.accepts_stop());
        assert!(running.controls_accepted.accepts_stop());
    }

    #[test]
    fn test_rejects_backwards_transitions() {
        let (channel, recorder) = attached();

        channel
            .publish(ServiceState::StopPending, 0, Duration::ZERO)
            .unwrap();

        assert_matches!(
            channel.publish(ServiceState::Running, 0, Duration::ZERO),
            Err(Error::IllegalTransition {
                from: ServiceState::StopPending,
                to: ServiceState::Running
            })
        );

        channel
            .publish(ServiceState::Stopped, 0, Duration::ZERO)
            .unwrap();

        assert_matches!(
            channel.publish(ServiceState::Stopped, 0, Duration::ZERO),
            Err(Error::IllegalTransition { .. })
        );
        assert_eq!(recorder.0.lock().len(), 2);
    }

    #[test]
    fn test_republish_repeats_current_report() {
        let (channel, recorder) = attached();

        assert_eq!(channel.republish().unwrap(), None);

        let report = channel
            .publish(ServiceState::StopPending, 0, Duration::from_secs(2))
            .unwrap();

        assert_eq!(channel.republish().unwrap(), Some(report));
        assert_eq!(*recorder.0.lock(), vec![report, report]);
    }

    #[test]
    fn test_publish_requires_handle() {
        let channel = StatusChannel::new();

        assert_matches!(
            channel.publish(ServiceState::StartPending, 0, Duration::ZERO),
            Err(Error::NotAttached)
        );
        assert_matches!(
            channel.attach(Box::new(Recorder::default())),
            Ok(())
        );
        assert_matches!(
            channel.attach(Box::new(Recorder::default())),
            Err(Error::AlreadyAttached)
        );
    }
}
