use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use warden_host::{ControlRegistrar, ServiceState};

use crate::{
    ControlChannel, Error, EventReporter, Result, ServiceContext, ServiceOptions, StatusChannel,
    Work, WorkerLoop,
};

/// How a lifecycle run ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The control handler could not be registered; nothing was published.
    RegistrationFailed,

    /// Initialization failed; `Stopped` was published straight from
    /// `StartPending`.
    InitFailed,

    /// The service ran and stopped on request.
    Stopped {
        /// Units of work performed.
        iterations: u64,
    },
}

/// Drives the service through `StartPending`, `Running`, `StopPending` and
/// `Stopped`.
pub struct LifecycleCoordinator<W> {
    events: EventReporter,
    options: ServiceOptions,
    work: W,
}

impl<W: Work> LifecycleCoordinator<W> {
    /// Create a coordinator for `work`.
    pub const fn new(options: ServiceOptions, events: EventReporter, work: W) -> Self {
        Self {
            events,
            options,
            work,
        }
    }

    /// Run the full lifecycle against `registrar`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the service manager rejects a status report;
    /// registration and initialization failures are reported through the
    /// event log and the returned [`Outcome`].
    pub async fn run<R>(self, registrar: &R) -> Result<Outcome>
    where
        R: ControlRegistrar + ?Sized,
    {
        let Self {
            events,
            options,
            mut work,
        } = self;

        let context = Arc::new(ServiceContext::new(
            options.identity.clone(),
            options.stop_wait_hint,
        ));
        let handler = ControlChannel::new(Arc::clone(&context)).into_handler();

        let handle = match registrar.register_control_handler(options.identity.name(), handler) {
            Ok(handle) => handle,
            Err(e) => {
                error!("control handler registration failed: {e}");
                events.error("Service control handler registration failed.");

                return Ok(Outcome::RegistrationFailed);
            }
        };

        let status = context.status();
        status.attach(handle)?;
        status
            .publish(ServiceState::StartPending, 0, options.start_wait_hint)
            .map_err(|e| abandon(status, e))?;

        if let Err(e) = work.initialize().await {
            error!("service initialization failed: {e}");
            events.error("Service initialization failed.");
            status.publish(ServiceState::Stopped, 0, Duration::ZERO)?;

            return Ok(Outcome::InitFailed);
        }

        events.info("Service initialized successfully.");
        status
            .publish(ServiceState::Running, 0, Duration::ZERO)
            .map_err(|e| abandon(status, e))?;
        info!(service = options.identity.name(), "service running");

        let mut worker = WorkerLoop::new(work, events.clone());
        let iterations = worker.run(context.signal()).await;

        events.info("Service stopped.");
        status.publish(ServiceState::Stopped, 0, Duration::ZERO)?;

        Ok(Outcome::Stopped { iterations })
    }
}

// A failed publish must not leave the manager waiting on a pending state.
fn abandon(status: &StatusChannel, e: Error) -> Error {
    error!("status publish failed: {e}");

    if let Err(stop_error) = status.publish(ServiceState::Stopped, 0, Duration::ZERO) {
        warn!("could not publish stopped after failure: {stop_error}");
    }

    e
}
